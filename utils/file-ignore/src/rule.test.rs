use super::*;
use pretty_assertions::assert_eq;
use std::fs;

fn patterns_of(set: &IgnoreRuleSet) -> Vec<(RuleKind, String)> {
    set.rules()
        .iter()
        .map(|r| (r.kind(), r.pattern().to_string()))
        .collect()
}

#[test]
fn test_expand_bare_name_in_nested_dir() {
    let (kind, patterns) = expand_line("foo", "a/b").expect("rule");
    assert_eq!(kind, RuleKind::Ignore);
    assert_eq!(patterns, vec!["a/b/**/foo", "a/b/**/foo/**"]);
}

#[test]
fn test_expand_rooted_name_in_nested_dir() {
    let (_, patterns) = expand_line("/foo", "a/b").expect("rule");
    assert_eq!(patterns, vec!["a/b/foo", "a/b/foo/**"]);
}

#[test]
fn test_expand_at_root() {
    let (_, bare) = expand_line("*.log", "").expect("rule");
    assert_eq!(bare, vec!["**/*.log", "**/*.log/**"]);

    let (_, rooted) = expand_line("/target", "").expect("rule");
    assert_eq!(rooted, vec!["target", "target/**"]);
}

#[test]
fn test_expand_directory_pattern() {
    let (kind, patterns) = expand_line("build/", "").expect("rule");
    assert_eq!(kind, RuleKind::Ignore);
    assert_eq!(patterns, vec!["**/build", "**/build/**"]);
}

#[test]
fn test_expand_interior_slash_is_anchored() {
    let (_, patterns) = expand_line("docs/generated", "pkg").expect("rule");
    assert_eq!(patterns, vec!["pkg/docs/generated", "pkg/docs/generated/**"]);
}

#[test]
fn test_expand_trailing_double_star_has_no_extra_variant() {
    let (_, patterns) = expand_line("vendor/**", "").expect("rule");
    assert_eq!(patterns, vec!["vendor/**"]);
}

#[test]
fn test_expand_negation() {
    let (kind, patterns) = expand_line("!keep.txt", "").expect("rule");
    assert_eq!(kind, RuleKind::Negate);
    assert_eq!(patterns[0], "**/keep.txt");
}

#[test]
fn test_expand_escapes() {
    let (kind, patterns) = expand_line("\\#notes", "").expect("rule");
    assert_eq!(kind, RuleKind::Ignore);
    assert_eq!(patterns[0], "**/#notes");

    let (kind, patterns) = expand_line("\\!important", "").expect("rule");
    assert_eq!(kind, RuleKind::Ignore);
    assert_eq!(patterns[0], "**/!important");
}

#[test]
fn test_expand_skips_blank_and_comments() {
    assert!(expand_line("", "").is_none());
    assert!(expand_line("   ", "").is_none());
    assert!(expand_line("# comment", "").is_none());
    assert!(expand_line("/", "").is_none());
    assert!(expand_line("!", "").is_none());
}

#[test]
fn test_expand_trims_trailing_whitespace_and_cr() {
    let (_, patterns) = expand_line("out  \r", "").expect("rule");
    assert_eq!(patterns[0], "**/out");
}

#[test]
fn test_parse_preserves_order_and_duplicates() {
    let set = IgnoreRuleSet::parse("a\n!a\na\n", "");
    let kinds: Vec<_> = set.rules().iter().map(IgnoreRule::kind).collect();
    assert_eq!(
        kinds,
        vec![
            RuleKind::Ignore,
            RuleKind::Ignore,
            RuleKind::Negate,
            RuleKind::Negate,
            RuleKind::Ignore,
            RuleKind::Ignore,
        ]
    );
}

#[test]
fn test_invalid_glob_line_is_skipped() {
    let set = IgnoreRuleSet::parse("[unclosed\nok.txt\n", "");
    assert_eq!(
        patterns_of(&set),
        vec![
            (RuleKind::Ignore, "**/ok.txt".to_string()),
            (RuleKind::Ignore, "**/ok.txt/**".to_string()),
        ]
    );
}

#[test]
fn test_build_orders_defaults_then_shallow_then_deep_then_extras() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("a/b")).expect("mkdir");
    fs::write(root.join(".gitignore"), "root-rule\n").expect("write");
    fs::write(root.join("a/b/.gitignore"), "deep-rule\n").expect("write");
    fs::write(root.join("a/.gitignore"), "mid-rule\n").expect("write");

    let config = IgnoreConfig::default().with_excludes(vec!["extra".to_string()]);
    let set = IgnoreRuleSet::build(root, &config);

    let defaults = set.default_rule_count();
    assert!(defaults > 0);
    let tail: Vec<_> = set.rules()[defaults..]
        .iter()
        .map(|r| r.pattern().to_string())
        .collect();
    assert_eq!(
        tail,
        vec![
            "**/root-rule",
            "**/root-rule/**",
            "a/**/mid-rule",
            "a/**/mid-rule/**",
            "a/b/**/deep-rule",
            "a/b/**/deep-rule/**",
            "**/extra",
            "**/extra/**",
        ]
    );
    assert_eq!(set.sources().len(), 3);
}

#[test]
fn test_build_skips_gitignore_inside_default_excluded_dirs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("node_modules/pkg")).expect("mkdir");
    fs::write(root.join("node_modules/pkg/.gitignore"), "secret\n").expect("write");

    let set = IgnoreRuleSet::build(root, &IgnoreConfig::default());
    assert!(set.sources().is_empty());
    assert!(!set.rules().iter().any(|r| r.pattern().contains("secret")));
}

#[test]
fn test_build_fails_open_on_unreadable_gitignore() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    // Invalid UTF-8 makes read_to_string fail.
    fs::write(root.join(".gitignore"), [0xff, 0xfe, 0xfd]).expect("write");

    let config = IgnoreConfig::default().with_default_excludes(false);
    let set = IgnoreRuleSet::build(root, &config);
    assert!(set.is_empty());
    assert!(set.sources().is_empty());
}

#[test]
fn test_build_missing_root_is_empty() {
    let config = IgnoreConfig::default().with_default_excludes(false);
    let set = IgnoreRuleSet::build(Path::new("/definitely/not/here"), &config);
    assert!(set.is_empty());
}

#[test]
fn test_build_without_gitignore_respect() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(".gitignore"), "*.txt\n").expect("write");

    let config = IgnoreConfig::ignoring_none();
    let set = IgnoreRuleSet::build(dir.path(), &config);
    assert!(set.is_empty());
}

#[test]
fn test_has_negations() {
    assert!(!IgnoreRuleSet::parse("target/\n*.log\n", "").has_negations());
    assert!(IgnoreRuleSet::parse("target/\n!target/keep\n", "").has_negations());
}
