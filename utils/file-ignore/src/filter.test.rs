use super::*;
use crate::rule::IgnoreRule;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn filter_from(text: &str) -> PathFilter {
    PathFilter::new("/project", IgnoreRuleSet::parse(text, ""))
}

#[test]
fn test_unmatched_path_is_not_ignored() {
    let filter = filter_from("*.log\n");
    assert!(!filter.should_ignore("src/main.rs"));
    assert!(!PathFilter::new("/project", IgnoreRuleSet::empty()).should_ignore("anything"));
}

#[test]
fn test_directory_pattern_is_consistent() {
    let filter = filter_from("build/\n");
    assert!(filter.should_ignore("build/"));
    assert!(filter.should_ignore("build/x"));
    assert!(filter.should_ignore("build"));
    assert!(filter.should_ignore_directory("build"));
    assert!(filter.should_ignore("nested/build/x"));
    assert!(!filter.should_ignore("builder/x"));
}

#[test]
fn test_negate_then_reignore() {
    let filter = filter_from("build/\n!build/x\n");
    assert!(filter.should_ignore("build/y"));
    assert!(!filter.should_ignore("build/x"));

    let filter = filter_from("build/\n!build/x\nbuild/x\n");
    assert!(filter.should_ignore("build/x"));
}

#[test]
fn test_later_non_matching_rule_does_not_reset() {
    let filter = filter_from("*.txt\n!other.md\n");
    assert!(filter.should_ignore("notes.txt"));
}

#[test]
fn test_negation_without_prior_ignore() {
    let filter = filter_from("!keep.txt\n");
    assert!(!filter.should_ignore("keep.txt"));
}

#[test]
fn test_backslashes_are_normalized() {
    let filter = filter_from("build/\n");
    assert!(filter.should_ignore("build\\out\\a.o"));
}

#[test]
fn test_absolute_paths_under_root_are_relativized() {
    let filter = filter_from("/dist\n");
    assert!(filter.should_ignore("/project/dist/app.js"));
    assert!(filter.should_ignore("./dist/app.js"));
    assert!(!filter.should_ignore("/project/src/dist.rs"));
    assert!(!filter.should_ignore("/project"));
}

#[test]
fn test_root_prefix_does_not_match_sibling_directory() {
    let filter = PathFilter::new("/project", IgnoreRuleSet::parse("/b\n", ""));
    // "/projectb" must not be treated as "/project" + "b".
    assert!(!filter.should_ignore("/projectb"));
}

#[test]
fn test_directory_check_uses_trailing_slash() {
    // A rule that only matches with a trailing slash.
    let rule = IgnoreRule::new(RuleKind::Ignore, "cache/").expect("rule");
    let filter = PathFilter::new("/project", IgnoreRuleSet::from_rules(vec![rule]));
    assert!(!filter.should_ignore("cache"));
    assert!(filter.should_ignore_directory("cache"));
}

#[test]
fn test_nested_gitignore_scoping() {
    let mut rules = IgnoreRuleSet::parse("", "");
    rules.push_line("generated", "pkg");
    let filter = PathFilter::new("/project", rules);
    assert!(filter.should_ignore("pkg/generated"));
    assert!(filter.should_ignore("pkg/src/generated/a.rs"));
    assert!(!filter.should_ignore("other/generated"));
}

#[test]
fn test_default_excludes_apply() {
    let dir = tempfile::tempdir().expect("tempdir");
    let filter = PathFilter::build(dir.path(), &IgnoreConfig::default());
    assert!(filter.should_ignore("node_modules/pkg/index.js"));
    assert!(filter.should_ignore(".git/HEAD"));
    assert!(filter.should_ignore("web/package-lock.json"));
    assert!(filter.should_ignore("src/.DS_Store"));
    assert!(!filter.should_ignore(".gitignore"));
    assert!(!filter.should_ignore("src/main.rs"));
    assert!(!filter.should_ignore("distribute/file.js"));
}

#[test]
fn test_gitignore_can_unignore_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(".gitignore"), "!dist/keep.js\n").expect("write");
    let filter = PathFilter::build(dir.path(), &IgnoreConfig::default());
    assert!(filter.should_ignore("dist/bundle.js"));
    assert!(!filter.should_ignore("dist/keep.js"));
}

#[test]
fn test_last_match_wins_matches_manual_scan() {
    const PATTERNS: &[&str] = &[
        "**/a",
        "**/a/**",
        "a/*",
        "**/*.txt",
        "b/**",
        "**/c/*.txt",
        "a/b",
        "*",
        "**/b",
    ];
    const SEGMENTS: &[&str] = &["a", "b", "c", "x.txt", "y.rs"];

    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let rule_count = rng.random_range(0..8);
        let rules: Vec<IgnoreRule> = (0..rule_count)
            .map(|_| {
                let kind = if rng.random_bool(0.5) {
                    RuleKind::Ignore
                } else {
                    RuleKind::Negate
                };
                let pattern = PATTERNS[rng.random_range(0..PATTERNS.len())];
                IgnoreRule::new(kind, pattern).expect("valid pattern")
            })
            .collect();
        let filter = PathFilter::new("/root", IgnoreRuleSet::from_rules(rules.clone()));

        for _ in 0..20 {
            let depth = rng.random_range(1..=3);
            let path = (0..depth)
                .map(|_| SEGMENTS[rng.random_range(0..SEGMENTS.len())])
                .collect::<Vec<_>>()
                .join("/");

            let mut expected = false;
            for rule in &rules {
                if rule.is_match(&path) {
                    expected = rule.kind() == RuleKind::Ignore;
                }
            }
            assert_eq!(
                filter.should_ignore(&path),
                expected,
                "path {path} against {:?}",
                rules.iter().map(IgnoreRule::pattern).collect::<Vec<_>>()
            );
        }
    }
}
