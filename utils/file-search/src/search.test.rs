use super::*;
use chrono::TimeZone;
use quill_error::ErrorExt;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn workspace(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for file in files {
        let path = dir.path().join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, file.as_bytes()).expect("write");
    }
    dir
}

fn relative_paths(result: &SearchResult) -> Vec<&str> {
    let mut paths: Vec<_> = result
        .matches
        .iter()
        .map(|m| m.relative_path.as_str())
        .collect();
    paths.sort_unstable();
    paths
}

fn cache() -> Arc<FilterCache> {
    Arc::new(FilterCache::default())
}

#[tokio::test]
async fn test_truncated_only_when_more_matches_exist() {
    let dir = workspace(&["a.txt", "b.txt", "c.txt", "d.txt", "e.txt", "f.rs"]);
    let cache = cache();

    let limited = search(&SearchRequest::new(dir.path(), "*.txt").with_max_results(2), &cache)
        .await
        .expect("search");
    assert_eq!(limited.len(), 2);
    assert!(limited.truncated);

    let all = search(&SearchRequest::new(dir.path(), "*.txt").with_max_results(10), &cache)
        .await
        .expect("search");
    assert_eq!(all.len(), 5);
    assert!(!all.truncated);

    let exact = search(&SearchRequest::new(dir.path(), "*.txt").with_max_results(5), &cache)
        .await
        .expect("search");
    assert_eq!(exact.len(), 5);
    assert!(!exact.truncated);
}

#[tokio::test]
async fn test_cancel_mid_flight_returns_cancelled() {
    let names: Vec<String> = (0..20).map(|i| format!("f{i:02}.txt")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let dir = workspace(&refs);

    let request = SearchRequest::new(dir.path(), "*.txt");
    let cancel = request.cancel.clone();
    let mut seen = 0;
    let result = search_streaming(&request, &cache(), |_| {
        seen += 1;
        cancel.cancel();
    })
    .await;

    assert_eq!(seen, 1);
    let err = result.expect_err("cancelled search must not return matches");
    assert!(err.is_cancelled());
    assert_eq!(err.status_code(), quill_error::StatusCode::Cancelled);
}

#[tokio::test]
async fn test_cancel_before_start_does_no_work() {
    let dir = workspace(&["a.txt"]);
    let request = SearchRequest::new(dir.path(), "*.txt");
    request.cancel.cancel();

    let cache = cache();
    let err = search(&request, &cache).await.expect_err("cancelled");
    assert!(err.is_cancelled());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_filter_build_returns_on_cancel() {
    let dir = workspace(&["a.txt", "node_modules/x.js"]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = build_filter(&cache(), dir.path(), &[], &cancel)
        .await
        .expect_err("cancelled");
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_filter_build_populates_cache() {
    let dir = workspace(&["a.txt", "node_modules/x.js"]);
    let cache = cache();

    let filter = build_filter(&cache, dir.path(), &[], &CancellationToken::new())
        .await
        .expect("filter");
    assert!(filter.should_ignore("node_modules/x.js"));
    assert!(!filter.should_ignore("a.txt"));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_invalid_root_is_configuration_error() {
    let dir = workspace(&["file.txt"]);

    let missing = search(&SearchRequest::new(dir.path().join("nope"), "*"), &cache())
        .await
        .expect_err("missing root");
    assert!(missing.is_configuration_error());
    assert_eq!(missing.status_code(), quill_error::StatusCode::InvalidArguments);

    let not_dir = search(&SearchRequest::new(dir.path().join("file.txt"), "*"), &cache())
        .await
        .expect_err("file root");
    assert!(matches!(not_dir, SearchError::InvalidRoot { .. }));
}

#[tokio::test]
async fn test_invalid_pattern_is_configuration_error() {
    let dir = workspace(&[]);

    let bad = search(&SearchRequest::new(dir.path(), "src/[abc"), &cache())
        .await
        .expect_err("bad glob");
    assert!(matches!(bad, SearchError::InvalidPattern { .. }));

    let empty = search(&SearchRequest::new(dir.path(), "  "), &cache())
        .await
        .expect_err("empty glob");
    assert!(empty.is_configuration_error());
}

#[tokio::test]
async fn test_zero_matches_is_ok() {
    let dir = workspace(&["a.rs"]);
    let result = search(&SearchRequest::new(dir.path(), "**/*.py"), &cache())
        .await
        .expect("search");
    assert!(result.is_empty());
    assert!(!result.truncated);
    assert_eq!(result.summary(), "Found 0 matches");
}

#[tokio::test]
async fn test_directory_matches_need_opt_in() {
    let dir = workspace(&["src/lib.rs"]);

    let without = search(&SearchRequest::new(dir.path(), "src"), &cache())
        .await
        .expect("search");
    assert!(without.is_empty());

    let with = search(
        &SearchRequest::new(dir.path(), "src").with_directories(true),
        &cache(),
    )
    .await
    .expect("search");
    assert_eq!(relative_paths(&with), vec!["src"]);
    assert!(with.matches[0].is_directory);
    assert_eq!(with.matches[0].size, None);
}

#[tokio::test]
async fn test_gitignore_negation_is_honored() {
    let dir = workspace(&["logs/app.log", "logs/keep.log", "root.log"]);
    fs::write(dir.path().join(".gitignore"), "*.log\n!keep.log\n").expect("write");

    let result = search(&SearchRequest::new(dir.path(), "**/*.log"), &cache())
        .await
        .expect("search");
    assert_eq!(relative_paths(&result), vec!["logs/keep.log"]);
}

#[tokio::test]
async fn test_default_excluded_dirs_are_not_walked() {
    let dir = workspace(&["node_modules/dep/index.js", "src/index.js", ".git/config.js"]);

    let result = search(&SearchRequest::new(dir.path(), "**/*.js"), &cache())
        .await
        .expect("search");
    assert_eq!(relative_paths(&result), vec!["src/index.js"]);
    // Pruned directories are never yielded: only src and src/index.js.
    assert_eq!(result.scanned_entries, 2);
}

#[tokio::test]
async fn test_extra_excludes_apply() {
    let dir = workspace(&["a.txt", "gen/b.txt"]);
    let request = SearchRequest::new(dir.path(), "**/*.txt").with_excludes(vec!["gen/".into()]);

    let result = search(&request, &cache()).await.expect("search");
    assert_eq!(relative_paths(&result), vec!["a.txt"]);
}

#[tokio::test]
async fn test_case_sensitivity() {
    let dir = workspace(&["README.md"]);

    let insensitive = search(&SearchRequest::new(dir.path(), "readme.md"), &cache())
        .await
        .expect("search");
    assert_eq!(insensitive.len(), 1);

    let sensitive = search(
        &SearchRequest::new(dir.path(), "readme.md").with_case_sensitive(true),
        &cache(),
    )
    .await
    .expect("search");
    assert!(sensitive.is_empty());
}

#[tokio::test]
async fn test_match_metadata() {
    let dir = workspace(&["notes.txt"]);
    let result = search(&SearchRequest::new(dir.path(), "./notes.txt"), &cache())
        .await
        .expect("search");

    let found = &result.matches[0];
    assert_eq!(found.relative_path, "notes.txt");
    assert_eq!(found.size, Some("notes.txt".len() as u64));
    assert!(found.modified_time.is_some());
    assert!(found.absolute_path.is_absolute());
    assert!(found.absolute_path.ends_with("notes.txt"));
}

fn entry(path: &str, is_directory: bool, mtime: Option<i64>) -> FileMatch {
    FileMatch {
        absolute_path: PathBuf::from("/r").join(path),
        relative_path: path.to_string(),
        is_directory,
        size: None,
        modified_time: mtime.and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
    }
}

#[test]
fn test_sort_files_first_then_newest_then_path() {
    let mut matches = vec![
        entry("dir_new", true, Some(500)),
        entry("b_old", false, Some(100)),
        entry("no_time", false, None),
        entry("z_new", false, Some(300)),
        entry("a_new", false, Some(300)),
    ];
    sort_matches(&mut matches);

    let order: Vec<_> = matches.iter().map(|m| m.relative_path.as_str()).collect();
    assert_eq!(order, vec!["a_new", "z_new", "b_old", "no_time", "dir_new"]);
}

#[test]
fn test_summary_never_claims_exact_count_when_truncated() {
    let result = SearchResult {
        matches: vec![entry("a", false, None)],
        truncated: true,
        scanned_entries: 3,
        elapsed_ms: 1,
    };
    assert!(result.summary().contains("truncated"));
    assert!(!result.summary().starts_with("Found"));
}
