//! End-to-end search over a small project tree.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use quill_file_ignore::FilterCache;
use quill_file_search::SearchRequest;
use quill_file_search::search;

#[tokio::test]
async fn search_honors_nested_gitignores_and_sorts_newest_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("pkg/gen")).expect("mkdir");
    fs::create_dir_all(root.join("target/debug")).expect("mkdir");
    fs::write(root.join(".gitignore"), "target/\n").expect("write");
    fs::write(root.join("pkg/.gitignore"), "gen/\n").expect("write");
    fs::write(root.join("target/debug/out.rs"), "").expect("write");
    fs::write(root.join("pkg/gen/api.rs"), "").expect("write");
    fs::write(root.join("pkg/old.rs"), "").expect("write");
    // Coarse mtime resolution on some filesystems.
    std::thread::sleep(Duration::from_millis(1100));
    fs::write(root.join("main.rs"), "").expect("write");

    let cache = Arc::new(FilterCache::default());
    let result = search(&SearchRequest::new(root, "**/*.rs"), &cache)
        .await
        .expect("search");

    let paths: Vec<_> = result
        .matches
        .iter()
        .map(|m| m.relative_path.as_str())
        .collect();
    assert_eq!(paths, vec!["main.rs", "pkg/old.rs"]);
    assert!(!result.truncated);
}

#[tokio::test]
async fn search_result_serializes_with_stable_field_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.md"), "x").expect("write");

    let cache = Arc::new(FilterCache::default());
    let result = search(&SearchRequest::new(dir.path(), "*.md"), &cache)
        .await
        .expect("search");
    let json = serde_json::to_value(&result).expect("json");

    assert_eq!(json["truncated"], false);
    assert_eq!(json["matches"][0]["relative_path"], "a.md");
    assert_eq!(json["matches"][0]["is_directory"], false);
    assert_eq!(json["matches"][0]["size"], 1);
}
