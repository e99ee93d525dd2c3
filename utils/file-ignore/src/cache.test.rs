use super::*;
use std::fs;

#[test]
fn test_hit_returns_same_filter() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = FilterCache::default();

    let first = cache.get_or_build(dir.path(), &[]);
    let second = cache.get_or_build(dir.path(), &[]);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_extra_excludes_are_part_of_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = FilterCache::default();

    let plain = cache.get_or_build(dir.path(), &[]);
    let extra = cache.get_or_build(dir.path(), &["*.tmp".to_string()]);
    assert!(!Arc::ptr_eq(&plain, &extra));
    assert!(extra.should_ignore("a.tmp"));
    assert!(!plain.should_ignore("a.tmp"));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_expired_entry_is_rebuilt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = FilterCache::new(Duration::ZERO);

    let first = cache.get_or_build(dir.path(), &[]);
    fs::write(dir.path().join(".gitignore"), "*.log\n").expect("write");
    let second = cache.get_or_build(dir.path(), &[]);

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(!first.should_ignore("app.log"));
    assert!(second.should_ignore("app.log"));
}

#[test]
fn test_fresh_entry_hides_later_gitignore_edits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = FilterCache::new(Duration::from_secs(60));

    let _ = cache.get_or_build(dir.path(), &[]);
    fs::write(dir.path().join(".gitignore"), "*.log\n").expect("write");
    assert!(!cache.get_or_build(dir.path(), &[]).should_ignore("app.log"));
}

#[test]
fn test_invalidate_and_clear() {
    let a = tempfile::tempdir().expect("tempdir");
    let b = tempfile::tempdir().expect("tempdir");
    let cache = FilterCache::default();

    cache.get_or_build(a.path(), &[]);
    cache.get_or_build(a.path(), &["x".to_string()]);
    cache.get_or_build(b.path(), &[]);

    assert_eq!(cache.invalidate(a.path()), 2);
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
