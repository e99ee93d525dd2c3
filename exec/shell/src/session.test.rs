use super::*;
use pretty_assertions::assert_eq;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_first_write_wins() {
    let store = SessionStore::new();
    let first = store.get_or_create("s1", Some(PathBuf::from("/tmp")), &env(&[("A", "1")]));
    let second = store.get_or_create("s1", Some(PathBuf::from("/etc")), &env(&[("A", "2")]));

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.cwd, Some(PathBuf::from("/tmp")));
    assert_eq!(second.env, env(&[("A", "1")]));
}

#[test]
fn test_first_call_without_cwd_fixes_none() {
    let store = SessionStore::new();
    store.get_or_create("s1", None, &HashMap::new());
    let later = store.get_or_create("s1", Some(PathBuf::from("/tmp")), &HashMap::new());
    assert_eq!(later.cwd, None);
}

#[test]
fn test_close_allows_recreation() {
    let store = SessionStore::new();
    store.get_or_create("s1", Some(PathBuf::from("/a")), &HashMap::new());
    assert!(store.close("s1"));
    assert!(!store.close("s1"));
    assert!(store.get("s1").is_none());

    let fresh = store.get_or_create("s1", Some(PathBuf::from("/b")), &HashMap::new());
    assert_eq!(fresh.cwd, Some(PathBuf::from("/b")));
}

#[test]
fn test_clones_share_sessions() {
    let store = SessionStore::new();
    let clone = store.clone();
    store.get_or_create("shared", None, &HashMap::new());
    assert_eq!(clone.len(), 1);
    assert!(clone.get("shared").is_some());
}
