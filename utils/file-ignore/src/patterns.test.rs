use super::*;

#[test]
fn test_common_patterns_not_empty() {
    assert!(!VCS_DIRECTORY_EXCLUDES.is_empty());
    assert!(!COMMON_DIRECTORY_EXCLUDES.is_empty());
}

#[test]
fn test_get_all_default_excludes() {
    let all = get_all_default_excludes();
    let expected_len = VCS_DIRECTORY_EXCLUDES.len()
        + COMMON_DIRECTORY_EXCLUDES.len()
        + LOCKFILE_EXCLUDES.len()
        + SYSTEM_FILE_EXCLUDES.len();
    assert_eq!(all.len(), expected_len);
    assert_eq!(all[0], ".git/");
}

#[test]
fn test_default_excluded_dir_names() {
    let names: Vec<_> = default_excluded_dir_names().collect();
    assert!(names.contains(&".git"));
    assert!(names.contains(&"node_modules"));
    assert!(!names.iter().any(|n| n.ends_with('/')));
    assert_eq!(
        names.len(),
        VCS_DIRECTORY_EXCLUDES.len() + COMMON_DIRECTORY_EXCLUDES.len()
    );
}
