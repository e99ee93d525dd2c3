use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

fn walked_files(service: &IgnoreService, dir: &Path) -> Vec<String> {
    let mut files: Vec<_> = service
        .create_walk_builder(dir)
        .build()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    files.sort();
    files
}

#[test]
fn test_with_defaults() {
    let service = IgnoreService::with_defaults();
    assert!(service.config().respect_gitignore);
    assert!(service.config().include_hidden);
}

#[test]
fn test_walker_does_not_apply_gitignore_itself() {
    let temp = tempdir().expect("create temp dir");
    let dir = temp.path();
    fs::write(dir.join("keep.rs"), "code").expect("write");
    fs::write(dir.join("ignored.log"), "log").expect("write");
    fs::write(dir.join(".gitignore"), "*.log").expect("write");

    let files = walked_files(&IgnoreService::with_defaults(), dir);
    assert_eq!(files, vec![".gitignore", "ignored.log", "keep.rs"]);
}

#[test]
fn test_walker_prunes_default_excluded_dirs() {
    let temp = tempdir().expect("create temp dir");
    let dir = temp.path();
    fs::create_dir_all(dir.join("node_modules/pkg")).expect("mkdir");
    fs::write(dir.join("node_modules/pkg/index.js"), "js").expect("write");
    fs::write(dir.join("main.js"), "js").expect("write");

    assert_eq!(walked_files(&IgnoreService::with_defaults(), dir), vec!["main.js"]);

    let service = IgnoreService::new(IgnoreConfig::default().with_default_excludes(false));
    assert_eq!(walked_files(&service, dir), vec!["index.js", "main.js"]);
}

#[test]
fn test_filtered_walker_prunes_ignored_dirs() {
    let temp = tempdir().expect("create temp dir");
    let dir = temp.path();
    fs::create_dir_all(dir.join("target/debug")).expect("mkdir");
    fs::write(dir.join("target/debug/app"), "bin").expect("write");
    fs::write(dir.join("lib.rs"), "code").expect("write");
    fs::write(dir.join(".gitignore"), "target/\n").expect("write");

    let service = IgnoreService::with_defaults();
    let filter = Arc::new(PathFilter::build(dir, service.config()));
    let files: Vec<_> = service
        .create_filtered_walk_builder(dir, filter)
        .build()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert!(files.contains(&"lib.rs".to_string()));
    assert!(!files.contains(&"app".to_string()));
}

#[test]
fn test_filtered_walker_enters_ignored_dirs_when_negations_exist() {
    let temp = tempdir().expect("create temp dir");
    let dir = temp.path();
    fs::create_dir_all(dir.join("out")).expect("mkdir");
    fs::write(dir.join("out/keep.txt"), "x").expect("write");
    fs::write(dir.join(".gitignore"), "out/\n!out/keep.txt\n").expect("write");

    let service = IgnoreService::with_defaults();
    let filter = Arc::new(PathFilter::build(dir, service.config()));
    let files: Vec<_> = service
        .create_filtered_walk_builder(dir, filter)
        .build()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert!(files.contains(&"keep.txt".to_string()));
}

#[test]
fn test_walker_hides_dotfiles_when_configured() {
    let temp = tempdir().expect("create temp dir");
    let dir = temp.path();
    fs::write(dir.join("keep.rs"), "code").expect("write");
    fs::write(dir.join(".env"), "secret").expect("write");

    let service = IgnoreService::new(IgnoreConfig::default().with_hidden(false));
    assert_eq!(walked_files(&service, dir), vec!["keep.rs"]);
}

#[test]
fn test_find_gitignore_files_orders_by_depth() {
    let temp = tempdir().expect("create temp dir");
    let dir = temp.path();
    fs::create_dir_all(dir.join("b/deep")).expect("mkdir");
    fs::create_dir_all(dir.join("a")).expect("mkdir");
    fs::write(dir.join("b/deep/.gitignore"), "").expect("write");
    fs::write(dir.join("b/.gitignore"), "").expect("write");
    fs::write(dir.join("a/.gitignore"), "").expect("write");
    fs::write(dir.join(".gitignore"), "").expect("write");

    let found: Vec<_> = find_gitignore_files(dir)
        .into_iter()
        .map(|p| p.strip_prefix(dir).expect("under root").to_path_buf())
        .collect();
    assert_eq!(
        found,
        vec![
            PathBuf::from(".gitignore"),
            PathBuf::from("a/.gitignore"),
            PathBuf::from("b/.gitignore"),
            PathBuf::from("b/deep/.gitignore"),
        ]
    );
}

#[test]
fn test_find_gitignore_files_skips_excluded_dirs() {
    let temp = tempdir().expect("create temp dir");
    let dir = temp.path();
    fs::create_dir_all(dir.join(".git/info")).expect("mkdir");
    fs::write(dir.join(".git/info/.gitignore"), "x").expect("write");

    assert!(find_gitignore_files(dir).is_empty());
}

#[test]
fn test_find_gitignore_files_missing_root() {
    assert!(find_gitignore_files(Path::new("/no/such/root")).is_empty());
}
