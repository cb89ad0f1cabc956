use crate::config::Config;
use crate::host::{HostFileSystem, RefreshCounter};
use crate::native::NativeFileSystem;
use crate::session::PluginSession;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn project() -> (TempDir, NativeFileSystem) {
    let dir = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(dir.path().to_str().unwrap()).unwrap();
    (dir, fs)
}

#[test]
fn test_resolve_path_is_lexical_and_rooted() {
    let (_dir, fs) = project();
    let root = fs.project_root().to_string_lossy().to_string();
    assert_eq!(fs.resolve_path("addons"), format!("{root}/addons"));
    assert_eq!(fs.resolve_path("a/./b/../addons"), format!("{root}/a/addons"));
    assert_eq!(fs.resolve_path("/abs/x/../y"), "/abs/y");
}

#[test]
fn test_walk_skips_vendored_and_hidden_directories() {
    let (dir, fs) = project();
    let root = dir.path();
    write(root, "addons/web/static/src/a.js", "");
    write(root, "addons/web/static/src/b.ts", "");
    write(root, "addons/web/static/src/c.mjs", "");
    write(root, "addons/web/static/src/style.css", "");
    write(root, "addons/web/node_modules/dep/index.js", "");
    write(root, "addons/.git/hooks/x.js", "");

    let addons = fs.resolve_path("addons");
    let mut found: Vec<String> = fs
        .walk_directory(&addons)
        .into_iter()
        .map(|p| p.trim_start_matches(&addons).to_string())
        .collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            "/web/static/src/a.js".to_string(),
            "/web/static/src/b.ts".to_string(),
            "/web/static/src/c.mjs".to_string(),
        ]
    );
}

#[test]
fn test_missing_files_read_as_none() {
    let (_dir, fs) = project();
    let missing = fs.resolve_path("nope.js");
    assert_eq!(fs.read_file(&missing), None);
    assert!(!fs.file_exists(&missing));
}

#[test]
fn test_missing_project_root_is_an_error() {
    assert!(NativeFileSystem::new("/definitely/not/a/real/project/root").is_err());
}

#[test]
fn test_session_over_real_directory() {
    let (dir, fs) = project();
    write(
        dir.path(),
        "addons/web/static/src/pair.js",
        "odoo.define('web.a', function () { return 1; });\nodoo.define('web.b', function () { return 2; });\n",
    );
    let root = fs.project_root().to_string_lossy().to_string();

    let mut session = PluginSession::new(fs, RefreshCounter::default(), &root, Config::default());
    assert_eq!(session.cache().len(), 2);

    let virtual_path = session.cache().get("web.b").unwrap().addressable_path.clone();
    let text = session.read_file(&virtual_path).unwrap();
    assert!(text.ends_with("module.exports= 2; });\n"));
    assert!(session.file_exists(&virtual_path));
}
