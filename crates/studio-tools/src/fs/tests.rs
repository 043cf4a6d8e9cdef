use super::*;
use crate::error::Error;
use std::path::Path;
use tempfile::TempDir;
use tokio_test::assert_ok;

fn workspace() -> (TempDir, Workspace) {
    let dir = TempDir::new().unwrap();
    let ws = Workspace::new(dir.path());
    (dir, ws)
}

#[test]
fn test_resolve_stays_inside_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();

    let resolved = resolve(dir.path(), "sub").unwrap();
    assert!(resolved.is_absolute());
    assert!(resolved.starts_with(&root));

    let nested = resolve(dir.path(), "a/b/c.txt").unwrap();
    assert_eq!(nested, root.join("a").join("b").join("c.txt"));

    assert_eq!(resolve(dir.path(), ".").unwrap(), root);
    assert_eq!(resolve(dir.path(), "a/..").unwrap(), root);
}

#[test]
fn test_resolve_rejects_traversal() {
    let dir = TempDir::new().unwrap();

    assert!(matches!(
        resolve(dir.path(), "../../etc/passwd"),
        Err(Error::PathEscape(_))
    ));
    assert!(matches!(
        resolve(dir.path(), "sub/../../outside"),
        Err(Error::PathEscape(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_resolve_rejects_absolute_injection() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        resolve(dir.path(), "/etc/passwd"),
        Err(Error::PathEscape(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_resolve_rejects_symlink_escape() {
    let outside = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

    assert!(matches!(
        resolve(dir.path(), "link"),
        Err(Error::PathEscape(_))
    ));
    assert!(matches!(
        resolve(dir.path(), "link/secret.txt"),
        Err(Error::PathEscape(_))
    ));

    std::os::unix::fs::symlink("/nonexistent/target", dir.path().join("dangling")).unwrap();
    assert!(matches!(
        resolve(dir.path(), "dangling"),
        Err(Error::PathEscape(_))
    ));
}

#[test]
fn test_check_relative() {
    assert!(check_relative("").is_ok());
    assert!(check_relative("src/main.rs").is_ok());
    assert!(check_relative("./notes.md").is_ok());

    assert!(matches!(check_relative(".."), Err(Error::PathEscape(_))));
    assert!(matches!(check_relative("a/../../b"), Err(Error::PathEscape(_))));
    #[cfg(unix)]
    assert!(matches!(check_relative("/etc"), Err(Error::PathEscape(_))));
}

#[tokio::test]
async fn test_list_dir() {
    let (dir, ws) = workspace();
    std::fs::write(dir.path().join("file.txt"), "hi").unwrap();
    std::fs::write(dir.path().join("Alpha.txt"), "a").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let items = ws.list("").await.unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["sub", "Alpha.txt", "file.txt"]);
    assert!(items[0].dir);
    assert_eq!(items[2].path, "file.txt");

    // A file path lists its parent
    let again = ws.list("file.txt").await.unwrap();
    assert_eq!(again.len(), 3);

    assert!(matches!(ws.list("missing").await, Err(Error::NotFound(_))));
    assert!(matches!(ws.list("../").await, Err(Error::PathEscape(_))));
}

#[tokio::test]
async fn test_tree() {
    let (dir, ws) = workspace();
    std::fs::create_dir_all(dir.path().join("dir/nested")).unwrap();
    std::fs::write(dir.path().join("dir/a.txt"), "a").unwrap();
    std::fs::write(dir.path().join("dir/nested/b.txt"), "b").unwrap();

    assert_eq!(
        ws.tree("").await.unwrap(),
        vec!["dir/a.txt".to_string(), "dir/nested/b.txt".to_string()]
    );
    assert_eq!(ws.tree("dir/nested").await.unwrap(), vec!["dir/nested/b.txt"]);
    assert!(matches!(ws.tree("missing").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_read_file() {
    let dir = TempDir::new().unwrap();
    let ws = Workspace::with_limit(dir.path(), 5);
    std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("bin.dat"), [0u8, 1u8]).unwrap();
    std::fs::write(dir.path().join("big.txt"), "x".repeat(10)).unwrap();
    std::fs::create_dir(dir.path().join("d")).unwrap();

    assert_eq!(ws.read("a.txt").await.unwrap(), "hello");
    assert!(matches!(ws.read("missing.txt").await, Err(Error::NotFound(_))));
    assert!(matches!(ws.read("d").await, Err(Error::NotFound(_))));
    assert!(matches!(ws.read("bin.dat").await, Err(Error::NotText(_))));
    assert!(matches!(
        ws.read("big.txt").await,
        Err(Error::TooLarge { size: 10, limit: 5 })
    ));
}

#[tokio::test]
async fn test_write_file() {
    let dir = TempDir::new().unwrap();
    let ws = Workspace::with_limit(dir.path(), 5);

    assert_ok!(ws.write("note.txt", "hi").await);
    assert_eq!(std::fs::read_to_string(dir.path().join("note.txt")).unwrap(), "hi");

    ws.write("deep/er/note.txt", "x").await.unwrap();
    assert!(dir.path().join("deep/er/note.txt").is_file());

    std::fs::create_dir(dir.path().join("d")).unwrap();
    assert!(matches!(ws.write("d", "x").await, Err(Error::InvalidInput(_))));
    assert!(matches!(
        ws.write("big.txt", &"1".repeat(10)).await,
        Err(Error::TooLarge { .. })
    ));
    assert!(!Path::new(&dir.path().join("big.txt")).exists());
}

#[tokio::test]
async fn test_create_file() {
    let (dir, ws) = workspace();

    ws.create("created.txt", "hi").await.unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("created.txt")).unwrap(),
        "hi"
    );
    assert!(matches!(
        ws.create("created.txt", "again").await,
        Err(Error::Conflict(_))
    ));

    std::fs::create_dir(dir.path().join("adir")).unwrap();
    assert!(matches!(ws.create("adir", "").await, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_mkdir() {
    let (dir, ws) = workspace();

    assert_ok!(ws.mkdir("newdir/child").await);
    assert!(dir.path().join("newdir/child").is_dir());
    // Existing directories are fine
    assert_ok!(ws.mkdir("newdir").await);

    assert!(matches!(ws.mkdir("").await, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_delete_path() {
    let (dir, ws) = workspace();
    std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
    std::fs::create_dir(dir.path().join("empty")).unwrap();
    std::fs::create_dir(dir.path().join("d")).unwrap();
    std::fs::write(dir.path().join("d/f.txt"), "x").unwrap();

    ws.delete("a.txt").await.unwrap();
    assert!(!dir.path().join("a.txt").exists());

    ws.delete("empty").await.unwrap();
    assert!(!dir.path().join("empty").exists());

    // Missing paths are a no-op
    ws.delete("missing").await.unwrap();

    assert!(matches!(ws.delete("").await, Err(Error::InvalidInput(_))));
    assert!(matches!(ws.delete(".").await, Err(Error::InvalidInput(_))));
    assert!(matches!(ws.delete("d").await, Err(Error::InvalidInput(_))));
    assert!(dir.path().join("d/f.txt").exists());
}

#[tokio::test]
async fn test_move_path() {
    let (dir, ws) = workspace();
    std::fs::write(dir.path().join("a.txt"), "hi").unwrap();

    ws.rename("a.txt", "moved/b.txt").await.unwrap();
    assert!(dir.path().join("moved/b.txt").exists());
    assert!(!dir.path().join("a.txt").exists());

    assert!(matches!(
        ws.rename("missing", "c.txt").await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        ws.rename("moved/b.txt", "../escape.txt").await,
        Err(Error::PathEscape(_))
    ));
}
