use super::security::check_command;
use super::*;
use crate::error::Error;
use futures::StreamExt;
use tempfile::TempDir;

fn tokens(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_default_allowlist() {
    let config = ExecConfig::default();

    for name in ["ls", "dir", "git", "npm", "pnpm", "pip", "pytest", "python", "node"] {
        assert!(check_command(&config, &tokens(&[name])).is_ok(), "{name} should pass");
    }

    for name in ["rm", "bash", "sh", "curl", "sudo", "/bin/ls", "/tmp/evil/ls", "LS"] {
        assert!(
            matches!(
                check_command(&config, &tokens(&[name])),
                Err(Error::CommandNotAllowed(_))
            ),
            "{name} should be blocked"
        );
    }
}

#[test]
fn test_custom_allowlist() {
    let config = ExecConfig::with_allowed(["echo"]);
    assert!(check_command(&config, &tokens(&["echo", "hi"])).is_ok());
    assert!(check_command(&config, &tokens(&["ls"])).is_err());
}

#[tokio::test]
async fn test_rejects_before_spawn() {
    let dir = TempDir::new().unwrap();
    let config = ExecConfig::default();

    let result = run_command(&config, &tokens(&["rm", "-rf", "/"]), dir.path());
    assert!(matches!(result, Err(Error::CommandNotAllowed(ref c)) if c == "rm"));

    let result = run_command(&config, &[], dir.path());
    assert!(matches!(result, Err(Error::EmptyCommand)));
}

#[cfg(unix)]
#[tokio::test]
async fn test_ls_yields_lines_in_order() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();
    std::fs::write(dir.path().join("b.txt"), "").unwrap();
    std::fs::create_dir(dir.path().join("c")).unwrap();

    let config = ExecConfig::default();
    let lines: Vec<String> = run_command(&config, &tokens(&["ls", "-1"]), dir.path())
        .unwrap()
        .collect()
        .await;

    assert_eq!(lines, vec!["a.txt", "b.txt", "c"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_each_call_spawns_fresh_process() {
    let dir = TempDir::new().unwrap();
    let config = ExecConfig::default();

    let first: Vec<String> = run_command(&config, &tokens(&["ls"]), dir.path())
        .unwrap()
        .collect()
        .await;
    assert!(first.is_empty());

    std::fs::write(dir.path().join("new.txt"), "").unwrap();
    let second: Vec<String> = run_command(&config, &tokens(&["ls"]), dir.path())
        .unwrap()
        .collect()
        .await;
    assert_eq!(second, vec!["new.txt"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_stderr_is_merged() {
    let dir = TempDir::new().unwrap();
    let config = ExecConfig::default();

    let lines: Vec<String> = run_command(&config, &tokens(&["ls", "does-not-exist"]), dir.path())
        .unwrap()
        .collect()
        .await;

    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("does-not-exist"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_interleaved_stderr_keeps_order() {
    let dir = TempDir::new().unwrap();
    let config = ExecConfig::with_allowed(["sh"]);
    let script = "echo 1; echo 2 >&2; echo 3; echo 4 >&2; echo 5; echo 6 >&2";

    for _ in 0..20 {
        let lines: Vec<String> = run_command(&config, &tokens(&["sh", "-c", script]), dir.path())
            .unwrap()
            .collect()
            .await;
        assert_eq!(lines, vec!["1", "2", "3", "4", "5", "6"]);
    }
}
