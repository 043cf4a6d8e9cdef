//! Integration tests for Studio
//!
//! These tests verify the integration between the crates:
//! - studio-tools: workspace file operations feeding the command runner and assistant
//! - studio-terminal: shells started inside the workspace through the proxy

use std::time::Duration;

use futures::channel::mpsc;
use futures::StreamExt;
use tempfile::TempDir;
use tokio_test::assert_ok;

use studio_terminal::{
    spawn_shell, CloseReason, OutboundEvent, ProxyState, TerminalConfig, TerminalProxy,
};
use studio_tools::{run_command, AssistantAdapter, AssistantConfig, Error, ExecConfig, Workspace};

// ============================================================================
// Workspace + Command Runner
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_exec_sees_workspace_writes() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    assert_ok!(workspace.write("b.txt", "b").await);
    assert_ok!(workspace.write("a.txt", "a").await);
    assert_ok!(workspace.mkdir("sub").await);

    let tokens = vec!["ls".to_string(), "-1".to_string()];
    let lines: Vec<String> = run_command(&ExecConfig::default(), &tokens, dir.path())
        .unwrap()
        .collect()
        .await;
    assert_eq!(lines, vec!["a.txt", "b.txt", "sub"]);
}

#[tokio::test]
async fn test_exec_cwd_from_guarded_path() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    assert_ok!(workspace.write("nested/inner.txt", "x").await);

    let cwd = workspace.abs_path("nested").unwrap();
    assert!(cwd.starts_with(dir.path().canonicalize().unwrap()));
    assert!(matches!(workspace.abs_path("../outside"), Err(Error::PathEscape(_))));

    let tokens = vec!["rm".to_string(), "-rf".to_string(), "/".to_string()];
    assert!(matches!(
        run_command(&ExecConfig::default(), &tokens, &cwd),
        Err(Error::CommandNotAllowed(_))
    ));
}

// ============================================================================
// Assistant Adapter
// ============================================================================

#[tokio::test]
async fn test_assistant_mock_round_trip() {
    let adapter = AssistantAdapter::mock(Duration::from_millis(1));
    let reply: String = adapter.stream("hello").unwrap().collect::<Vec<_>>().await.concat();
    assert_eq!(reply, "Thinking about your request...\nDone!\n");
}

#[cfg(unix)]
#[tokio::test]
async fn test_assistant_runs_in_workspace() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    assert_ok!(workspace.write("marker.txt", "found\n").await);

    let adapter = AssistantAdapter::new(AssistantConfig {
        command: "cat marker.txt".to_string(),
        working_dir: Some(dir.path().to_path_buf()),
        ..AssistantConfig::default()
    });
    let fragments: Vec<String> = adapter.stream("ignored").unwrap().collect().await;
    assert_eq!(fragments, vec!["found\n"]);
}

// ============================================================================
// Terminal Proxy
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_terminal_shell_reads_workspace_file() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    assert_ok!(workspace.write("hello.txt", "from the workspace").await);

    let config = TerminalConfig {
        cwd: Some(dir.path().to_path_buf()),
        ..TerminalConfig::command("sh", ["-c", "cat hello.txt"])
    };
    let mut proxy = TerminalProxy::with_process(
        "integration",
        spawn_shell(&config).unwrap(),
        Duration::from_millis(500),
    );

    let (out_tx, out_rx) = mpsc::unbounded::<OutboundEvent>();
    let (_in_tx, in_rx) = mpsc::unbounded::<String>();

    let reason = tokio::time::timeout(Duration::from_secs(10), proxy.run(out_tx, in_rx))
        .await
        .unwrap();
    assert_eq!(reason, CloseReason::ProcessExited);
    assert_eq!(proxy.state(), ProxyState::Closed);

    let output: String = out_rx
        .map(|OutboundEvent::Output { data }| data)
        .collect::<Vec<_>>()
        .await
        .concat();
    assert!(output.contains("from the workspace"), "output: {:?}", output);
}

#[cfg(unix)]
#[tokio::test]
async fn test_terminal_interactive_session() {
    let dir = TempDir::new().unwrap();
    let config = TerminalConfig {
        cwd: Some(dir.path().to_path_buf()),
        ..TerminalConfig::command("sh", Vec::<String>::new())
    };
    let mut proxy = TerminalProxy::new("interactive", Duration::from_millis(500));
    assert_ok!(proxy.spawn(&config));

    let (out_tx, mut out_rx) = mpsc::unbounded::<OutboundEvent>();
    let (in_tx, in_rx) = mpsc::unbounded::<String>();
    let session = tokio::spawn(async move { proxy.run(out_tx, in_rx).await });

    in_tx
        .unbounded_send(r#"{"type":"resize","cols":100,"rows":30}"#.to_string())
        .unwrap();
    in_tx
        .unbounded_send(r#"{"type":"input","data":"echo studio-$((40+2))\n"}"#.to_string())
        .unwrap();

    let mut seen = String::new();
    let found = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(OutboundEvent::Output { data }) = out_rx.next().await {
            seen.push_str(&data);
            if seen.contains("studio-42") {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);
    assert!(found, "output: {:?}", seen);

    drop(in_tx);
    let reason = tokio::time::timeout(Duration::from_secs(10), session)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reason, CloseReason::ClientDisconnected);
}
