//! Drive the `websearch-test-client` binary with small shell scripts standing
//! in for the server, and check how the session ends.
#![cfg(unix)]

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

fn harness(server_script: &str) -> Child {
    Command::new(env!("CARGO_BIN_EXE_websearch-test-client"))
        .args(["--server", "sh", "--max-results", "2", "--", "-c", server_script])
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("spawn websearch-test-client")
}

async fn finish(child: Child) -> Output {
    tokio::time::timeout(Duration::from_secs(10), child.wait_with_output())
        .await
        .expect("harness did not exit in time")
        .unwrap()
}

#[tokio::test]
async fn server_exit_code_is_propagated() {
    let mut child = harness("exit 7");
    // keep stdin open so only the server exit can end the session
    let stdin = child.stdin.take().unwrap();

    let output = finish(child).await;
    drop(stdin);

    assert_eq!(output.status.code(), Some(7));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Server exited with code 7"), "stdout: {stdout}");
}

#[tokio::test]
async fn exit_command_kills_server_and_exits_zero() {
    let mut child = harness("sleep 30");
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"EXIT\n").await.unwrap();
    stdin.flush().await.unwrap();

    let output = finish(child).await;
    drop(stdin);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Exiting..."), "stdout: {stdout}");
    assert!(!stdout.contains("Server exited"), "stdout: {stdout}");
}

#[tokio::test]
async fn closed_stdin_exits_zero() {
    let mut child = harness("sleep 30");
    drop(child.stdin.take());

    let output = finish(child).await;
    assert_eq!(output.status.code(), Some(0));
}

#[tokio::test]
async fn query_is_sent_and_error_result_is_shown() {
    // answer the first request, then wait for more input
    let script = r#"read line; printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"content":[{"type":"text","text":"Error: boom"}],"isError":true}}'; read next"#;
    let mut child = harness(script);
    let mut stdin = child.stdin.take().unwrap();
    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();

    stdin.write_all(b"\n  rust memory safety  \n").await.unwrap();
    stdin.flush().await.unwrap();

    // the raw response also carries the text, so wait for the unwrapped copy
    let mut seen: Vec<String> = Vec::new();
    let shown = tokio::time::timeout(Duration::from_secs(10), async {
        let mut unwrapping = false;
        while let Some(line) = lines.next_line().await.unwrap() {
            unwrapping |= line.contains("Result Content:");
            let done = unwrapping && line.contains("Error: boom");
            seen.push(line);
            if done {
                return true;
            }
        }
        false
    })
    .await
    .expect("result was not shown in time");
    let transcript = seen.join("\n");
    assert!(shown, "transcript: {transcript}");

    assert!(transcript.contains("\"method\": \"call_tool\""), "transcript: {transcript}");
    assert!(transcript.contains("\"id\": 1"), "transcript: {transcript}");
    assert!(transcript.contains("\"query\": \"rust memory safety\""), "transcript: {transcript}");
    assert!(transcript.contains("\"numResults\": 2"), "transcript: {transcript}");
    assert!(transcript.contains("Result Content:"), "transcript: {transcript}");
    assert!(!transcript.contains("\"id\": 2"), "blank line must not be sent: {transcript}");

    stdin.write_all(b"exit\n").await.unwrap();
    stdin.flush().await.unwrap();
    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .expect("harness did not exit in time")
        .unwrap();
    assert_eq!(status.code(), Some(0));
}
