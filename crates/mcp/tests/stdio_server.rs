//! End-to-end tests: spawn the `websearch-mcp` binary and talk to it over
//! its stdio, with a wiremock crawl backend behind it.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use websearch_mcp::{
    error_codes, CallToolResult, Correlated, Inbound, JsonRpcResponse, McpClient, Message, RpcId,
    SpawnedServer,
};

fn server_command(api_url: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_websearch-mcp"));
    cmd.env("API_URL", api_url)
        .env_remove("API_TIMEOUT_SECS")
        .env("RUST_LOG", "warn");
    cmd
}

async fn next_response(inbound: &mut mpsc::Receiver<Inbound>) -> JsonRpcResponse {
    let item = tokio::time::timeout(Duration::from_secs(10), inbound.recv())
        .await
        .expect("server did not answer in time");
    match item {
        Some(Inbound::Message(Message::Response(resp))) => resp,
        other => panic!("expected a response, got {:?}", other),
    }
}

#[tokio::test]
async fn search_round_trip_through_binary() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crawl"))
        .and(body_partial_json(json!({"query": "rust memory safety", "numResults": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "rust memory safety",
            "results": [{"url": "https://a", "title": "T", "excerpt": "E"}],
            "error": null
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let SpawnedServer {
        mut child,
        mut client,
        mut inbound,
        ..
    } = McpClient::spawn(server_command(&backend.uri())).unwrap();

    client
        .call_tool(
            "web_search",
            json!({"query": "rust memory safety", "numResults": 3}),
        )
        .await
        .unwrap();

    let resp = next_response(&mut inbound).await;
    let response = match client.correlate(resp) {
        Correlated::Matched { response, .. } => response,
        Correlated::Unsolicited(resp) => panic!("uncorrelated {:?}", resp),
    };
    assert_eq!(response.id, RpcId::Number(1));

    let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
    assert!(!result.is_error);
    let doc: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
    assert_eq!(
        doc,
        json!({
            "query": "rust memory safety",
            "results": [{"title": "T", "snippet": "E", "url": "https://a", "siteName": "", "byline": ""}]
        })
    );

    drop(client);
    let status = tokio::time::timeout(Duration::from_secs(10), child.wait())
        .await
        .unwrap()
        .unwrap();
    assert!(status.success(), "clean stdin close must exit 0, got {:?}", status);
}

#[tokio::test]
async fn invalid_arguments_never_reach_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crawl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "x", "results": [], "error": null
        })))
        .expect(0)
        .mount(&backend)
        .await;

    let SpawnedServer {
        mut child,
        mut client,
        mut inbound,
        ..
    } = McpClient::spawn(server_command(&backend.uri())).unwrap();

    client
        .call_tool("web_search", json!({"query": "rust", "numResults": -1}))
        .await
        .unwrap();
    let resp = next_response(&mut inbound).await;
    assert_eq!(resp.id, RpcId::Number(1));
    assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);

    drop(client);
    child.wait().await.unwrap();
    backend.verify().await;
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crawl"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "crawler exploded"})),
        )
        .mount(&backend)
        .await;

    let mut cmd = server_command(&backend.uri());
    cmd.stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .kill_on_drop(true);
    let mut child = cmd.spawn().unwrap();
    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let (mut inbound, _reader) = websearch_mcp::client::spawn_reader(stdout);

    stdin.write_all(b"this is not json\n").await.unwrap();
    stdin
        .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"call_tool\",\"params\":{\"name\":\"web_search\",\"arguments\":{\"query\":\"boom\"}}}\n")
        .await
        .unwrap();
    stdin.flush().await.unwrap();

    let resp = next_response(&mut inbound).await;
    assert_eq!(resp.id, RpcId::Number(9));
    let result: CallToolResult = serde_json::from_value(resp.result.unwrap()).unwrap();
    assert!(result.is_error);
    assert_eq!(result.first_text(), Some("Error: crawler exploded"));

    drop(stdin);
    let status = child.wait().await.unwrap();
    assert!(status.success());
}
