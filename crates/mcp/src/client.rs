//! MCP client side of the stdio protocol.
//!
//! Spawns a server subprocess, numbers outgoing requests from 1, and keeps
//! the table of requests still waiting for an answer. Reading happens on a
//! dedicated task that decodes each line of the server's stdout and forwards
//! it over a channel, so the caller can `select!` on it without losing
//! partially read lines.

use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::codec::{self, DecodeError};
use crate::error::McpError;
use crate::transport::{LineTransport, McpTransport};
use crate::types::*;

/// What the reader task saw on one line of server output.
#[derive(Debug)]
pub enum Inbound {
    Message(Message),
    Undecodable { line: String, error: DecodeError },
}

/// A response matched (or not) against the pending table.
#[derive(Debug, Clone, PartialEq)]
pub enum Correlated {
    /// Answers a request we sent; carries that request's method.
    Matched {
        method: String,
        response: JsonRpcResponse,
    },
    /// No pending request has this id.
    Unsolicited(JsonRpcResponse),
}

/// Writes requests to an MCP server and correlates the answers by id.
pub struct McpClient<W> {
    writer: W,
    next_id: i64,
    pending: HashMap<RpcId, String>,
}

/// A server subprocess wired to a client.
pub struct SpawnedServer {
    pub child: Child,
    pub client: McpClient<ChildStdin>,
    pub inbound: mpsc::Receiver<Inbound>,
    pub reader: JoinHandle<()>,
}

impl McpClient<ChildStdin> {
    /// Spawn the server described by `command` and connect to it.
    ///
    /// stdin/stdout are piped for JSON-RPC; stderr is inherited so the
    /// server's logs reach the terminal.
    pub fn spawn(mut command: Command) -> Result<SpawnedServer, McpError> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        tracing::info!(pid = ?child.id(), "Spawned MCP server process");

        let stdin = child.stdin.take().ok_or_else(|| {
            McpError::ServerUnavailable("Failed to capture server stdin".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            McpError::ServerUnavailable("Failed to capture server stdout".to_string())
        })?;

        let (inbound, reader) = spawn_reader(stdout);
        Ok(SpawnedServer {
            child,
            client: McpClient::new(stdin),
            inbound,
            reader,
        })
    }
}

impl<W: AsyncWrite + Unpin> McpClient<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            next_id: 1,
            pending: HashMap::new(),
        }
    }

    /// Assign the next id, record it as pending, and write the request.
    ///
    /// Returns the request exactly as sent.
    pub async fn send_request(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<JsonRpcRequest, McpError> {
        let id = RpcId::Number(self.next_id);
        self.next_id += 1;

        let request = JsonRpcRequest::new(id.clone(), method, params);
        let frame = codec::encode(&Message::Request(request.clone()))?;

        tracing::debug!(method = %method, id = %id, "Sending request");
        self.writer.write_all(frame.as_bytes()).await?;
        self.writer.flush().await?;

        self.pending.insert(id, method.to_string());
        Ok(request)
    }

    /// Send a tool invocation using the `call_tool` method name.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<JsonRpcRequest, McpError> {
        let params = serde_json::json!({
            "name": name,
            "arguments": arguments,
        });
        self.send_request(methods::CALL_TOOL, Some(params)).await
    }

    /// Send a JSON-RPC notification (no response expected).
    pub async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        let frame = codec::encode(&Message::Notification(JsonRpcNotification::new(method, params)))?;
        self.writer.write_all(frame.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Match a response against the pending table, removing it on a hit.
    pub fn correlate(&mut self, response: JsonRpcResponse) -> Correlated {
        match self.pending.remove(&response.id) {
            Some(method) => Correlated::Matched { method, response },
            None => {
                tracing::warn!(id = %response.id, "Response does not match any pending request");
                Correlated::Unsolicited(response)
            }
        }
    }

    /// Number of requests still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The id the next request will carry.
    pub fn next_id(&self) -> i64 {
        self.next_id
    }
}

/// Decode lines from `reader` on a background task.
///
/// The channel closes when the reader hits EOF or fails.
pub fn spawn_reader<R>(reader: R) -> (mpsc::Receiver<Inbound>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel(32);
    let handle = tokio::spawn(async move {
        let mut transport = LineTransport::new(reader, tokio::io::sink());
        loop {
            let line = match transport.receive().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed reading server output");
                    break;
                }
            };
            let item = match codec::decode(&line) {
                Ok(message) => Inbound::Message(message),
                Err(error) => Inbound::Undecodable { line, error },
            };
            if tx.send(item).await.is_err() {
                break;
            }
        }
        tracing::debug!("Server output closed");
    });
    (rx, handle)
}
