//! MCP server implementation.
//!
//! Wraps a `ToolRegistry` and exposes its tools over the MCP protocol.
//! Requests are handled strictly one at a time: a tool call, including its
//! backend round trip, is answered before the next line is read.

use serde::Serialize;
use serde_json::Value;

use websearch_tool_runtime::{ToolError, ToolRegistry};

use crate::codec;
use crate::error::McpError;
use crate::transport::McpTransport;
use crate::types::*;

/// Lifecycle of a server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Listening,
    ShuttingDown,
}

/// MCP server that bridges a `ToolRegistry` to MCP clients.
pub struct McpServer {
    registry: ToolRegistry,
    server_name: String,
    server_version: String,
    initialized: bool,
    state: ServerState,
}

impl McpServer {
    /// Create a new MCP server wrapping the given tool registry.
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            server_name: "websearch-mcp".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            initialized: false,
            state: ServerState::Starting,
        }
    }

    /// Set the server name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Whether a client has completed the `initialize` handshake.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn transition(&mut self, next: ServerState) {
        tracing::debug!(from = ?self.state, to = ?next, "Server state change");
        self.state = next;
    }

    /// Run the server loop, reading from and writing to the transport.
    ///
    /// Returns `Ok(())` when the peer closes the stream. Transport I/O
    /// failures end the loop with an error; malformed lines are logged and
    /// skipped.
    pub async fn run<T: McpTransport>(&mut self, transport: &mut T) -> Result<(), McpError> {
        tracing::info!(
            server = %self.server_name,
            tools = self.registry.len(),
            "MCP server listening"
        );
        self.transition(ServerState::Listening);

        let outcome = self.serve(transport).await;
        self.transition(ServerState::ShuttingDown);
        match &outcome {
            Ok(()) => tracing::info!("Transport closed, shutting down"),
            Err(e) => tracing::error!(error = %e, "Transport failed, shutting down"),
        }
        outcome
    }

    async fn serve<T: McpTransport>(&mut self, transport: &mut T) -> Result<(), McpError> {
        while let Some(line) = transport.receive().await? {
            tracing::debug!(message = %line, "Received message");

            let message = match codec::decode(&line) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(error = %e, line = %line, "Skipping malformed message");
                    continue;
                }
            };

            match message {
                Message::Request(request) => {
                    let response = self.handle_request(&request).await;
                    tracing::debug!(id = %response.id, "Sending response");
                    transport.send_message(&Message::Response(response)).await?;
                }
                Message::Notification(notif) => self.handle_notification(&notif),
                Message::Response(response) => {
                    tracing::debug!(id = %response.id, "Ignoring response; server has no requests in flight");
                }
            }
        }
        Ok(())
    }

    /// Handle a single JSON-RPC request and produce a response.
    pub async fn handle_request(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(id, &request.params),
            methods::PING => JsonRpcResponse::success(id, serde_json::json!({})),
            methods::TOOLS_LIST => self.handle_list_tools(id),
            methods::TOOLS_CALL | methods::CALL_TOOL => {
                self.handle_call_tool(id, &request.params).await
            }
            method => {
                tracing::warn!(method = %method, "Unknown method");
                error_response(id, McpError::MethodNotFound(method.to_string()))
            }
        }
    }

    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            methods::INITIALIZED => {
                tracing::info!("Client confirmed initialization");
            }
            methods::CANCELLED => {
                tracing::debug!("Client cancelled a request");
            }
            method => {
                tracing::debug!(method = %method, "Unknown notification, ignoring");
            }
        }
    }

    fn handle_initialize(&mut self, id: RpcId, params: &Option<Value>) -> JsonRpcResponse {
        let client = params
            .as_ref()
            .and_then(|p| serde_json::from_value::<InitializeParams>(p.clone()).ok());
        match &client {
            Some(p) => tracing::info!(
                client = %p.client_info.name,
                protocol = %p.protocol_version,
                "Handling initialize"
            ),
            None => tracing::info!("Handling initialize"),
        }
        self.initialized = true;

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: Some(self.server_version.clone()),
            },
        };
        success_response(id, result)
    }

    fn handle_list_tools(&self, id: RpcId) -> JsonRpcResponse {
        tracing::debug!("Handling tools/list");

        let tools: Vec<ToolInfo> = self.registry.list().into_iter().map(ToolInfo::from).collect();
        success_response(id, ListToolsResult { tools })
    }

    async fn handle_call_tool(&self, id: RpcId, params: &Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => {
                return error_response(id, McpError::InvalidParams("missing params".to_string()));
            }
        };

        let call_params: CallToolParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => return error_response(id, McpError::InvalidParams(e.to_string())),
        };

        tracing::info!(tool = %call_params.name, id = %id, "Handling tool call");

        let result = match self.registry.call(&call_params.name, call_params.arguments).await {
            Ok(tool_result) => CallToolResult::from(tool_result),
            Err(ToolError::UnknownTool(name)) => {
                tracing::warn!(tool = %name, "Unknown tool");
                return error_response(id, McpError::ToolNotFound(name));
            }
            Err(ToolError::InvalidInput(reason)) => {
                tracing::warn!(tool = %call_params.name, error = %reason, "Invalid tool arguments");
                return error_response(
                    id,
                    McpError::InvalidParams(format!(
                        "invalid arguments for tool '{}': {}",
                        call_params.name, reason
                    )),
                );
            }
            Err(e) => {
                tracing::warn!(tool = %call_params.name, error = %e, "Tool execution failed");
                CallToolResult {
                    content: vec![ToolContent::Text {
                        text: e.to_string(),
                    }],
                    is_error: true,
                }
            }
        };

        success_response(id, result)
    }
}

fn success_response<T: Serialize>(id: RpcId, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(val) => JsonRpcResponse::success(id, val),
        Err(e) => error_response(id, McpError::JsonParse(e)),
    }
}

fn error_response(id: RpcId, err: McpError) -> JsonRpcResponse {
    let rpc = err.to_rpc_error();
    JsonRpcResponse::error(id, rpc.code, rpc.message)
}
