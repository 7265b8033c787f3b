//! MCP (Model Context Protocol) plumbing for the web search tool server.
//!
//! Implements the MCP protocol over JSON-RPC 2.0 on newline-delimited stdio.
//!
//! # Architecture
//!
//! - **types**: JSON-RPC 2.0 and MCP-specific protocol types
//! - **codec**: one message per line, encode/decode
//! - **transport**: line transports (stdio, child pipes, channels)
//! - **server**: MCP server wrapping a `ToolRegistry`
//! - **client**: request numbering and response correlation for a spawned server
//! - **error**: Unified error types
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use websearch_mcp::server::McpServer;
//! use websearch_mcp::transport::StdioTransport;
//! use websearch_tool_runtime::{CrawlerClient, ToolRegistry, WebSearchTool};
//!
//! # async fn example() {
//! let backend = CrawlerClient::new("http://localhost:3001", None).unwrap();
//! let mut registry = ToolRegistry::new();
//! registry.register(WebSearchTool::new(Arc::new(backend))).unwrap();
//! let mut server = McpServer::new(registry);
//! let mut transport = StdioTransport::stdio();
//! server.run(&mut transport).await.unwrap();
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod server;
pub mod transport;
pub mod types;

pub use client::{Correlated, Inbound, McpClient, SpawnedServer};
pub use codec::{decode, encode, DecodeError};
pub use error::McpError;
pub use server::{McpServer, ServerState};
pub use transport::{ChannelTransport, LineTransport, McpTransport, StdioTransport};
pub use types::*;
