//! Error types for the MCP crate.

use crate::codec::DecodeError;
use crate::types::{error_codes, JsonRpcError};

/// Errors that can occur during MCP operations.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Failed to serialize or parse JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A line did not decode into a protocol message.
    #[error("Malformed message: {0}")]
    Decode(#[from] DecodeError),

    /// Transport I/O error.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The requested method is not supported.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters for a method.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The requested tool was not found in the registry.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The MCP server process exited or is unavailable.
    #[error("Server unavailable: {0}")]
    ServerUnavailable(String),
}

impl McpError {
    /// Convert to a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let code = match self {
            McpError::JsonParse(_) => error_codes::PARSE_ERROR,
            McpError::Decode(_) => error_codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) | McpError::ToolNotFound(_) => {
                error_codes::METHOD_NOT_FOUND
            }
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            _ => error_codes::INTERNAL_ERROR,
        };
        JsonRpcError {
            code,
            message: self.to_string(),
            data: None,
        }
    }
}
