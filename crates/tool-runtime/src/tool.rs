use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Describes a tool's interface for MCP clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g., "web_search")
    pub name: String,
    /// Human-readable description shown to the caller
    pub description: String,
    /// JSON Schema describing the expected input
    pub input_schema: Value,
}

/// Outcome of a tool execution that reached the tool's own logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Result content (text or JSON-encoded document)
    pub content: String,
    /// Whether this result represents an error the caller should display
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// The primary extension point: all tools implement this trait.
///
/// Tools are object-safe, Send + Sync, and async.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition (name, description, JSON Schema).
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given JSON input.
    ///
    /// `Err` is reserved for calls the tool refused to run; failures of the
    /// work itself come back as `Ok` with `is_error` set.
    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments: {0}")]
    InvalidInput(String),
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl fmt::Display for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition_serialization() {
        let def = ToolDefinition {
            name: "test_tool".to_string(),
            description: "A test tool".to_string(),
            input_schema: serde_json::json!({"type": "object"}),
        };
        let json = serde_json::to_string(&def).unwrap();
        let roundtrip: ToolDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.name, "test_tool");
        assert_eq!(def.to_string(), "test_tool(A test tool)");
    }

    #[test]
    fn test_tool_result_constructors() {
        let ok = ToolResult::text("hello");
        assert!(!ok.is_error);
        assert_eq!(ok.content, "hello");

        let err = ToolResult::error("Error: boom");
        assert!(err.is_error);
    }

    #[test]
    fn test_tool_error_messages() {
        assert_eq!(
            ToolError::UnknownTool("nope".to_string()).to_string(),
            "Unknown tool: nope"
        );
        assert_eq!(
            ToolError::InvalidInput("missing field `query`".to_string()).to_string(),
            "Invalid arguments: missing field `query`"
        );
    }
}
