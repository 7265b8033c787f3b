//! Test doubles for code that runs tools or talks to the backend.
//!
//! Compiled for this crate's own tests and, through the `test-utils`
//! feature, for downstream crates' tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use websearch_core::{BackendReply, BackendRequest, ResultItem};

use crate::backend::{BackendError, SearchBackend};
use crate::tool::{Tool, ToolDefinition, ToolError, ToolResult};

/// A [`SearchBackend`] that records every request and answers with a canned outcome.
///
/// Clones share the same recording, so a test can keep one handle and give
/// the other to the tool under test.
#[derive(Clone)]
pub struct StubBackend {
    outcome: Result<BackendReply, BackendError>,
    requests: Arc<Mutex<Vec<BackendRequest>>>,
}

impl StubBackend {
    pub fn replying(reply: BackendReply) -> Self {
        Self {
            outcome: Ok(reply),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: BackendError) -> Self {
        Self {
            outcome: Err(error),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `count` results titled after their position.
    pub fn with_results(query: &str, count: usize) -> Self {
        let results = (0..count)
            .map(|i| ResultItem {
                url: format!("https://example.com/{}", i),
                title: format!("Result {}", i),
                excerpt: format!("Excerpt {}", i),
                ..Default::default()
            })
            .collect();
        Self::replying(BackendReply {
            query: query.to_string(),
            results,
            error: None,
        })
    }

    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    async fn search(&self, request: &BackendRequest) -> Result<BackendReply, BackendError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.outcome.clone()
    }
}

/// Echoes back its `message` argument.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "echo".to_string(),
            description: "Echoes back the input message. For testing.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "The message to echo back"
                    }
                },
                "required": ["message"]
            }),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let message = input
            .get("message")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidInput("missing 'message' field".to_string()))?;

        Ok(ToolResult::text(message))
    }
}
