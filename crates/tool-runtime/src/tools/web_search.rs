//! `web_search`: forwards a validated query to the crawl backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use websearch_core::{BackendRequest, RenderedResult, SearchArgs};

use crate::backend::SearchBackend;
use crate::tool::{Tool, ToolDefinition, ToolError, ToolResult};

pub const WEB_SEARCH: &str = "web_search";

/// Search the web through the crawl backend.
///
/// Invalid arguments are refused with [`ToolError::InvalidInput`] before any
/// request is made. Backend-reported errors and transport failures both come
/// back as an `"Error: <message>"` result with `is_error` set.
pub struct WebSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl WebSearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    fn parse_args(input: Value) -> Result<SearchArgs, ToolError> {
        let args: SearchArgs = serde_json::from_value(input)
            .map_err(|e| ToolError::InvalidInput(e.to_string()))?;
        args.validate().map_err(ToolError::InvalidInput)?;
        Ok(args)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: WEB_SEARCH.to_string(),
            description: "Search the web and return titles, snippets and page text for the top results."
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The search query to look up"
                    },
                    "numResults": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Number of results to return (default: 5)"
                    },
                    "language": {
                        "type": "string",
                        "description": "Language code for search results (e.g., 'en')"
                    },
                    "region": {
                        "type": "string",
                        "description": "Region code for search results (e.g., 'us')"
                    },
                    "excludeDomains": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Domains to exclude from results"
                    },
                    "includeDomains": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Only include these domains in results"
                    },
                    "excludeTerms": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Terms to exclude from results"
                    },
                    "resultType": {
                        "type": "string",
                        "enum": ["all", "news", "blogs"],
                        "description": "Type of results to return"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let args = Self::parse_args(input).inspect_err(|e| {
            warn!(error = %e, "Rejected web_search arguments");
        })?;

        info!(query = %args.query, "Performing web search");
        let request = BackendRequest::from(args);

        let reply = match self.backend.search(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Error performing web search");
                return Ok(ToolResult::error(format!("Error: {}", e)));
            }
        };

        if let Some(message) = reply.error {
            warn!(error = %message, "Backend reported an error");
            return Ok(ToolResult::error(format!("Error: {}", message)));
        }

        let rendered = RenderedResult::from(reply);
        let text = serde_json::to_string_pretty(&rendered)
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(ToolResult::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::testing::StubBackend;
    use serde_json::json;
    use websearch_core::{BackendReply, ResultItem, ResultType};

    fn tool_with(backend: &StubBackend) -> WebSearchTool {
        WebSearchTool::new(Arc::new(backend.clone()))
    }

    #[tokio::test]
    async fn test_valid_call_forwards_every_field() {
        let backend = StubBackend::with_results("rust", 2);
        let tool = tool_with(&backend);

        let result = tool
            .execute(json!({
                "query": "rust",
                "numResults": 2,
                "language": "en",
                "region": "us",
                "excludeDomains": ["x.com"],
                "includeDomains": ["docs.rs"],
                "excludeTerms": ["crab"],
                "resultType": "news"
            }))
            .await
            .unwrap();

        assert!(!result.is_error);
        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.query, "rust");
        assert_eq!(sent.num_results, Some(2));
        assert_eq!(sent.language.as_deref(), Some("en"));
        assert_eq!(sent.region.as_deref(), Some("us"));
        assert_eq!(sent.filters.exclude_domains, Some(vec!["x.com".to_string()]));
        assert_eq!(sent.filters.include_domains, Some(vec!["docs.rs".to_string()]));
        assert_eq!(sent.filters.exclude_terms, Some(vec!["crab".to_string()]));
        assert_eq!(sent.filters.result_type, Some(ResultType::News));

        let doc: Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(doc["query"], "rust");
        assert_eq!(doc["results"].as_array().unwrap().len(), 2);
        assert_eq!(doc["results"][1]["snippet"], "Excerpt 1");
    }

    #[tokio::test]
    async fn test_rendered_document_shape() {
        let backend = StubBackend::replying(BackendReply {
            query: "rust memory safety".to_string(),
            results: vec![ResultItem {
                url: "https://a".to_string(),
                title: "T".to_string(),
                excerpt: "E".to_string(),
                ..Default::default()
            }],
            error: None,
        });
        let tool = tool_with(&backend);

        let result = tool
            .execute(json!({"query": "rust memory safety"}))
            .await
            .unwrap();
        let doc: Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(
            doc,
            json!({
                "query": "rust memory safety",
                "results": [{
                    "title": "T",
                    "snippet": "E",
                    "url": "https://a",
                    "siteName": "",
                    "byline": ""
                }]
            })
        );
        assert!(doc["results"][0].get("text").is_none());
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_backend() {
        let backend = StubBackend::with_results("unused", 1);
        let tool = tool_with(&backend);

        let cases = [
            json!({}),
            json!({"query": ""}),
            json!({"query": 42}),
            json!({"query": "rust", "numResults": -1}),
            json!({"query": "rust", "numResults": 0}),
            json!({"query": "rust", "numResults": "three"}),
            json!({"query": "rust", "resultType": "videos"}),
            json!({"query": "rust", "excludeDomains": "x.com"}),
            Value::Null,
        ];
        for input in cases {
            let err = tool.execute(input.clone()).await.unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidInput(_)),
                "expected InvalidInput for {}",
                input
            );
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_reported_error_becomes_error_text() {
        let backend = StubBackend::replying(BackendReply {
            query: "rust".to_string(),
            results: vec![],
            error: Some("search provider quota exceeded".to_string()),
        });
        let tool = tool_with(&backend);

        let result = tool.execute(json!({"query": "rust"})).await.unwrap();
        assert!(result.is_error);
        assert_eq!(result.content, "Error: search provider quota exceeded");
    }

    #[tokio::test]
    async fn test_status_error_becomes_error_text() {
        let backend = StubBackend::failing(BackendError::Status {
            status: 500,
            message: "crawler crashed".to_string(),
        });
        let tool = tool_with(&backend);

        let result = tool.execute(json!({"query": "rust"})).await.unwrap();
        assert!(result.is_error);
        assert_eq!(result.content, "Error: crawler crashed");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_becomes_error_text() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let client =
            crate::backend::CrawlerClient::new(&format!("http://127.0.0.1:{}", port), None)
                .unwrap();
        let expected = client
            .search(&BackendRequest::from(SearchArgs::new("rust")))
            .await
            .unwrap_err();

        let tool = WebSearchTool::new(Arc::new(client));
        let result = tool.execute(json!({"query": "rust"})).await.unwrap();
        assert!(result.is_error);
        assert!(result.content.starts_with("Error: "));
        assert!(result.content.contains(expected.message()));
    }

    #[test]
    fn test_definition_schema() {
        let tool = WebSearchTool::new(Arc::new(StubBackend::with_results("q", 0)));
        let def = tool.definition();
        assert_eq!(def.name, "web_search");
        assert_eq!(def.input_schema["required"], json!(["query"]));
        assert_eq!(
            def.input_schema["properties"]["resultType"]["enum"],
            json!(["all", "news", "blogs"])
        );
        assert_eq!(def.input_schema["properties"].as_object().unwrap().len(), 8);
    }
}
