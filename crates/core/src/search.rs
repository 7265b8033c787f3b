//! Search data model shared by the tool, the backend client and the test client.
//!
//! Wire names are camelCase to match the crawl backend and the MCP tool schema.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Tool arguments ────────────────────────────────────────────

/// Category of results the backend should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    All,
    News,
    Blogs,
}

impl ResultType {
    pub const ALL: [ResultType; 3] = [ResultType::All, ResultType::News, ResultType::Blogs];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::All => "all",
            ResultType::News => "news",
            ResultType::Blogs => "blogs",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of the `web_search` tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArgs {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_results: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_terms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_type: Option<ResultType>,
}

impl SearchArgs {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Check the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("'query' must be a non-empty string".to_string());
        }
        if let Some(n) = self.num_results {
            if n <= 0 {
                return Err(format!("'numResults' must be greater than 0, got {}", n));
            }
        }
        Ok(())
    }
}

// ── Backend wire format ───────────────────────────────────────

/// Body of `POST /crawl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_results: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub filters: SearchFilters,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_terms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_type: Option<ResultType>,
}

impl From<SearchArgs> for BackendRequest {
    fn from(args: SearchArgs) -> Self {
        Self {
            query: args.query,
            num_results: args.num_results,
            language: args.language,
            region: args.region,
            filters: SearchFilters {
                exclude_domains: args.exclude_domains,
                include_domains: args.include_domains,
                exclude_terms: args.exclude_terms,
                result_type: args.result_type,
            },
        }
    }
}

/// Reply of `POST /crawl`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackendReply {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub results: Vec<ResultItem>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ── Rendered tool output ──────────────────────────────────────

/// Document placed in the text block of a successful `web_search` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedResult {
    pub query: String,
    pub results: Vec<RenderedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedItem {
    pub title: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub url: String,
    pub site_name: String,
    pub byline: String,
}

impl From<ResultItem> for RenderedItem {
    fn from(item: ResultItem) -> Self {
        Self {
            title: item.title,
            snippet: item.excerpt,
            text: item.text,
            url: item.url,
            site_name: item.site_name.unwrap_or_default(),
            byline: item.byline.unwrap_or_default(),
        }
    }
}

impl From<BackendReply> for RenderedResult {
    fn from(reply: BackendReply) -> Self {
        Self {
            query: reply.query,
            results: reply.results.into_iter().map(RenderedItem::from).collect(),
        }
    }
}
