//! HTTP client for the crawl backend.
//!
//! One `POST {base_url}/crawl` per search, no retries. Every failure is
//! normalised into a [`BackendError`] whose `Display` is the bare message, so
//! callers can surface it as `"Error: <message>"`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use websearch_core::config::BackendConfig;
use websearch_core::{BackendReply, BackendRequest};

/// Anything that can answer a [`BackendRequest`].
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &BackendRequest) -> Result<BackendReply, BackendError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// Connection refused, DNS failure, timeout, broken body stream.
    #[error("{message}")]
    Network { message: String },

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx reply whose body is not a crawl response.
    #[error("{message}")]
    InvalidReply { message: String },
}

impl BackendError {
    fn network(err: reqwest::Error) -> Self {
        BackendError::Network {
            message: describe(&err),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BackendError::Network { message }
            | BackendError::Status { message, .. }
            | BackendError::InvalidReply { message } => message,
        }
    }
}

/// Render an error together with its source chain.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Pull the `error` string out of a JSON error body, if there is one.
fn body_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.as_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_string())
}

/// reqwest-backed [`SearchBackend`] talking to the crawl service.
pub struct CrawlerClient {
    base_url: String,
    http: reqwest::Client,
}

impl CrawlerClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(BackendError::network)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(&config.api_url, config.timeout())
    }

    pub fn crawl_url(&self) -> String {
        format!("{}/crawl", self.base_url)
    }
}

#[async_trait]
impl SearchBackend for CrawlerClient {
    async fn search(&self, request: &BackendRequest) -> Result<BackendReply, BackendError> {
        let url = self.crawl_url();
        debug!(url = %url, query = %request.query, "Sending crawl request");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(BackendError::network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = body_error(&body).unwrap_or_else(|| {
                format!("Request failed with status code {}", status.as_u16())
            });
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(BackendError::network)?;
        serde_json::from_slice(&body).map_err(|e| BackendError::InvalidReply {
            message: format!("invalid crawl response: {}", e),
        })
    }
}
