//! websearch-mcp — MCP server exposing a single `web_search` tool over stdio.
//!
//! Reads JSON-RPC requests from stdin, one per line, and writes responses to
//! stdout. Logs go to stderr. Searches are forwarded to `POST {API_URL}/crawl`.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use websearch_core::config::{self, Config};
use websearch_mcp::{McpServer, StdioTransport};
use websearch_tool_runtime::{CrawlerClient, ToolRegistry, WebSearchTool};

// ── CLI ─────────────────────────────────────────────────────────────

/// MCP server that searches the web through a crawl backend.
#[derive(Parser, Debug)]
#[command(name = "websearch-mcp", version, about)]
struct Cli {
    /// Backend base URL (overrides API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// HTTP timeout for backend calls in seconds (overrides API_TIMEOUT_SECS).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries protocol frames, so all logging goes to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    config::load_dotenv();
    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config.backend.api_url = url;
    }
    if let Some(secs) = cli.timeout_secs {
        config.backend.timeout_secs = Some(secs);
    }
    config.log_summary();

    let backend =
        CrawlerClient::from_config(&config.backend).context("failed to create backend client")?;

    let mut registry = ToolRegistry::new();
    registry
        .register(WebSearchTool::new(Arc::new(backend)))
        .context("failed to register web_search tool")?;

    let mut server = McpServer::new(registry).with_name("WebSearch-MCP");
    let mut transport = StdioTransport::stdio();

    info!(api_url = %config.backend.api_url, "Starting WebSearch MCP server");
    server
        .run(&mut transport)
        .await
        .context("MCP server terminated abnormally")?;

    info!("WebSearch MCP server stopped");
    Ok(())
}
