use clap::Parser;
use std::path::PathBuf;

/// Interactive test client for the websearch MCP server.
///
/// Spawns the server as a child process, sends each typed line as a
/// `web_search` call, and prints the responses.
#[derive(Parser, Debug)]
#[command(name = "websearch-test-client", version, about)]
pub struct CliArgs {
    /// Server binary to spawn (default: websearch-mcp next to this executable, else on PATH)
    #[arg(long)]
    pub server: Option<PathBuf>,

    /// Backend base URL handed to the server (overrides API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// numResults sent with every query (overrides MAX_SEARCH_RESULT)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_results: Option<u32>,

    /// Extra arguments passed through to the server
    #[arg(last = true)]
    pub server_args: Vec<String>,
}

/// Locate the server binary when `--server` is not given.
pub fn default_server_path() -> PathBuf {
    let name = format!("websearch-mcp{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| PathBuf::from(name))
}
