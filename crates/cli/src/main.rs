mod cli;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::io::BufRead;
use std::process::ExitCode;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

use websearch_core::config::{self, Config};
use websearch_mcp::{Inbound, McpClient, Message, SpawnedServer};
use websearch_tool_runtime::tools::web_search::WEB_SEARCH;

use crate::cli::{default_server_path, CliArgs};
use crate::terminal::Terminal;

/// Why the interactive loop stopped.
enum Exit {
    /// `exit` typed or stdin closed.
    User,
    /// The server process ended on its own.
    Server(Option<i32>),
}

/// Lines typed by the user, read on a plain thread. A blocking stdin read
/// cannot be cancelled, so it must not live on the runtime.
fn spawn_input_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new();

    config::load_dotenv();
    let mut config = Config::from_env();
    if let Some(url) = args.api_url {
        config.backend.api_url = url;
    }
    if let Some(n) = args.max_results {
        config.harness.max_search_results = n;
    }
    let max_results = config.harness.max_search_results;

    let server_path = args.server.unwrap_or_else(default_server_path);
    let mut command = Command::new(&server_path);
    command
        .args(&args.server_args)
        .env("API_URL", &config.backend.api_url);

    let SpawnedServer {
        mut child,
        mut client,
        mut inbound,
        ..
    } = McpClient::spawn(command)
        .with_context(|| format!("failed to start server '{}'", server_path.display()))?;

    info!(server = %server_path.display(), "Test client connected");
    terminal.print_banner(&server_path, &config.backend.api_url, max_results)?;
    terminal.prompt()?;

    let mut input = spawn_input_reader();
    let mut server_output_open = true;

    let exit = loop {
        tokio::select! {
            line = input.recv() => {
                let Some(line) = line else {
                    break Exit::User;
                };
                let line = line.context("failed to read from stdin")?;
                let query = line.trim();
                if query.eq_ignore_ascii_case("exit") {
                    break Exit::User;
                }
                if query.is_empty() {
                    terminal.prompt()?;
                    continue;
                }

                let arguments = json!({"query": query, "numResults": max_results});
                match client.call_tool(WEB_SEARCH, arguments).await {
                    Ok(request) => terminal.print_request(&request)?,
                    Err(e) => {
                        terminal.print_error(&format!("failed to send request: {e}"))?;
                        terminal.prompt()?;
                    }
                }
            }

            item = inbound.recv(), if server_output_open => {
                match item {
                    Some(Inbound::Message(Message::Response(response))) => {
                        let correlated = client.correlate(response);
                        terminal.display_response(&correlated)?;
                    }
                    Some(Inbound::Message(other)) => {
                        terminal.print_received(&other)?;
                    }
                    Some(Inbound::Undecodable { line, error }) => {
                        debug!(error = %error, "Undecodable server output");
                        terminal.print_error(&format!("could not parse server output: {error}"))?;
                        terminal.print_raw(&line)?;
                    }
                    None => {
                        // the exit status arrives on the child.wait() branch
                        server_output_open = false;
                        continue;
                    }
                }
                terminal.prompt()?;
            }

            status = child.wait() => {
                let status = status.context("failed to wait for server process")?;
                break Exit::Server(status.code());
            }
        }
    };

    match exit {
        Exit::User => {
            terminal.print_info("Exiting...")?;
            if let Err(e) = child.kill().await {
                debug!(error = %e, "Server process already gone");
            }
            Ok(ExitCode::SUCCESS)
        }
        Exit::Server(code) => {
            let code = code.unwrap_or(0);
            terminal.print_info(&format!("\nServer exited with code {}", code))?;
            Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
        }
    }
}
