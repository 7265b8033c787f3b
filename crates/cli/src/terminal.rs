use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use serde_json::Value;
use std::io::{self, Write};
use std::path::Path;

use websearch_mcp::{Correlated, JsonRpcRequest, JsonRpcResponse, Message};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const PROMPT: Color = Color::Green;
    const REQUEST: Color = Color::Yellow;
    const RESPONSE: Color = Color::Cyan;
    const RESULT: Color = Color::DarkGreen;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// How the text payload of a tool result should be shown.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// The first text block parsed as JSON.
    Json(Value),
    /// The first text block, verbatim.
    Raw(String),
    /// No text block to show.
    Empty,
}

/// Pull `content[0].text` out of a `CallToolResult` value and try it as JSON.
pub fn result_view(result: &Value) -> ResultView {
    let text = result
        .get("content")
        .and_then(|content| content.get(0))
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str);

    match text {
        None => ResultView::Empty,
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(json) => ResultView::Json(json),
            Err(_) => ResultView::Raw(text.to_string()),
        },
    }
}

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

/// Terminal output for the interactive test client.
#[derive(Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, server: &Path, api_url: &str, max_results: u32) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("WebSearch MCP Test Client"),
            ResetColor,
            Print("\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Server: {}\n", server.display())),
            Print(format!("Backend: {} | numResults: {}\n", api_url, max_results)),
            Print("Type a search query and press Enter. Type 'exit' to quit.\n"),
            Print("---\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Show the input prompt.
    pub fn prompt(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::PROMPT),
            Print("Search> "),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Echo a request exactly as it went to the server.
    pub fn print_request(&self, request: &JsonRpcRequest) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::REQUEST),
            Print("Sending request:\n"),
            ResetColor,
            Print(format!("{}\n", pretty(request))),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Show a correlated response, then its unwrapped payload.
    pub fn display_response(&self, correlated: &Correlated) -> Result<()> {
        match correlated {
            Correlated::Matched { response, .. } => {
                self.print_received(&Message::Response(response.clone()))?;
                self.print_payload(response)
            }
            Correlated::Unsolicited(response) => {
                self.print_info(&format!(
                    "Response id {} does not match any pending request",
                    response.id
                ))?;
                self.print_received(&Message::Response(response.clone()))
            }
        }
    }

    /// Show any message from the server, pretty-printed.
    pub fn print_received(&self, message: &Message) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::RESPONSE),
            Print("Received from server:\n"),
            ResetColor,
            Print(format!("{}\n", pretty(message))),
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn print_payload(&self, response: &JsonRpcResponse) -> Result<()> {
        if let Some(error) = &response.error {
            return self.print_error(&format!("[{}] {}", error.code, error.message));
        }
        let Some(result) = &response.result else {
            return Ok(());
        };
        let is_error = result
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut stdout = io::stdout();
        match result_view(result) {
            ResultView::Json(json) => {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::HEADER),
                    Print("Search Results:\n"),
                    SetForegroundColor(Colors::RESULT),
                    Print(format!("{}\n", pretty(&json))),
                    ResetColor,
                )?;
            }
            ResultView::Raw(text) => {
                let color = if is_error { Colors::ERROR } else { Colors::RESULT };
                execute!(
                    stdout,
                    SetForegroundColor(Colors::HEADER),
                    Print("Result Content:\n"),
                    SetForegroundColor(color),
                    Print(format!("{}\n", text)),
                    ResetColor,
                )?;
            }
            ResultView::Empty => {}
        }
        stdout.flush()?;
        Ok(())
    }

    /// Show a line from the server that was not a protocol message.
    pub fn print_raw(&self, line: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print("Raw output:\n"),
            ResetColor,
            Print(format!("{}\n", line)),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }
}
