//! MCP transport layer.
//!
//! Defines the `McpTransport` trait for moving newline-delimited frames, a
//! `LineTransport` over any async reader/writer pair (process stdio, child
//! pipes, in-memory duplex streams), and a channel-backed transport for tests.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::codec;
use crate::error::McpError;
use crate::types::Message;

/// Trait for MCP message transport.
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Read the next non-empty line from the transport, without its newline.
    /// Returns `None` when the transport is closed.
    async fn receive(&mut self) -> Result<Option<String>, McpError>;

    /// Write one complete frame (already newline-terminated).
    async fn send(&mut self, frame: &str) -> Result<(), McpError>;

    /// Encode `message` and write it as one frame.
    async fn send_message(&mut self, message: &Message) -> Result<(), McpError> {
        let frame = codec::encode(message)?;
        self.send(&frame).await
    }
}

/// Newline-delimited JSON over an async reader/writer pair.
///
/// Invalid UTF-8 is replaced rather than treated as an I/O failure, so a
/// garbage line surfaces as a decode error instead of ending the session.
pub struct LineTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
}

/// The server's own stdin/stdout.
pub type StdioTransport = LineTransport<tokio::io::Stdin, tokio::io::Stdout>;

impl<R, W> LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send + Sync,
    W: AsyncWrite + Unpin + Send + Sync,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }
}

impl StdioTransport {
    /// Attach to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

#[async_trait]
impl<R, W> McpTransport for LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send + Sync,
    W: AsyncWrite + Unpin + Send + Sync,
{
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut buf).await?;
            if bytes_read == 0 {
                return Ok(None); // EOF
            }
            let line = String::from_utf8_lossy(&buf);
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    async fn send(&mut self, frame: &str) -> Result<(), McpError> {
        self.writer.write_all(frame.as_bytes()).await?;
        if !frame.ends_with('\n') {
            self.writer.write_all(b"\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }
}

/// In-memory transport for testing, backed by channel pairs.
pub struct ChannelTransport {
    rx: tokio::sync::mpsc::Receiver<String>,
    tx: tokio::sync::mpsc::Sender<String>,
}

impl ChannelTransport {
    /// Create a pair of connected transports for testing.
    ///
    /// Messages sent on one transport are received by the other.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = tokio::sync::mpsc::channel(32);
        let (tx_b, rx_a) = tokio::sync::mpsc::channel(32);
        (
            Self { rx: rx_a, tx: tx_a },
            Self { rx: rx_b, tx: tx_b },
        )
    }
}

#[async_trait]
impl McpTransport for ChannelTransport {
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        Ok(self.rx.recv().await.map(|msg| msg.trim_end().to_string()))
    }

    async fn send(&mut self, frame: &str) -> Result<(), McpError> {
        self.tx
            .send(frame.to_string())
            .await
            .map_err(|e| McpError::Transport(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JsonRpcRequest, RpcId};
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_channel_transport_pair() {
        let (mut a, mut b) = ChannelTransport::pair();

        a.send("hello from a\n").await.unwrap();
        let msg = b.receive().await.unwrap();
        assert_eq!(msg, Some("hello from a".to_string()));

        b.send("hello from b").await.unwrap();
        let msg = a.receive().await.unwrap();
        assert_eq!(msg, Some("hello from b".to_string()));
    }

    #[tokio::test]
    async fn test_channel_transport_closed() {
        let (mut a, b) = ChannelTransport::pair();
        drop(b);
        let result = a.receive().await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_line_transport_skips_blank_lines() {
        let input: &[u8] = b"\n   \n{\"a\":1}\r\n\n{\"b\":2}";
        let mut transport = LineTransport::new(input, tokio::io::sink());
        assert_eq!(transport.receive().await.unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(transport.receive().await.unwrap().as_deref(), Some("{\"b\":2}"));
        assert_eq!(transport.receive().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_transport_tolerates_invalid_utf8() {
        let input: &[u8] = b"\xff\xfe garbage\n{\"ok\":true}\n";
        let mut transport = LineTransport::new(input, tokio::io::sink());
        let first = transport.receive().await.unwrap().unwrap();
        assert!(first.contains("garbage"));
        assert_eq!(transport.receive().await.unwrap().as_deref(), Some("{\"ok\":true}"));
    }

    #[tokio::test]
    async fn test_send_message_writes_one_frame() {
        let (writer, mut reader) = tokio::io::duplex(1024);
        let mut transport = LineTransport::new(tokio::io::empty(), writer);
        let request = JsonRpcRequest::new(RpcId::Number(1), "ping", None);
        transport.send_message(&request.into()).await.unwrap();
        drop(transport);

        let mut written = String::new();
        reader.read_to_string(&mut written).await.unwrap();
        assert_eq!(written, "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");
    }
}
