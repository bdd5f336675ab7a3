//! Stdio transport — reads JSON-RPC from stdin, writes to stdout.
//!
//! Every message is handled on its own task so a slow `run_sketch` does
//! not hold up other requests. Replies go through one writer task, which
//! keeps frames whole on stdout.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult};

use super::framing;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: Arc<ProtocolHandler>,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Run until stdin closes.
    pub async fn run(&self) -> McpResult<()> {
        self.run_with(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Run the read/dispatch/write loop over arbitrary streams.
    pub async fn run_with<R, W>(&self, input: R, output: W) -> McpResult<()>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<Value>();
        let writer = tokio::spawn(write_loop(output, rx));

        let mut reader = BufReader::new(input);
        let mut line = String::new();
        let mut tasks = tokio::task::JoinSet::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = tokio::select! {
                read = reader.read_line(&mut line) => read.map_err(McpError::Io)?,
                () = tx.closed() => {
                    tracing::error!("Output closed, no longer reading requests");
                    break;
                }
            };

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match framing::parse_message(trimmed) {
                Ok(msg) => {
                    let handler = Arc::clone(&self.handler);
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        if let Some(response) = handler.handle_message(msg).await {
                            if tx.send(response).is_err() {
                                tracing::warn!("Dropping reply: output is closed");
                            }
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    if tx.send(framing::parse_error_response(&e)).is_err() {
                        tracing::error!("Output closed, no longer reading requests");
                        break;
                    }
                }
            }

            // Reap finished handlers so the set does not grow unbounded.
            while let Some(done) = tasks.try_join_next() {
                if let Err(e) = done {
                    tracing::error!("Request task failed: {e}");
                }
            }
        }

        // Let in-flight requests answer before closing the writer.
        while let Some(done) = tasks.join_next().await {
            if let Err(e) = done {
                tracing::error!("Request task failed: {e}");
            }
        }
        drop(tx);

        writer
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?
    }
}

async fn write_loop<W>(mut output: W, mut rx: mpsc::UnboundedReceiver<Value>) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let framed = framing::frame_message(&response)?;
        output
            .write_all(framed.as_bytes())
            .await
            .map_err(McpError::Io)?;
        output.flush().await.map_err(McpError::Io)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;

    use sketch_bridge::{BridgeConfig, SketchBridge};

    /// Output whose reader has gone away.
    struct ClosedOutput;

    impl AsyncWrite for ClosedOutput {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_stops_reading_when_output_closes() {
        let bridge = SketchBridge::new(BridgeConfig::new("/nonexistent", "/nonexistent"));
        let transport = StdioTransport::new(ProtocolHandler::new(Arc::new(bridge)));

        // The client keeps its end open, so only the dead output can end the loop.
        let (mut client, server_in) = tokio::io::duplex(4096);
        client
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
            .await
            .unwrap();

        let outcome =
            tokio::time::timeout(Duration::from_secs(5), transport.run_with(server_in, ClosedOutput))
                .await
                .expect("transport kept reading after its output closed");
        assert!(outcome.is_err());
        drop(client);
    }
}
