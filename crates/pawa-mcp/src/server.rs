//! MCP server implementation over STDIO
//!
//! Reads JSON-RPC requests from stdin, dispatches to the handler, writes
//! responses to stdout. There is exactly one client, so the configured
//! credential applies to every request.

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use pawa_core::Credential;

use crate::handler::McpHandler;
use crate::protocol::*;

/// MCP server that communicates over STDIO
pub struct McpServer {
    handler: McpHandler,
    credential: Option<Credential>,
}

impl McpServer {
    pub fn new(handler: McpHandler, credential: Option<Credential>) -> Self {
        Self {
            handler,
            credential,
        }
    }

    /// Run the MCP server over STDIO (stdin/stdout)
    pub async fn serve_stdio(&self) -> Result<()> {
        info!(
            "MCP server '{}' starting on STDIO",
            self.handler.server_info().name
        );
        let reader = BufReader::new(io::stdin());
        let mut stdout = io::stdout();
        self.serve(reader, &mut stdout).await?;
        info!("MCP server STDIO closed");
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC until the reader hits EOF
    pub async fn serve<R, W>(&self, reader: R, writer: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWriteExt + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!("MCP received: {}", truncate(line, 200));

            let request: JsonRpcRequest = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(e) => {
                    warn!("Invalid JSON-RPC request: {}", e);
                    let err_response =
                        JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e));
                    write_response(writer, &err_response).await?;
                    continue;
                }
            };

            if let Some(resp) = self
                .handler
                .handle_request(request, self.credential.as_ref())
                .await
            {
                write_response(writer, &resp).await?;
            }
        }

        Ok(())
    }
}

/// Cut a log line at a char boundary
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Write a JSON-RPC response (newline-delimited)
async fn write_response<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let json = serde_json::to_string(response).context("Failed to serialize response")?;
    debug!("MCP sending: {}", truncate(&json, 200));
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
