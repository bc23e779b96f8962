//! MCP (Model Context Protocol) support for pawa-mcp
//!
//! Protocol types, the transport-agnostic request handler, and the STDIO
//! server. The SSE transport lives in `pawa-gateway` and reuses the handler.

pub mod handler;
pub mod protocol;
pub mod server;

pub use handler::McpHandler;
pub use server::McpServer;
