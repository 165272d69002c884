//! MCP (Model Context Protocol) client side of the relay.
//!
//! **Transport** (`McpTransport`): one HTTP POST per JSON-RPC 2.0 envelope,
//! tolerant of both bare JSON and `text/event-stream` framed replies.
//!
//! **Session** (`McpSession`): per-client handle holding the `Mcp-Session-Id`
//! and the request-id counter.
//!
//! **Client** (`ToolInvoker`): lazy `initialize` + `tools/call` and the other
//! passthrough methods.
//!
//! Spec: <https://spec.modelcontextprotocol.io/2024-11-05/>

pub mod client;
pub mod session;
pub mod transport;

pub use client::{ClientInfo, ToolCaller, ToolInvoker, tool_result};
pub use session::McpSession;
pub use transport::McpTransport;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Failures talking to the remote MCP server.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Network failure or deadline exceeded before a response arrived.
    #[error("MCP request failed: {0}")]
    Transport(String),

    #[error("MCP server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was neither a JSON document nor SSE-framed JSON.
    #[error("MCP response could not be parsed: {0}")]
    ProtocolParse(String),

    #[error("MCP error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The tool ran but reported a domain failure (`isError: true`).
    #[error("{0}")]
    Tool(String),
}
