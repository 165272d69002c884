//! JSON-RPC 2.0 over HTTP POST, as spoken by the remote poker MCP server.

use std::time::Duration;

use http::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use url::Url;

use super::{McpError, McpSession};

pub const SESSION_HEADER: &str = "mcp-session-id";

/// Outbound half of the relay. Stateless apart from the per-call session handle.
#[derive(Debug, Clone)]
pub struct McpTransport {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl McpTransport {
    pub fn new(client: Client, endpoint: Url, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send a request and return the parsed response document (the whole
    /// JSON-RPC envelope, `result` or `error` included).
    pub async fn send(
        &self,
        session: &McpSession,
        method: &str,
        params: Value,
    ) -> Result<Value, McpError> {
        let id = session.next_request_id();
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        tracing::debug!(method = %method, id, "MCP: sending request");
        let text = self.post(session, &body).await?;
        parse_response_body(&text).inspect_err(|e| {
            tracing::warn!(method = %method, id, "MCP: {}", e);
        })
    }

    /// Send a notification (no `id`). The response body is ignored.
    pub async fn notify(
        &self,
        session: &McpSession,
        method: &str,
        params: Value,
    ) -> Result<(), McpError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        self.post(session, &body).await.map(|_| ())
    }

    async fn post(&self, session: &McpSession, body: &Value) -> Result<String, McpError> {
        let sent_session = session.id();

        let mut req = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json, text/event-stream")
            .timeout(self.timeout)
            .json(body);

        if let Some(sid) = &sent_session {
            req = req.header(SESSION_HEADER, sid.as_str());
        }

        let response = req.send().await.map_err(|e| {
            McpError::Transport(format!("POST {} failed: {}", self.endpoint, e))
        })?;

        if let Some(sid) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            session.record_id(sid);
        }

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            // Streamable HTTP servers answer 404 for sessions they no longer know.
            if status == StatusCode::NOT_FOUND && sent_session.is_some() {
                tracing::warn!("MCP: session rejected by server, will re-initialize on next call");
                session.clear();
            }
            return Err(McpError::Status {
                status: status.as_u16(),
                body: truncate_str(&body_text, 500),
            });
        }

        response
            .text()
            .await
            .map_err(|e| McpError::Transport(format!("reading response body failed: {}", e)))
    }
}

/// Parse a response body that is either SSE framed (`data: {...}` lines, the
/// first line holding valid JSON wins) or a single JSON document.
pub fn parse_response_body(text: &str) -> Result<Value, McpError> {
    for line in text.lines() {
        if let Some(data) = line.strip_prefix("data:") {
            if let Ok(value) = serde_json::from_str::<Value>(data.trim()) {
                return Ok(value);
            }
        }
    }

    serde_json::from_str::<Value>(text.trim()).map_err(|e| {
        McpError::ProtocolParse(format!("{} (body: {:?})", e, truncate_str(text, 120)))
    })
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let boundary = s
            .char_indices()
            .take_while(|(i, _)| *i < max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(max_len);
        format!("{}...", &s[..boundary])
    }
}
