//! Tool invoker: lazy session establishment plus the MCP methods the relay
//! forwards (`tools/call`, `tools/list`, `resources/list`, `resources/read`).

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{McpError, McpSession, McpTransport, PROTOCOL_VERSION};

/// Identity announced in `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Anything that can run a named tool and hand back its domain result.
///
/// `ToolInvoker` is the production implementation; tests script their own.
pub trait ToolCaller: Send + Sync {
    fn invoke(
        &self,
        name: &str,
        arguments: Value,
    ) -> impl Future<Output = Result<Value, McpError>> + Send;
}

/// One logical client's view of the remote MCP server.
///
/// Cheap to clone: the transport and the session handle are shared.
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    transport: Arc<McpTransport>,
    session: Arc<McpSession>,
    client_info: ClientInfo,
}

impl ToolInvoker {
    pub fn new(transport: Arc<McpTransport>, session: Arc<McpSession>, client_info: ClientInfo) -> Self {
        Self {
            transport,
            session,
            client_info,
        }
    }

    pub fn session(&self) -> &Arc<McpSession> {
        &self.session
    }

    // ── Session establishment ───────────────────────────────────────────

    /// Explicit handshake. Always starts a fresh session and returns the
    /// server's `initialize` response.
    pub async fn initialize(&self) -> Result<Value, McpError> {
        let _guard = self.session.lock_establish().await;
        self.session.clear();
        self.handshake().await
    }

    /// Initialize once; concurrent callers wait on the same attempt.
    async fn ensure_session(&self) -> Result<(), McpError> {
        if self.session.is_established() {
            return Ok(());
        }
        let _guard = self.session.lock_establish().await;
        if self.session.is_established() {
            return Ok(());
        }
        self.handshake().await.map(|_| ())
    }

    async fn handshake(&self) -> Result<Value, McpError> {
        let response = self
            .transport
            .send(
                &self.session,
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": self.client_info,
                }),
            )
            .await?;

        if let Some(err) = rpc_error(&response) {
            return Err(err);
        }

        tracing::info!(
            "MCP: initialized '{}' (protocol version: {}, session: {})",
            response
                .pointer("/result/serverInfo/name")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown"),
            response
                .pointer("/result/protocolVersion")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown"),
            self.session.id().as_deref().unwrap_or("none"),
        );
        self.session.mark_established();

        if let Err(e) = self
            .transport
            .notify(&self.session, "notifications/initialized", json!({}))
            .await
        {
            tracing::warn!("MCP: initialized notification failed: {}", e);
        }

        Ok(response)
    }

    // ── Forwarded methods ───────────────────────────────────────────────

    /// Any method, after making sure the session exists. Returns the raw envelope.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, McpError> {
        self.ensure_session().await?;
        self.transport.send(&self.session, method, params).await
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        tracing::debug!(tool = %name, "MCP: tools/call");
        self.request(
            "tools/call",
            json!({
                "name": name,
                "arguments": arguments,
            }),
        )
        .await
    }

    pub async fn list_tools(&self) -> Result<Value, McpError> {
        self.request("tools/list", json!({})).await
    }

    pub async fn list_resources(&self) -> Result<Value, McpError> {
        self.request("resources/list", json!({})).await
    }

    pub async fn read_resource(&self, uri: &str) -> Result<Value, McpError> {
        self.request("resources/read", json!({ "uri": uri })).await
    }
}

impl ToolCaller for ToolInvoker {
    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        let envelope = self.call_tool(name, arguments).await?;
        tool_result(&envelope)
    }
}

// ── Envelope helpers ────────────────────────────────────────────────────────

fn rpc_error(envelope: &Value) -> Option<McpError> {
    let error = envelope.get("error").filter(|e| !e.is_null())?;
    Some(McpError::Rpc {
        code: error.get("code").and_then(|c| c.as_i64()).unwrap_or(-1),
        message: error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown MCP error")
            .to_string(),
    })
}

/// Text items of an MCP `content` array, joined by newlines.
fn content_text(result: &Value) -> Option<String> {
    let texts: Vec<&str> = result
        .get("content")?
        .as_array()?
        .iter()
        .filter(|c| c.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|c| c.get("text").and_then(|t| t.as_str()))
        .collect();
    (!texts.is_empty()).then(|| texts.join("\n"))
}

fn embedded_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => Some(
            obj.get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("tool call failed")
                .to_string(),
        ),
        _ => None,
    }
}

/// Pull the domain value out of a `tools/call` envelope.
///
/// Prefers `structuredContent`, then the first text item if it holds a JSON
/// object, then the bare `result`.
pub fn tool_result(envelope: &Value) -> Result<Value, McpError> {
    if let Some(err) = rpc_error(envelope) {
        return Err(err);
    }

    let result = envelope
        .get("result")
        .ok_or_else(|| McpError::ProtocolParse("response has neither result nor error".into()))?;

    if result.get("isError").and_then(|v| v.as_bool()) == Some(true) {
        let message = content_text(result).unwrap_or_else(|| "tool call failed".to_string());
        return Err(McpError::Tool(message));
    }

    let value = match result.get("structuredContent").filter(|v| !v.is_null()) {
        Some(structured) => structured.clone(),
        None => content_text(result)
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .filter(|v| v.is_object())
            .unwrap_or_else(|| result.clone()),
    };

    match embedded_error(&value) {
        Some(message) => Err(McpError::Tool(message)),
        None => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_content_preferred() {
        let env = json!({
            "jsonrpc": "2.0", "id": 4,
            "result": {
                "content": [{ "type": "text", "text": "{\"table_id\":\"ignored\"}" }],
                "structuredContent": { "table_id": "t-9" }
            }
        });
        assert_eq!(tool_result(&env).unwrap(), json!({ "table_id": "t-9" }));
    }

    #[test]
    fn text_content_parsed_as_json() {
        let env = json!({
            "result": { "content": [{ "type": "text", "text": "{\"pot\":15}" }] }
        });
        assert_eq!(tool_result(&env).unwrap()["pot"], 15);
    }

    #[test]
    fn falls_back_to_bare_result() {
        let env = json!({ "result": { "table_id": "t-1", "pot": 0 } });
        assert_eq!(tool_result(&env).unwrap()["table_id"], "t-1");
    }

    #[test]
    fn is_error_becomes_tool_error() {
        let env = json!({
            "result": {
                "isError": true,
                "content": [{ "type": "text", "text": "Not your turn" }]
            }
        });
        match tool_result(&env) {
            Err(McpError::Tool(msg)) => assert_eq!(msg, "Not your turn"),
            other => panic!("expected tool error, got {other:?}"),
        }
    }

    #[test]
    fn rpc_error_object_surfaces() {
        let env = json!({ "error": { "code": -32602, "message": "Unknown tool" } });
        match tool_result(&env) {
            Err(McpError::Rpc { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Unknown tool");
            }
            other => panic!("expected rpc error, got {other:?}"),
        }
    }

    #[test]
    fn embedded_error_in_domain_value() {
        let env = json!({ "result": { "structuredContent": { "error": "Insufficient chips" } } });
        assert!(matches!(tool_result(&env), Err(McpError::Tool(m)) if m == "Insufficient chips"));
    }

    #[test]
    fn missing_result_is_protocol_error() {
        assert!(matches!(
            tool_result(&json!({ "jsonrpc": "2.0", "id": 1 })),
            Err(McpError::ProtocolParse(_))
        ));
    }
}
