//! MCP wire types: JSON-RPC 2.0 envelopes and the tool payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{ToolCallError, ToolError};

/// MCP revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// An incoming request or notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version
    #[serde(default)]
    pub jsonrpc: String,
    /// Request id; absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Method name
    pub method: String,
    /// Parameters
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Whether the sender expects no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
            || self.method == "initialized"
            || self.method.starts_with("notifications/")
    }
}

/// An outgoing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Id of the request being answered
    pub id: Value,
    /// Result (if success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (if failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Value, err: &McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: err.code(),
                message: err.to_string(),
                data: None,
            }),
        }
    }
}

/// Protocol-level failures, each with its JSON-RPC code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn code(&self) -> i32 {
        match self {
            McpError::Parse(_) => -32700,
            McpError::InvalidRequest(_) => -32600,
            McpError::MethodNotFound(_) => -32601,
            McpError::InvalidParams(_) => -32602,
            McpError::Internal(_) => -32603,
        }
    }
}

impl From<ToolCallError> for McpError {
    fn from(err: ToolCallError) -> Self {
        McpError::InvalidParams(err.to_string())
    }
}

/// `initialize` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Server capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Tool capabilities
    pub tools: ToolCapabilities,
}

/// Tool capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCapabilities {
    /// Whether tool listing changes are announced
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server name and version reported on `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// One entry of `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema of the arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// `tools/call` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// A content block of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// `tools/call` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    fn with_text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text,
            }],
            is_error,
        }
    }

    /// Successful output.
    pub fn text(text: String) -> Self {
        Self::with_text(text, false)
    }

    /// A failed tool call, reported in-band.
    pub fn error(text: String) -> Self {
        Self::with_text(text, true)
    }
}

impl From<Result<String, ToolError>> for CallToolResult {
    fn from(outcome: Result<String, ToolError>) -> Self {
        match outcome {
            Ok(text) => Self::text(text),
            Err(err) => Self::error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jsonrpc_response() {
        let resp = JsonRpcResponse::success(json!(1), json!({"status": "ok"}));
        assert_eq!(resp.jsonrpc, "2.0");
        assert!(resp.result.is_some());
        assert!(resp.error.is_none());

        let text = serde_json::to_string(&resp).unwrap();
        assert!(!text.contains("error"));
    }

    #[test]
    fn test_error_codes() {
        let err = McpError::from(ToolCallError::UnknownTool("nope".into()));
        assert_eq!(err.code(), -32602);
        let resp = JsonRpcResponse::error(json!(7), &err);
        let e = resp.error.unwrap();
        assert_eq!(e.code, -32602);
        assert_eq!(e.message, "Invalid params: Unknown tool: nope");
    }

    #[test]
    fn test_notification_detection() {
        let req: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "method": "initialized"})).unwrap();
        assert!(req.is_notification());
        let req: JsonRpcRequest = serde_json::from_value(
            json!({"jsonrpc": "2.0", "id": 3, "method": "notifications/cancelled"}),
        )
        .unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn test_call_tool_result_shape() {
        let ok = serde_json::to_value(CallToolResult::from(Ok("done".to_string()))).unwrap();
        assert_eq!(ok, json!({"content": [{"type": "text", "text": "done"}], "isError": false}));

        let err: CallToolResult = Err(ToolError::NotFound("x".into())).into();
        assert!(err.is_error);
        assert_eq!(err.content[0].text, "Circuit 'x' not found");
    }

    #[test]
    fn test_initialize_result_is_camel_case() {
        let init = InitializeResult {
            protocol_version: PROTOCOL_VERSION.into(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: "qmcp".into(),
                version: "0.0.0".into(),
            },
        };
        let v = serde_json::to_value(init).unwrap();
        assert_eq!(v["protocolVersion"], "2024-11-05");
        assert_eq!(v["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(v["serverInfo"]["name"], "qmcp");
    }
}
