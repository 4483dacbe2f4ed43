//! MCP protocol types and JSON-RPC 2.0 primitives
//!
//! This module defines every wire type this endpoint reads or writes.
//! Struct fields are `camelCase` on the wire via
//! `#[serde(rename_all = "camelCase")]` unless the field is already
//! camelCase, and all `Option<>` fields omit their key from JSON when
//! `None` via `#[serde(skip_serializing_if = "Option::is_none")]`.
//!
//! The endpoint is a protocol responder only: it parses inbound frames as
//! [`JsonRpcRequest`] and emits [`JsonRpcResponse`] /
//! [`JsonRpcNotification`]. Request `id` values are opaque
//! [`serde_json::Value`]s echoed back by structural copy so numeric and
//! string ids survive unchanged.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// The MCP protocol revision this endpoint reports during the handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Handshake: remote sends `initialize` to open a session.
pub const METHOD_INITIALIZE: &str = "initialize";
/// Handshake: sent by this endpoint immediately after the initialize response.
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
/// Keepalive ping.
pub const METHOD_PING: &str = "ping";
/// Request the registered tool table.
pub const METHOD_TOOLS_LIST: &str = "tools/list";
/// Invoke a registered tool by name.
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// Fixed diagnostic string returned when a tool handler fails or produces
/// no output.
pub const TOOL_EXECUTION_FAILED: &str = "Tool execution failed";

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 wire types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request object, also used as the inbound envelope.
///
/// `id` is `None` for notifications. `params` is kept as a raw
/// [`serde_json::Value`] and interpreted per method by the dispatcher.
///
/// # Examples
///
/// ```
/// use outpost::mcp::types::JsonRpcRequest;
///
/// let req: JsonRpcRequest =
///     serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
/// assert_eq!(req.method, "ping");
/// assert_eq!(req.id, Some(serde_json::json!(1)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version identifier; always `"2.0"`.
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    /// Request correlation identifier. Present for requests, absent for
    /// notifications. Never interpreted, only echoed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    /// The method name to invoke.
    pub method: String,
    /// Optional method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

/// A JSON-RPC 2.0 response object.
///
/// Exactly one of `result` or `error` is present in a valid response; this
/// endpoint only ever emits `result`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version identifier; always `"2.0"`.
    pub jsonrpc: String,
    /// Mirrors the `id` from the corresponding request, copied structurally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    /// Successful result value; mutually exclusive with `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error object; mutually exclusive with `result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Build a success response echoing `id` verbatim.
    pub fn result(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }
}

/// A JSON-RPC 2.0 notification (a request with no `id`).
///
/// # Examples
///
/// ```
/// use outpost::mcp::types::{JsonRpcNotification, METHOD_INITIALIZED};
///
/// let n = JsonRpcNotification::new(METHOD_INITIALIZED);
/// let json = serde_json::to_string(&n).unwrap();
/// assert_eq!(json, r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Protocol version identifier; always `"2.0"`.
    pub jsonrpc: String,
    /// The notification method name.
    pub method: String,
    /// Optional notification parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcNotification {
    /// Build a parameterless notification.
    pub fn new(method: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Handshake types
// ---------------------------------------------------------------------------

/// Identifies this endpoint in the handshake `serverInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Implementation name from the configuration.
    pub name: String,
    /// Implementation version from the configuration.
    pub version: String,
}

/// Tool-capability descriptor; this endpoint never emits list-change
/// notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// Always `false`: the tool table is immutable after startup.
    pub list_changed: bool,
}

/// Prompt-capability descriptor; prompts are not supported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsCapability {
    /// Always `false`.
    pub list_changed: bool,
}

/// Resource-capability descriptor; resources are not supported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    /// Always `false`.
    pub subscribe: bool,
    /// Always `false`.
    pub list_changed: bool,
}

/// The full capability object advertised in the initialize response.
///
/// The endpoint declares no optional features; `Default` therefore produces
/// the exact wire shape every session advertises.
///
/// # Examples
///
/// ```
/// use outpost::mcp::types::ServerCapabilities;
///
/// let caps = serde_json::to_value(ServerCapabilities::default()).unwrap();
/// assert_eq!(caps["experimental"], serde_json::json!({}));
/// assert_eq!(caps["tools"]["listChanged"], false);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Experimental capability extensions; always empty.
    pub experimental: serde_json::Map<String, serde_json::Value>,
    /// Prompt support descriptor.
    pub prompts: PromptsCapability,
    /// Resource support descriptor.
    pub resources: ResourcesCapability,
    /// Tool support descriptor.
    pub tools: ToolsCapability,
}

/// The `result` payload of the initialize response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Fixed protocol revision string.
    pub protocol_version: String,
    /// The no-optional-features capability object.
    pub capabilities: ServerCapabilities,
    /// Configured endpoint identity.
    pub server_info: ServerInfo,
}

// ---------------------------------------------------------------------------
// Tool wire types
// ---------------------------------------------------------------------------

/// One entry in the `tools/list` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's arguments, serialized as the registered
    /// document.
    pub input_schema: serde_json::Value,
}

/// The `result` payload of a `tools/list` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// All registered tools, in registration order.
    pub tools: Vec<ToolInfo>,
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments forwarded to the tool handler; `{}` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

/// A single content item in a `tools/call` result, discriminated by the
/// `"type"` field on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text output; tool output is embedded verbatim.
    Text {
        /// The text content.
        text: String,
    },
}

/// The `result` payload of a `tools/call` response.
///
/// `isError` is always present on the wire, `false` on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// The content items produced by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool signalled an error condition.
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses_with_numeric_id() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":42,"method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(serde_json::json!(42)));
        assert_eq!(req.method, "ping");
        assert!(req.params.is_none());
    }

    #[test]
    fn test_request_parses_with_string_id() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"abc","method":"ping"}"#).unwrap();
        assert_eq!(req.id, Some(serde_json::json!("abc")));
    }

    #[test]
    fn test_request_parses_without_jsonrpc_field() {
        // The reference implementation never checks the jsonrpc marker.
        let req: JsonRpcRequest = serde_json::from_str(r#"{"method":"ping"}"#).unwrap();
        assert_eq!(req.jsonrpc, "2.0");
        assert!(req.id.is_none());
    }

    #[test]
    fn test_request_without_method_fails_to_parse() {
        let result = serde_json::from_str::<JsonRpcRequest>(r#"{"jsonrpc":"2.0","id":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_omits_id_when_none() {
        let resp = JsonRpcResponse::result(None, serde_json::json!({}));
        let val = serde_json::to_value(&resp).unwrap();
        assert!(val.get("id").is_none());
        assert!(val.get("error").is_none());
    }

    #[test]
    fn test_response_echoes_numeric_id_as_number() {
        let resp = JsonRpcResponse::result(Some(serde_json::json!(42)), serde_json::json!({}));
        let raw = serde_json::to_string(&resp).unwrap();
        assert!(raw.contains(r#""id":42"#), "id was re-encoded: {raw}");
    }

    #[test]
    fn test_response_echoes_string_id_as_string() {
        let resp = JsonRpcResponse::result(Some(serde_json::json!("abc")), serde_json::json!({}));
        let raw = serde_json::to_string(&resp).unwrap();
        assert!(raw.contains(r#""id":"abc""#), "id was re-encoded: {raw}");
    }

    #[test]
    fn test_notification_wire_shape() {
        let n = JsonRpcNotification::new(METHOD_INITIALIZED);
        let raw = serde_json::to_string(&n).unwrap();
        assert_eq!(
            raw,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#
        );
    }

    #[test]
    fn test_capabilities_default_is_fixed_shape() {
        let caps = serde_json::to_value(ServerCapabilities::default()).unwrap();
        assert_eq!(
            caps,
            serde_json::json!({
                "experimental": {},
                "prompts": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false },
                "tools": { "listChanged": false }
            })
        );
    }

    #[test]
    fn test_initialize_result_uses_camel_case_keys() {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: "outpost".to_string(),
                version: "0.1.0".to_string(),
            },
        };
        let val = serde_json::to_value(&result).unwrap();
        assert_eq!(val["protocolVersion"], "2024-11-05");
        assert_eq!(val["serverInfo"]["name"], "outpost");
        assert!(val.get("protocol_version").is_none());
    }

    #[test]
    fn test_tool_info_renames_input_schema() {
        let info = ToolInfo {
            name: "windmill".to_string(),
            description: "Toggle the windmill".to_string(),
            input_schema: serde_json::json!({ "type": "object" }),
        };
        let val = serde_json::to_value(&info).unwrap();
        assert_eq!(val["inputSchema"]["type"], "object");
        assert!(val.get("input_schema").is_none());
    }

    #[test]
    fn test_call_tool_result_is_error_always_present() {
        let result = CallToolResult {
            content: vec![ToolContent::Text {
                text: "ok".to_string(),
            }],
            is_error: false,
        };
        let val = serde_json::to_value(&result).unwrap();
        assert_eq!(val["isError"], false);
        assert_eq!(val["content"][0]["type"], "text");
        assert_eq!(val["content"][0]["text"], "ok");
    }

    #[test]
    fn test_call_tool_params_arguments_optional() {
        let params: CallToolParams = serde_json::from_str(r#"{"name":"windmill"}"#).unwrap();
        assert_eq!(params.name, "windmill");
        assert!(params.arguments.is_none());
    }
}
