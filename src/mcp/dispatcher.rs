//! Request dispatch
//!
//! Routes a parsed inbound request to its handler and produces at most one
//! serialized response frame. The contract is zero-or-one: notifications
//! (no `id`) and every malformed-request path yield no frame at all, only
//! a log line, and the connection stays alive.
//!
//! `initialize` is not handled here; the session routes it to the
//! handshake before consulting the dispatcher.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::mcp::types::{
    CallToolParams, CallToolResult, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ToolContent,
    ToolInfo, METHOD_INITIALIZE, METHOD_INITIALIZED, METHOD_PING, METHOD_TOOLS_CALL,
    METHOD_TOOLS_LIST, TOOL_EXECUTION_FAILED,
};
use crate::tools::ToolRegistry;

/// The methods this endpoint understands.
///
/// Everything else lands in `Other` and is logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// Session handshake request
    Initialize,
    /// Handshake-complete notification (inbound copies are ignored)
    Initialized,
    /// Keepalive
    Ping,
    /// Tool table listing
    ToolsList,
    /// Tool invocation
    ToolsCall,
    /// Any unrecognized method
    Other(String),
}

impl Method {
    /// Classify a method string.
    pub fn parse(method: &str) -> Self {
        match method {
            METHOD_INITIALIZE => Self::Initialize,
            METHOD_INITIALIZED => Self::Initialized,
            METHOD_PING => Self::Ping,
            METHOD_TOOLS_LIST => Self::ToolsList,
            METHOD_TOOLS_CALL => Self::ToolsCall,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Routes requests against an immutable tool registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over the given registry
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatch one request, returning the serialized response frame if
    /// the request warrants one.
    ///
    /// # Errors
    ///
    /// Returns an error only when a response fails to serialize; handler
    /// failures are converted into the fixed failure result instead.
    pub async fn dispatch(&self, request: &JsonRpcRequest) -> Result<Option<String>> {
        match Method::parse(&request.method) {
            Method::Initialize => {
                // Handled by the session before dispatch; reaching here
                // means a logic error upstream, not a protocol fault.
                debug!("initialize reached the dispatcher; ignoring");
                Ok(None)
            }
            Method::Initialized => {
                debug!("ignoring inbound notifications/initialized");
                Ok(None)
            }
            Method::Ping => self.handle_ping(request),
            Method::ToolsList => self.handle_tools_list(request),
            Method::ToolsCall => self.handle_tools_call(request).await,
            Method::Other(name) => {
                warn!(method = %name, "dropping request with unknown method");
                Ok(None)
            }
        }
    }

    fn handle_ping(&self, request: &JsonRpcRequest) -> Result<Option<String>> {
        let Some(id) = &request.id else {
            debug!("ping without id; nothing to answer");
            return Ok(None);
        };
        let response = JsonRpcResponse::result(Some(id.clone()), serde_json::json!({}));
        Ok(Some(serde_json::to_string(&response)?))
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> Result<Option<String>> {
        let Some(id) = &request.id else {
            debug!("tools/list without id; nothing to answer");
            return Ok(None);
        };
        let tools = self
            .registry
            .descriptors()
            .into_iter()
            .map(|d| ToolInfo {
                name: d.name,
                description: d.description,
                input_schema: d.input_schema,
            })
            .collect();
        let response = JsonRpcResponse::result(
            Some(id.clone()),
            serde_json::to_value(&ListToolsResult { tools })?,
        );
        Ok(Some(serde_json::to_string(&response)?))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> Result<Option<String>> {
        let Some(params) = &request.params else {
            warn!("dropping tools/call without params");
            return Ok(None);
        };
        let params: CallToolParams = match serde_json::from_value(params.clone()) {
            Ok(p) => p,
            Err(e) => {
                warn!("dropping tools/call with unusable params: {}", e);
                return Ok(None);
            }
        };
        let Some(handler) = self.registry.get(&params.name) else {
            warn!(tool = %params.name, "dropping tools/call for unregistered tool");
            return Ok(None);
        };

        let arguments = params
            .arguments
            .unwrap_or_else(|| serde_json::json!({}))
            .to_string();

        debug!(tool = %params.name, "invoking tool");
        let (text, is_error) = match handler.invoke(&arguments).await {
            Ok(output) if !output.is_empty() => (output, false),
            Ok(_) => {
                warn!(tool = %params.name, "tool produced no output");
                (TOOL_EXECUTION_FAILED.to_string(), true)
            }
            Err(e) => {
                warn!(tool = %params.name, "tool failed: {}", e);
                (TOOL_EXECUTION_FAILED.to_string(), true)
            }
        };

        // Invoked for its side effects even without an id, but a
        // notification never gets a response frame.
        let Some(id) = &request.id else {
            return Ok(None);
        };
        let result = CallToolResult {
            content: vec![ToolContent::Text { text }],
            is_error,
        };
        let response =
            JsonRpcResponse::result(Some(id.clone()), serde_json::to_value(&result)?);
        Ok(Some(serde_json::to_string(&response)?))
    }
}
