//! Built-in echo tool
//!
//! A minimal connectivity-check tool: it returns the `message` argument it
//! was called with. The binary registers it so a freshly deployed endpoint
//! has something callable end to end.

use async_trait::async_trait;

use crate::error::Result;
use crate::tools::{ToolDescriptor, ToolHandler};

/// Echoes its `message` argument back to the caller.
#[derive(Debug, Default)]
pub struct EchoTool;

impl EchoTool {
    /// Create a new echo tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolHandler for EchoTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "echo",
            "Echo the provided message back to the caller",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "Text to echo back"
                    }
                },
                "required": ["message"]
            }),
        )
    }

    async fn invoke(&self, arguments: &str) -> Result<String> {
        let args: serde_json::Value = serde_json::from_str(arguments)?;
        let message = args
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default();
        Ok(serde_json::json!({ "echo": message }).to_string())
    }
}
