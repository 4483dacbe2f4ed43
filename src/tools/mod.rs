//! Tools module for Outpost
//!
//! This module contains the tool capability trait, the immutable tool
//! registry exposed over `tools/list` and `tools/call`, and the built-in
//! tool implementations.
//!
//! A tool is registered once at startup through [`ToolRegistryBuilder`];
//! after [`ToolRegistryBuilder::build`] the table never changes, which is
//! why the endpoint advertises `listChanged: false`.

pub mod echo;

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{OutpostError, Result};

/// Static description of a tool, as reported by `tools/list`
///
/// `input_schema` is the parsed JSON Schema document for the tool's
/// arguments; it is serialized verbatim into the `inputSchema` wire field.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON schema for the tool's arguments
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    /// Create a new tool descriptor
    ///
    /// # Arguments
    ///
    /// * `name` - Tool name
    /// * `description` - Tool description
    /// * `input_schema` - JSON schema for the arguments
    pub fn new(name: &str, description: &str, input_schema: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Trait for executable tools
///
/// Implementors receive the `tools/call` arguments as a JSON document
/// string and return their output as a string. A returned `Err` or an
/// empty output both surface to the remote caller as an `isError: true`
/// result; neither affects the connection.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The static descriptor advertised over `tools/list`
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool
    ///
    /// # Arguments
    ///
    /// * `arguments` - The call arguments serialized as a JSON document,
    ///   `"{}"` when the caller supplied none
    ///
    /// # Errors
    ///
    /// Returns an error when execution fails; the dispatcher converts it
    /// into the fixed failure result.
    async fn invoke(&self, arguments: &str) -> Result<String>;
}

/// Immutable, ordered table of registered tools
///
/// Iteration order is registration order, which fixes the order of
/// entries in the `tools/list` response. Lookup by name is O(1).
///
/// # Examples
///
/// ```
/// use outpost::tools::{ToolRegistry, echo::EchoTool};
/// use std::sync::Arc;
///
/// let registry = ToolRegistry::builder()
///     .with_tool(Arc::new(EchoTool::new()))
///     .build()
///     .unwrap();
/// assert_eq!(registry.len(), 1);
/// assert!(registry.contains("echo"));
/// ```
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn ToolHandler>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Start building a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Descriptors of all registered tools, in registration order
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.handlers.iter().map(|h| h.descriptor()).collect()
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.index.get(name).map(|&i| &self.handlers[i])
    }

    /// Whether a tool with the given name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.handlers.iter().map(|h| h.descriptor().name).collect();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

/// Builder for [`ToolRegistry`]
///
/// Collects handlers in registration order and validates the table once
/// at build time.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistryBuilder {
    /// Register a tool handler
    ///
    /// # Arguments
    ///
    /// * `handler` - The tool implementation to register
    ///
    /// # Returns
    ///
    /// Returns self for method chaining
    pub fn with_tool(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Finalize the registry
    ///
    /// # Errors
    ///
    /// Returns [`OutpostError::Config`] if two handlers share a name.
    pub fn build(self) -> Result<ToolRegistry> {
        let mut index = HashMap::with_capacity(self.handlers.len());
        for (i, handler) in self.handlers.iter().enumerate() {
            let name = handler.descriptor().name;
            if index.insert(name.clone(), i).is_some() {
                return Err(
                    OutpostError::Config(format!("duplicate tool name '{name}'")).into(),
                );
            }
        }
        Ok(ToolRegistry {
            handlers: self.handlers,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedTool(&'static str);

    #[async_trait]
    impl ToolHandler for NamedTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new(self.0, "a test tool", serde_json::json!({ "type": "object" }))
        }

        async fn invoke(&self, _arguments: &str) -> Result<String> {
            Ok(format!("ran {}", self.0))
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::builder().build().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.descriptors().is_empty());
    }

    #[test]
    fn test_descriptors_preserve_registration_order() {
        let registry = ToolRegistry::builder()
            .with_tool(Arc::new(NamedTool("beta")))
            .with_tool(Arc::new(NamedTool("alpha")))
            .with_tool(Arc::new(NamedTool("gamma")))
            .build()
            .unwrap();

        let names: Vec<String> = registry.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = ToolRegistry::builder()
            .with_tool(Arc::new(NamedTool("alpha")))
            .build()
            .unwrap();

        assert!(registry.contains("alpha"));
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = ToolRegistry::builder()
            .with_tool(Arc::new(NamedTool("alpha")))
            .with_tool(Arc::new(NamedTool("alpha")))
            .build();

        let err = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("duplicate tool name"), "unexpected: {err}");
    }

    #[tokio::test]
    async fn test_registered_handler_is_invocable() {
        let registry = ToolRegistry::builder()
            .with_tool(Arc::new(NamedTool("alpha")))
            .build()
            .unwrap();

        let handler = registry.get("alpha").unwrap();
        let output = handler.invoke("{}").await.unwrap();
        assert_eq!(output, "ran alpha");
    }

    #[test]
    fn test_debug_lists_tool_names() {
        let registry = ToolRegistry::builder()
            .with_tool(Arc::new(NamedTool("alpha")))
            .build()
            .unwrap();
        let rendered = format!("{registry:?}");
        assert!(rendered.contains("alpha"), "unexpected: {rendered}");
    }
}
