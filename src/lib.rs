//! Outpost - dial-out MCP endpoint
//!
//! Outpost initiates a WebSocket connection to a remote control plane and
//! then acts as an MCP protocol responder: it answers `initialize`,
//! `ping`, `tools/list`, and `tools/call` requests against a registry of
//! locally registered tools. Connection supervision (reconnect with
//! backoff, liveness probing) runs in the background; the embedding
//! program interacts only with [`McpEndpoint`].
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use outpost::config::EndpointConfig;
//! use outpost::tools::{echo::EchoTool, ToolRegistry};
//! use outpost::McpEndpoint;
//!
//! # #[tokio::main]
//! # async fn main() -> outpost::Result<()> {
//! let config = EndpointConfig::load("config/outpost.yaml")?;
//! let registry = ToolRegistry::builder()
//!     .with_tool(Arc::new(EchoTool::new()))
//!     .build()?;
//!
//! let endpoint = McpEndpoint::start(config, registry)?;
//! tokio::signal::ctrl_c().await?;
//! endpoint.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;

pub use config::EndpointConfig;
pub use error::{OutpostError, Result};
pub use mcp::{ConnectionState, McpEndpoint};
pub use tools::{ToolDescriptor, ToolHandler, ToolRegistry, ToolRegistryBuilder};
