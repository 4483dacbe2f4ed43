//! MCP protocol implementation
//!
//! This module contains the endpoint's protocol machinery: wire types, the
//! session handshake, request dispatch, the per-connection session loop,
//! the connection supervisor, and the transport layer underneath it all.
//!
//! The endpoint dials out but acts as the protocol responder; the public
//! surface is [`supervisor::McpEndpoint`].

pub mod dispatcher;
pub mod handshake;
pub mod session;
pub mod supervisor;
pub mod transport;
pub mod types;

pub use supervisor::{ConnectionState, McpEndpoint};
