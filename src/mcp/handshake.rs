//! MCP session handshake
//!
//! The endpoint dials out but acts as the protocol responder: the remote
//! peer opens the session by sending `initialize`, and this module builds
//! the two frames the endpoint answers with, in order:
//!
//! 1. the `initialize` response carrying the fixed protocol revision, the
//!    no-optional-features capability object, and the configured identity;
//! 2. the `notifications/initialized` notification, sent unconditionally
//!    right after the response.
//!
//! A repeated `initialize` on the same session is answered identically;
//! the state machine simply stays initialized.

use crate::error::Result;
use crate::mcp::types::{
    InitializeResult, JsonRpcNotification, JsonRpcResponse, ServerCapabilities, ServerInfo,
    METHOD_INITIALIZED, PROTOCOL_VERSION,
};

/// Handshake progress for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Connected, no `initialize` seen yet.
    AwaitingInitialize,
    /// The initialize response and notification have been produced.
    Initialized,
}

/// Per-session handshake state machine.
///
/// # Examples
///
/// ```
/// use outpost::mcp::handshake::Handshake;
///
/// let mut handshake = Handshake::new("outpost", "0.1.0");
/// assert!(!handshake.is_initialized());
///
/// let (response, notification) = handshake
///     .accept_initialize(Some(&serde_json::json!(1)))
///     .unwrap();
/// assert!(response.contains("protocolVersion"));
/// assert!(notification.contains("notifications/initialized"));
/// assert!(handshake.is_initialized());
/// ```
#[derive(Debug)]
pub struct Handshake {
    state: HandshakeState,
    server_info: ServerInfo,
}

impl Handshake {
    /// Create a handshake advertising the given identity
    ///
    /// # Arguments
    ///
    /// * `name` - Implementation name for `serverInfo`
    /// * `version` - Implementation version for `serverInfo`
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            state: HandshakeState::AwaitingInitialize,
            server_info: ServerInfo {
                name: name.to_string(),
                version: version.to_string(),
            },
        }
    }

    /// Whether `initialize` has been answered on this session
    pub fn is_initialized(&self) -> bool {
        self.state == HandshakeState::Initialized
    }

    /// Answer an `initialize` request.
    ///
    /// Returns the serialized response and the serialized
    /// `notifications/initialized` notification; the caller must send them
    /// in that order. The request's client info and protocol version are
    /// deliberately not inspected: the endpoint's answer is fixed.
    ///
    /// # Arguments
    ///
    /// * `id` - The request id to echo, if any
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::OutpostError::Serialization`] if the frames
    /// cannot be serialized.
    pub fn accept_initialize(&mut self, id: Option<&serde_json::Value>) -> Result<(String, String)> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: self.server_info.clone(),
        };
        let response =
            JsonRpcResponse::result(id.cloned(), serde_json::to_value(&result)?);
        let notification = JsonRpcNotification::new(METHOD_INITIALIZED);

        let frames = (
            serde_json::to_string(&response)?,
            serde_json::to_string(&notification)?,
        );
        self.state = HandshakeState::Initialized;
        Ok(frames)
    }
}
