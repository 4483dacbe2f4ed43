//! Transport abstraction and implementations
//!
//! This module defines the [`Transport`] trait the session and supervisor
//! drive, plus [`EndpointUrl`], the validated remote address. Concrete
//! implementations live in submodules:
//!
//! - [`ws::WsTransport`] -- WebSocket over TCP or TLS via
//!   `tokio-tungstenite` (one JSON-RPC message per text frame).
//! - [`fake::FakeTransport`] -- in-process fake used in tests (cfg(test)
//!   only).
//!
//! # Design
//!
//! The [`Transport`] trait is intentionally minimal: callers `send` a
//! serialized JSON-RPC string and `receive` a stream of serialized JSON-RPC
//! strings (one per logical message). Framing, frame-size enforcement, and
//! connection establishment are the responsibility of each concrete
//! implementation; reconnection belongs to the supervisor above.
//!
//! A stream item of `Err` is a fatal transport fault: the session tears
//! down and the supervisor reconnects. A stream that ends (`None`) is an
//! orderly close by the remote peer.

use std::fmt;
use std::pin::Pin;

use futures::Stream;

use crate::error::{OutpostError, Result};

/// Abstraction over the endpoint's network transport.
///
/// The production implementation is [`ws::WsTransport`]; a
/// [`fake::FakeTransport`] is provided for tests.
///
/// All methods are `async` or return pinned [`Stream`]s so that transport
/// implementations can drive I/O without blocking the Tokio executor.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send a complete JSON-RPC message string to the remote peer.
    ///
    /// The string MUST be a single, complete JSON object; the transport
    /// wraps it in whatever framing the medium requires (a text frame for
    /// WebSocket).
    ///
    /// # Arguments
    ///
    /// * `message` - A serialized JSON-RPC 2.0 message (response or
    ///   notification).
    ///
    /// # Errors
    ///
    /// Returns [`OutpostError::Transport`] or [`OutpostError::WebSocket`]
    /// if the underlying I/O operation fails or times out. A send failure
    /// is fatal to the connection.
    async fn send(&self, message: String) -> Result<()>;

    /// Returns a stream of inbound JSON-RPC message strings.
    ///
    /// Each `Ok` item is a single, complete JSON document as received from
    /// the peer. An `Err` item is a fatal transport fault. The stream ends
    /// when the remote peer closes the connection in an orderly fashion.
    ///
    /// # Returns
    ///
    /// A pinned, `Send`-safe [`Stream`] of `Result<String>` values.
    fn receive(&self) -> Pin<Box<dyn Stream<Item = Result<String>> + Send + '_>>;

    /// Probe connection liveness.
    ///
    /// # Errors
    ///
    /// Returns an error when the probe cannot be written; the supervisor
    /// treats this as connection loss.
    async fn ping(&self) -> Result<()>;

    /// Close the connection, releasing the underlying socket.
    ///
    /// Close failures are ignored: the socket is being torn down either
    /// way.
    async fn close(&self);
}

/// A validated `ws://` or `wss://` endpoint address.
///
/// Parsing rejects every other scheme and URLs without a host. The
/// authentication token is appended only by [`EndpointUrl::connect_url`];
/// `Display` never includes it, so the type is safe to log.
///
/// # Examples
///
/// ```
/// use outpost::mcp::transport::EndpointUrl;
///
/// let url = EndpointUrl::parse("wss://hub.example.com/mcp").unwrap();
/// assert!(url.is_tls());
/// assert_eq!(url.port(), 443);
/// assert_eq!(url.to_string(), "wss://hub.example.com:443/mcp");
/// ```
#[derive(Debug, Clone)]
pub struct EndpointUrl {
    inner: url::Url,
}

impl EndpointUrl {
    /// Parse and validate an endpoint URL
    ///
    /// # Arguments
    ///
    /// * `raw` - The URL string from the configuration
    ///
    /// # Errors
    ///
    /// Returns [`OutpostError::Config`] when the URL does not parse, has a
    /// scheme other than `ws`/`wss`, or lacks a host.
    pub fn parse(raw: &str) -> Result<Self> {
        let inner = url::Url::parse(raw)
            .map_err(|e| OutpostError::Config(format!("invalid server_url '{raw}': {e}")))?;
        match inner.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(OutpostError::Config(format!(
                    "unsupported URL scheme '{other}': expected ws or wss"
                ))
                .into());
            }
        }
        if inner.host_str().is_none() {
            return Err(OutpostError::Config(format!("server_url '{raw}' has no host")).into());
        }
        Ok(Self { inner })
    }

    /// Whether the connection requires TLS (`wss://`)
    pub fn is_tls(&self) -> bool {
        self.inner.scheme() == "wss"
    }

    /// Remote host
    pub fn host(&self) -> &str {
        // Guaranteed present by `parse`.
        self.inner.host_str().unwrap_or_default()
    }

    /// Remote port, defaulting to 80 for `ws` and 443 for `wss`
    pub fn port(&self) -> u16 {
        self.inner
            .port()
            .unwrap_or(if self.is_tls() { 443 } else { 80 })
    }

    /// Request path
    pub fn path(&self) -> &str {
        self.inner.path()
    }

    /// The full URL to dial, with the auth token appended as a `token`
    /// query parameter.
    ///
    /// The returned string carries the credential; it must never be logged.
    pub fn connect_url(&self, token: &str) -> String {
        let mut dial = self.inner.clone();
        dial.query_pairs_mut().append_pair("token", token);
        dial.to_string()
    }
}

impl fmt::Display for EndpointUrl {
    /// Token-free rendering, safe for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}{}",
            self.inner.scheme(),
            self.host(),
            self.port(),
            self.path()
        )
    }
}

pub mod ws;

#[cfg(test)]
pub mod fake;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_ws_and_wss() {
        assert!(EndpointUrl::parse("ws://hub.local/mcp").is_ok());
        assert!(EndpointUrl::parse("wss://hub.example.com/mcp").is_ok());
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        for raw in ["http://hub.local/mcp", "https://hub.local/mcp", "ftp://x/y"] {
            let err = EndpointUrl::parse(raw).unwrap_err().to_string();
            assert!(err.contains("unsupported URL scheme"), "{raw}: {err}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(EndpointUrl::parse("not a url").is_err());
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(EndpointUrl::parse("ws://hub.local/mcp").unwrap().port(), 80);
        assert_eq!(
            EndpointUrl::parse("wss://hub.local/mcp").unwrap().port(),
            443
        );
        assert_eq!(
            EndpointUrl::parse("ws://hub.local:9000/mcp").unwrap().port(),
            9000
        );
    }

    #[test]
    fn test_connect_url_carries_token() {
        let url = EndpointUrl::parse("wss://hub.example.com/mcp").unwrap();
        assert_eq!(
            url.connect_url("secret-token"),
            "wss://hub.example.com/mcp?token=secret-token"
        );
    }

    #[test]
    fn test_display_never_contains_token() {
        let url = EndpointUrl::parse("wss://hub.example.com/mcp").unwrap();
        let _ = url.connect_url("secret-token");
        let rendered = url.to_string();
        assert!(!rendered.contains("secret-token"), "leaked: {rendered}");
        assert_eq!(rendered, "wss://hub.example.com:443/mcp");
    }
}
