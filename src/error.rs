//! Error types for Outpost
//!
//! This module defines all error types used throughout the endpoint,
//! using `thiserror` for ergonomic error handling.
//!
//! The variants map onto the endpoint's fault taxonomy: only `Config` is
//! fatal to startup. Transport faults trigger teardown and reconnection,
//! protocol faults drop the offending frame, and tool faults are surfaced
//! to the remote caller as `isError: true` — none of them terminate the
//! process.

use thiserror::Error;

/// Main error type for Outpost operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, transport establishment, protocol handling,
/// and tool invocation.
#[derive(Error, Debug)]
pub enum OutpostError {
    /// Configuration-related errors (missing URL/token, bad scheme).
    ///
    /// The only fault class that is fatal to startup: nothing is spawned
    /// when configuration validation fails.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport errors (connect, read, write, liveness probe failure)
    ///
    /// Recovered by the supervisor through teardown and reconnection with
    /// backoff; never propagated past the endpoint's public boundary.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Protocol errors (malformed JSON, missing required fields)
    ///
    /// The offending frame is dropped and the connection stays alive.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Tool invocation errors
    ///
    /// Surfaced to the remote caller as an `isError: true` result; the
    /// connection stays alive.
    #[error("Tool execution error: {0}")]
    Tool(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// WebSocket-level errors from the underlying transport crate
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Result type alias for Outpost operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
