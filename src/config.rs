//! Configuration management for Outpost
//!
//! This module handles loading, parsing, validating, and managing the
//! endpoint configuration from YAML files with serde-provided defaults.
//!
//! The configuration is an immutable snapshot: it is validated once at
//! startup and then moved into the supervisor. Starting a new endpoint
//! replaces the previous snapshot wholesale; there is no merging.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{OutpostError, Result};
use crate::mcp::transport::EndpointUrl;

/// Main configuration structure for the endpoint
///
/// Holds the remote server coordinates, the identity advertised during the
/// MCP handshake, and every transport tunable. All fields other than
/// `server_url` and `auth_token` have serde defaults matching the reference
/// behavior.
///
/// `Debug` is implemented manually so the auth token never reaches logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// WebSocket URL of the remote control endpoint (`ws://` or `wss://`)
    pub server_url: String,

    /// Bearer token appended to the WebSocket path as `?token=<token>`
    ///
    /// A deliberate simplification of the reference wire contract; the
    /// token is redacted from all log output.
    pub auth_token: String,

    /// Implementation name reported in the handshake `serverInfo`
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Implementation version reported in the handshake `serverInfo`
    #[serde(default = "default_client_version")]
    pub client_version: String,

    /// Transport timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Reconnection and liveness policy
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Largest accepted WebSocket message, in bytes.
    ///
    /// Oversized frames are rejected by the transport layer, never
    /// truncated.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Accept chain-valid TLS certificates whose hostname does not match.
    ///
    /// A documented reduction in security for deployments with constrained
    /// certificate stores; the certificate chain is still verified against
    /// the trusted root bundle. Off by default.
    #[serde(default)]
    pub danger_skip_hostname_verification: bool,
}

fn default_client_name() -> String {
    "outpost".to_string()
}

fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_max_frame_bytes() -> usize {
    4096
}

/// Transport timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Timeout for establishing the TCP/TLS/WebSocket stack (seconds)
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,

    /// Timeout for writing a single outbound frame (seconds)
    #[serde(default = "default_write_secs")]
    pub write_secs: u64,

    /// Read poll interval for the receive loop (seconds).
    ///
    /// Kept short so the loop observes cancellation promptly; a poll that
    /// elapses without data is not an error.
    #[serde(default = "default_read_poll_secs")]
    pub read_poll_secs: u64,
}

fn default_connect_secs() -> u64 {
    10
}

fn default_write_secs() -> u64 {
    5
}

fn default_read_poll_secs() -> u64 {
    1
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_secs(),
            write_secs: default_write_secs(),
            read_poll_secs: default_read_poll_secs(),
        }
    }
}

impl TimeoutConfig {
    /// Connect timeout as a [`Duration`]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    /// Write timeout as a [`Duration`]
    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }

    /// Read poll interval as a [`Duration`]
    pub fn read_poll(&self) -> Duration {
        Duration::from_secs(self.read_poll_secs)
    }
}

/// Reconnection and liveness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Wait between failed connection attempts (seconds)
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Interval between liveness probes on an established connection
    /// (seconds)
    #[serde(default = "default_liveness_interval_secs")]
    pub liveness_interval_secs: u64,
}

fn default_backoff_secs() -> u64 {
    10
}

fn default_liveness_interval_secs() -> u64 {
    5
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            backoff_secs: default_backoff_secs(),
            liveness_interval_secs: default_liveness_interval_secs(),
        }
    }
}

impl ReconnectConfig {
    /// Connect-failure backoff as a [`Duration`]
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    /// Liveness probe interval as a [`Duration`]
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs)
    }
}

impl EndpointConfig {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Errors
    ///
    /// Returns [`OutpostError::Config`] if the file cannot be read and
    /// [`OutpostError::Yaml`] if it cannot be parsed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use outpost::config::EndpointConfig;
    ///
    /// let config = EndpointConfig::load("config/outpost.yaml").unwrap();
    /// config.validate().unwrap();
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OutpostError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(OutpostError::Yaml)?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks that the server URL and auth token are present, that the URL
    /// uses a supported scheme, and that the timeouts are sane. This is the
    /// only place a fault is fatal: when validation fails, nothing has been
    /// spawned yet.
    ///
    /// # Errors
    ///
    /// Returns [`OutpostError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            return Err(OutpostError::Config("server_url is required".to_string()).into());
        }
        if self.auth_token.is_empty() {
            return Err(OutpostError::Config("auth_token is required".to_string()).into());
        }
        // Surfaces unsupported schemes and unparseable URLs at startup.
        EndpointUrl::parse(&self.server_url)?;
        if self.timeouts.connect_secs == 0 || self.timeouts.write_secs == 0 {
            return Err(
                OutpostError::Config("connect and write timeouts must be non-zero".to_string())
                    .into(),
            );
        }
        if self.max_frame_bytes == 0 {
            return Err(OutpostError::Config("max_frame_bytes must be non-zero".to_string()).into());
        }
        Ok(())
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("server_url", &self.server_url)
            .field("auth_token", &"<redacted>")
            .field("client_name", &self.client_name)
            .field("client_version", &self.client_version)
            .field("timeouts", &self.timeouts)
            .field("reconnect", &self.reconnect)
            .field("max_frame_bytes", &self.max_frame_bytes)
            .field(
                "danger_skip_hostname_verification",
                &self.danger_skip_hostname_verification,
            )
            .finish()
    }
}
