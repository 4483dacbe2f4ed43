//! Connection supervision and the public endpoint handle
//!
//! The supervisor owns the connect/serve/reconnect lifecycle: it dials the
//! configured server, hands the established transport to a [`Session`],
//! probes liveness while the session runs, and reconnects when the
//! connection is lost. Failed connect attempts back off on a fixed
//! interval; after an established session drops, reconnection is attempted
//! immediately.
//!
//! [`McpEndpoint`] is the only surface the rest of the program touches:
//! `start` spawns the supervisor, `shutdown` cancels it and waits, and the
//! connection state is observable through a `watch` channel with a single
//! writer.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::EndpointConfig;
use crate::error::Result;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::handshake::Handshake;
use crate::mcp::session::Session;
use crate::mcp::transport::ws::WsTransport;
use crate::mcp::transport::{EndpointUrl, Transport};
use crate::tools::ToolRegistry;

/// Observable lifecycle of the endpoint's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection; the supervisor is idle or backing off.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// The WebSocket is established; no `initialize` seen yet.
    Connected,
    /// `initialize` received, handshake frames being written.
    Initializing,
    /// Handshake complete; the session is serving requests.
    Ready,
}

impl ConnectionState {
    /// Whether a live connection exists, regardless of handshake progress.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::Initializing | Self::Ready)
    }
}

/// Single-writer publisher for [`ConnectionState`].
///
/// Shared between the supervisor and the session so handshake progress is
/// published from where it happens; every transition goes through
/// [`StateHandle::set`].
#[derive(Debug)]
pub struct StateHandle {
    tx: watch::Sender<ConnectionState>,
}

impl StateHandle {
    /// Create a handle and its observer side, starting `Disconnected`.
    pub fn new() -> (Arc<Self>, watch::Receiver<ConnectionState>) {
        let (tx, rx) = watch::channel(ConnectionState::Disconnected);
        (Arc::new(Self { tx }), rx)
    }

    /// Publish a state transition.
    pub fn set(&self, state: ConnectionState) {
        let previous = self.tx.send_replace(state);
        if previous != state {
            debug!(?previous, current = ?state, "connection state changed");
        }
    }

    /// Current state.
    pub fn get(&self) -> ConnectionState {
        *self.tx.borrow()
    }
}

/// Owns the connect/serve/reconnect loop for one configured endpoint.
struct Supervisor {
    config: EndpointConfig,
    url: EndpointUrl,
    registry: Arc<ToolRegistry>,
    state: Arc<StateHandle>,
    cancel: CancellationToken,
}

impl Supervisor {
    async fn run(self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            self.state.set(ConnectionState::Connecting);
            match WsTransport::connect(&self.url, &self.config).await {
                Ok(transport) => {
                    info!("connected to {}", self.url);
                    let transport: Arc<dyn Transport> = Arc::new(transport);
                    self.state.set(ConnectionState::Connected);

                    self.serve(Arc::clone(&transport)).await;

                    transport.close().await;
                    self.state.set(ConnectionState::Disconnected);
                    // An established session dropped: reconnect without
                    // backoff.
                }
                Err(e) => {
                    self.state.set(ConnectionState::Disconnected);
                    warn!("connect to {} failed: {}", self.url, e);
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.config.reconnect.backoff()) => {}
                    }
                }
            }
        }
        self.state.set(ConnectionState::Disconnected);
        debug!("supervisor stopped");
    }

    /// Run one session over an established transport, probing liveness on
    /// the configured interval until the session ends, a probe fails, or
    /// the endpoint shuts down.
    async fn serve(&self, transport: Arc<dyn Transport>) {
        let session_cancel = self.cancel.child_token();
        let session = Session::new(
            Arc::clone(&transport),
            Dispatcher::new(Arc::clone(&self.registry)),
            Handshake::new(&self.config.client_name, &self.config.client_version),
            Arc::clone(&self.state),
            self.config.timeouts.read_poll(),
            session_cancel.clone(),
        );
        let mut task = tokio::spawn(session.run());

        let period = self.config.reconnect.liveness_interval();
        // First probe after one full period, not immediately.
        let mut liveness =
            tokio::time::interval_at(tokio::time::Instant::now() + period, period);

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    session_cancel.cancel();
                    break;
                }

                joined = &mut task => {
                    if let Err(e) = joined {
                        warn!("session task failed: {}", e);
                    }
                    return;
                }

                _ = liveness.tick() => {
                    if let Err(e) = transport.ping().await {
                        warn!("liveness probe failed: {}", e);
                        session_cancel.cancel();
                        break;
                    }
                }
            }
        }

        if let Err(e) = task.await {
            warn!("session task failed: {}", e);
        }
    }
}

/// Handle to a running dial-out endpoint.
///
/// # Examples
///
/// ```no_run
/// use outpost::config::EndpointConfig;
/// use outpost::mcp::supervisor::McpEndpoint;
/// use outpost::tools::ToolRegistry;
///
/// # #[tokio::main]
/// # async fn main() -> outpost::error::Result<()> {
/// let config = EndpointConfig::load("config/outpost.yaml")?;
/// let registry = ToolRegistry::builder().build()?;
/// let endpoint = McpEndpoint::start(config, registry)?;
///
/// tokio::signal::ctrl_c().await?;
/// endpoint.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct McpEndpoint {
    cancel: CancellationToken,
    state_rx: watch::Receiver<ConnectionState>,
    task: tokio::task::JoinHandle<()>,
}

impl McpEndpoint {
    /// Validate the configuration and spawn the supervisor.
    ///
    /// Returns immediately; connection establishment happens in the
    /// background and its progress is observable via [`Self::state_watch`].
    ///
    /// # Arguments
    ///
    /// * `config` - The endpoint configuration
    /// * `registry` - The immutable tool table to serve
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::OutpostError::Config`] when the
    /// configuration is invalid; after a successful return, no fault is
    /// ever propagated out of the endpoint.
    pub fn start(config: EndpointConfig, registry: ToolRegistry) -> Result<Self> {
        config.validate()?;
        let url = EndpointUrl::parse(&config.server_url)?;
        let (state, state_rx) = StateHandle::new();
        let cancel = CancellationToken::new();

        let supervisor = Supervisor {
            config,
            url,
            registry: Arc::new(registry),
            state,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(supervisor.run());

        Ok(Self {
            cancel,
            state_rx,
            task,
        })
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Whether a live connection exists right now.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// A watch receiver for observing state transitions.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Stop the supervisor, tear down any live session, and wait for the
    /// background task to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("supervisor task failed during shutdown: {}", e);
        }
    }
}
