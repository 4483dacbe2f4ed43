//! Per-connection session loop
//!
//! One [`Session`] owns one established transport for its whole life. It
//! drains the inbound frame stream, routes `initialize` to the handshake
//! and everything else to the dispatcher, and writes whatever response
//! frames come back. The loop polls the stream on a short interval so
//! cancellation is observed promptly even on an idle connection.
//!
//! Faults are tiered: a frame that fails to parse is logged and dropped
//! with the connection intact; a fatal read error, a write failure, or an
//! orderly peer close ends the session, and the supervisor above decides
//! about reconnection.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::mcp::dispatcher::{Dispatcher, Method};
use crate::mcp::handshake::Handshake;
use crate::mcp::supervisor::{ConnectionState, StateHandle};
use crate::mcp::transport::Transport;
use crate::mcp::types::JsonRpcRequest;

/// One protocol session over one established connection.
pub struct Session {
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
    handshake: Handshake,
    state: Arc<StateHandle>,
    read_poll: Duration,
    cancel: CancellationToken,
}

impl Session {
    /// Create a session over an established transport
    ///
    /// # Arguments
    ///
    /// * `transport` - The connected transport to serve
    /// * `dispatcher` - Request router over the tool registry
    /// * `handshake` - Fresh handshake state for this connection
    /// * `state` - Connection-state publisher shared with the supervisor
    /// * `read_poll` - How often the receive loop re-checks cancellation
    /// * `cancel` - Token that ends the session when cancelled
    pub fn new(
        transport: Arc<dyn Transport>,
        dispatcher: Dispatcher,
        handshake: Handshake,
        state: Arc<StateHandle>,
        read_poll: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            dispatcher,
            handshake,
            state,
            read_poll,
            cancel,
        }
    }

    /// Serve the connection until cancellation, peer close, or a fatal
    /// transport fault.
    pub async fn run(mut self) {
        let transport = Arc::clone(&self.transport);
        let mut frames = transport.receive();

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("session cancelled");
                    break;
                }

                polled = tokio::time::timeout(self.read_poll, frames.next()) => {
                    match polled {
                        // Poll elapsed without data; loop to re-check
                        // cancellation.
                        Err(_) => continue,
                        Ok(None) => {
                            info!("remote peer closed the connection");
                            break;
                        }
                        Ok(Some(Err(e))) => {
                            warn!("fatal transport fault: {}", e);
                            break;
                        }
                        Ok(Some(Ok(frame))) => {
                            if let Err(e) = self.handle_frame(&frame).await {
                                warn!("session write failed: {}", e);
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Process one inbound frame.
    ///
    /// # Errors
    ///
    /// Returns an error only for faults fatal to the connection (a failed
    /// write); protocol-level problems are logged and swallowed.
    async fn handle_frame(&mut self, frame: &str) -> Result<()> {
        let request: JsonRpcRequest = match serde_json::from_str(frame) {
            Ok(r) => r,
            Err(e) => {
                warn!("dropping malformed frame: {}", e);
                return Ok(());
            }
        };

        if Method::parse(&request.method) == Method::Initialize {
            debug!("handshake: initialize received");
            self.state.set(ConnectionState::Initializing);
            let (response, notification) =
                self.handshake.accept_initialize(request.id.as_ref())?;
            // Response first, then the initialized notification.
            self.transport.send(response).await?;
            self.transport.send(notification).await?;
            self.state.set(ConnectionState::Ready);
            info!("session initialized");
            return Ok(());
        }

        if !self.handshake.is_initialized() {
            warn!(method = %request.method, "request before initialize");
        }

        if let Some(response) = self.dispatcher.dispatch(&request).await? {
            self.transport.send(response).await?;
        }
        Ok(())
    }
}
