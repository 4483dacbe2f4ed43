//! In-process fake transport for unit tests
//!
//! This module provides [`FakeTransport`] and [`FakeTransportHandle`], an
//! in-process pair that replaces real network I/O in tests.
//!
//! # Channel Wiring
//!
//! From the endpoint's perspective:
//!
//! - "outbound" = what the endpoint *sends* = what the test reads via
//!   `handle.outbound_rx`.
//! - "inbound"  = what the endpoint *receives* = what the test injects via
//!   `handle.inbound_tx` or the handle's inject helpers.
//!
//! ```text
//! endpoint send() ----> outbound_tx ----> outbound_rx (handle reads)
//! handle inbound_tx --> inbound_tx  ----> inbound_rx  (endpoint receive())
//! ```
//!
//! Inbound items are `Result<String>` so tests can also inject fatal
//! transport faults. The handle holds the only inbound sender: dropping
//! the handle (or just `inbound_tx`) closes the channel and the receive
//! stream ends, which the endpoint observes as an orderly peer close.

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::{mpsc, Mutex};

use crate::error::{OutpostError, Result};
use crate::mcp::transport::Transport;

/// In-process fake transport for use in tests.
///
/// Implements the full [`Transport`] trait using in-memory channels, so
/// tests can drive a session without a real socket. Create with
/// [`FakeTransport::new`] to obtain both the transport and the
/// complementary [`FakeTransportHandle`].
#[derive(Debug)]
pub struct FakeTransport {
    /// Sender side for `send()`; the handle drains it via `outbound_rx`.
    outbound_tx: mpsc::UnboundedSender<String>,
    /// Shared receiver for the inbound channel; exposed via `receive()`.
    inbound_rx: Arc<Mutex<mpsc::UnboundedReceiver<Result<String>>>>,
}

impl FakeTransport {
    /// Create a new `(FakeTransport, FakeTransportHandle)` pair.
    pub fn new() -> (Self, FakeTransportHandle) {
        // Outbound: transport.send() -> handle.outbound_rx
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<String>();

        // Inbound: handle.inbound_tx -> transport.receive()
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<Result<String>>();

        let transport = Self {
            outbound_tx,
            inbound_rx: Arc::new(Mutex::new(inbound_rx)),
        };

        let handle = FakeTransportHandle {
            outbound_rx,
            inbound_tx,
        };

        (transport, handle)
    }
}

/// The test-side handle for a [`FakeTransport`].
///
/// Use this to read frames the endpoint sent (`outbound_rx.recv().await`)
/// and to inject frames the endpoint will receive (`inbound_tx.send(...)`
/// or the inject helpers). The handle owns the only inbound sender, so
/// dropping it ends the receive stream and makes sends fail, which a
/// session observes as a peer disconnect.
#[derive(Debug)]
pub struct FakeTransportHandle {
    /// Receives frames the endpoint sent via [`Transport::send`].
    pub outbound_rx: mpsc::UnboundedReceiver<String>,
    /// Sends frames into the endpoint's [`Transport::receive`] stream.
    pub inbound_tx: mpsc::UnboundedSender<Result<String>>,
}

impl FakeTransportHandle {
    /// Inject a [`serde_json::Value`] as an inbound frame.
    ///
    /// # Panics
    ///
    /// Panics if the transport side has been dropped.
    pub fn inject_frame(&self, frame: serde_json::Value) {
        let serialized =
            serde_json::to_string(&frame).expect("FakeTransport: failed to serialize frame");
        self.inject_raw(serialized);
    }

    /// Inject a raw inbound string, including malformed JSON.
    ///
    /// # Panics
    ///
    /// Panics if the transport side has been dropped.
    pub fn inject_raw(&self, frame: String) {
        self.inbound_tx
            .send(Ok(frame))
            .expect("FakeTransport: inbound channel closed before inject");
    }

    /// Inject a fatal transport fault into the receive stream.
    ///
    /// # Panics
    ///
    /// Panics if the transport side has been dropped.
    pub fn inject_error(&self, message: &str) {
        self.inbound_tx
            .send(Err(OutpostError::Transport(message.to_string()).into()))
            .expect("FakeTransport: inbound channel closed before inject_error");
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn send(&self, message: String) -> Result<()> {
        self.outbound_tx.send(message).map_err(|e| {
            anyhow::anyhow!(OutpostError::Transport(format!(
                "FakeTransport outbound channel closed: {}",
                e
            )))
        })
    }

    fn receive(&self) -> Pin<Box<dyn Stream<Item = Result<String>> + Send + '_>> {
        let rx = Arc::clone(&self.inbound_rx);
        Box::pin(futures::stream::unfold(rx, |rx| async move {
            let item = {
                let mut guard = rx.lock().await;
                guard.recv().await?
            };
            Some((item, rx))
        }))
    }

    /// Succeeds while the handle is alive, fails after it is dropped,
    /// mirroring a liveness probe on a dead socket.
    async fn ping(&self) -> Result<()> {
        if self.outbound_tx.is_closed() {
            return Err(
                OutpostError::Transport("FakeTransport peer is gone".to_string()).into(),
            );
        }
        Ok(())
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use futures::StreamExt;

    #[tokio::test]
    async fn test_send_delivers_to_handle_outbound_rx() {
        let (transport, mut handle) = FakeTransport::new();

        transport
            .send(r#"{"jsonrpc":"2.0","method":"ping"}"#.to_string())
            .await
            .unwrap();

        let received = tokio::time::timeout(Duration::from_secs(2), handle.outbound_rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed");

        assert_eq!(received, r#"{"jsonrpc":"2.0","method":"ping"}"#);
    }

    #[tokio::test]
    async fn test_receive_yields_injected_frames_in_order() {
        let (transport, handle) = FakeTransport::new();

        for i in 0u32..3 {
            handle.inject_raw(format!("frame-{}", i));
        }

        let mut stream = transport.receive();
        for i in 0u32..3 {
            let frame = tokio::time::timeout(Duration::from_secs(2), stream.next())
                .await
                .expect("timed out")
                .expect("stream ended")
                .expect("unexpected transport error");
            assert_eq!(frame, format!("frame-{}", i));
        }
    }

    #[tokio::test]
    async fn test_inject_frame_serializes_value() {
        let (transport, handle) = FakeTransport::new();

        handle.inject_frame(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 42,
            "method": "ping"
        }));

        let mut stream = transport.receive();
        let frame = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out")
            .expect("stream ended")
            .expect("unexpected transport error");

        let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["id"], 42);
        assert_eq!(parsed["method"], "ping");
    }

    #[tokio::test]
    async fn test_inject_error_surfaces_as_stream_error() {
        let (transport, handle) = FakeTransport::new();
        handle.inject_error("socket reset");

        let mut stream = transport.receive();
        let item = stream.next().await.expect("stream ended");
        assert!(item.is_err());
    }

    #[tokio::test]
    async fn test_dropping_handle_ends_receive_stream() {
        let (transport, handle) = FakeTransport::new();
        drop(handle);

        let mut stream = transport.receive();
        let ended = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("receive stream did not end after handle drop");
        assert!(ended.is_none());
    }

    #[tokio::test]
    async fn test_buffered_frames_drain_before_close() {
        let (transport, handle) = FakeTransport::new();
        handle.inject_raw("last-frame".to_string());
        drop(handle);

        let mut stream = transport.receive();
        let frame = stream
            .next()
            .await
            .expect("buffered frame lost")
            .expect("unexpected transport error");
        assert_eq!(frame, "last-frame");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_send_and_ping_fail_when_handle_dropped() {
        let (transport, handle) = FakeTransport::new();
        drop(handle);

        assert!(transport.send("test".to_string()).await.is_err());
        assert!(transport.ping().await.is_err());
    }

    #[test]
    fn test_fake_transport_is_object_safe() {
        let (transport, _handle) = FakeTransport::new();
        let _boxed: Box<dyn Transport> = Box::new(transport);
    }
}
