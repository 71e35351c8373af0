//! Frame transports between the session and the match server.
//!
//! A transport moves opaque binary frames. It knows nothing about packets:
//! the session encodes and decodes them on either side of this trait.

mod channel;
mod websocket;

pub use channel::{ChannelPeer, ChannelTransport};
pub use websocket::WebSocketTransport;

use async_trait::async_trait;
use derive_more::{Display, Error};
use tokio::sync::mpsc;

/// Something a transport delivers to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// One binary frame, carrying exactly one packet.
    Frame(Vec<u8>),
    /// The connection ended. Nothing follows.
    Closed,
}

/// Transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TransportError {
    /// A frame was sent before connecting or after closing.
    #[display("WebSocket is not connected")]
    NotConnected,

    /// The connection could not be established.
    #[display("{}", reason)]
    ConnectionFailed {
        /// Human-readable cause.
        reason: String,
    },
}

/// A bidirectional frame connection.
///
/// Implementations pump every inbound binary frame into the sender handed
/// to [`Transport::connect`] and finish with exactly one
/// [`Inbound::Closed`], whether the peer hung up, a write failed or
/// [`Transport::close`] was called.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens the connection and starts delivering frames into `inbound`.
    ///
    /// Returns once the connection is usable.
    async fn connect(&self, inbound: mpsc::Sender<Inbound>) -> Result<(), TransportError>;

    /// Queues one frame for sending without waiting for the write.
    ///
    /// A failed write closes the transport, which then delivers
    /// [`Inbound::Closed`].
    fn send(&self, frame: Vec<u8>) -> Result<(), TransportError>;

    /// Closes the connection. Does nothing if it is not open.
    async fn close(&self);
}
