//! In-memory transport whose far end is driven by code in the same process.
//!
//! The [`ChannelPeer`] plays the server. Tests use it to script a match, and
//! embedders use it to bridge the session onto another message channel.

use super::{Inbound, Transport, TransportError};
use crate::SessionError;
use crate::protocol::{ClientPacket, CodecError, ServerPacket};
use crate::sync::lock;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Client end of an in-memory connection.
#[derive(Debug)]
pub struct ChannelTransport {
    /// Frames from the peer; taken by the pump task on connect.
    from_peer: Mutex<Option<mpsc::UnboundedReceiver<Vec<u8>>>>,
    to_peer: mpsc::UnboundedSender<Vec<u8>>,
    connected: Arc<AtomicBool>,
    /// Sending `true` stops the pump task.
    shutdown: watch::Sender<bool>,
    /// When set, `connect` fails with this reason.
    refuse_with: Option<String>,
}

/// Server end of an in-memory connection.
#[derive(Debug)]
pub struct ChannelPeer {
    /// Dropped on hang-up, which ends the client's inbound stream.
    to_client: Option<mpsc::UnboundedSender<Vec<u8>>>,
    from_client: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl ChannelTransport {
    /// Creates a connected pair of transport and peer.
    #[instrument]
    pub fn pair() -> (Self, ChannelPeer) {
        let (to_client, from_peer) = mpsc::unbounded_channel();
        let (to_peer, from_client) = mpsc::unbounded_channel();
        let (shutdown, _) = watch::channel(false);
        let transport = Self {
            from_peer: Mutex::new(Some(from_peer)),
            to_peer,
            connected: Arc::new(AtomicBool::new(false)),
            shutdown,
            refuse_with: None,
        };
        let peer = ChannelPeer {
            to_client: Some(to_client),
            from_client,
        };
        (transport, peer)
    }

    /// Creates a transport whose `connect` always fails with `reason`.
    #[instrument(skip(reason))]
    pub fn refusing(reason: impl Into<String>) -> Self {
        let (transport, _peer) = Self::pair();
        Self {
            refuse_with: Some(reason.into()),
            ..transport
        }
    }

    /// Whether frames can currently be sent.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    #[instrument(skip_all)]
    async fn connect(&self, inbound: mpsc::Sender<Inbound>) -> Result<(), TransportError> {
        if let Some(reason) = &self.refuse_with {
            return Err(TransportError::ConnectionFailed {
                reason: reason.clone(),
            });
        }
        let mut from_peer = lock(&self.from_peer).take().ok_or_else(|| {
            TransportError::ConnectionFailed {
                reason: "Transport was already connected".to_string(),
            }
        })?;
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow_and_update() {
            return Err(TransportError::ConnectionFailed {
                reason: "Transport was closed before connecting".to_string(),
            });
        }

        self.connected.store(true, Ordering::SeqCst);
        info!("In-memory connection established");

        let connected = Arc::clone(&self.connected);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = from_peer.recv() => match frame {
                        Some(frame) => {
                            if inbound.send(Inbound::Frame(frame)).await.is_err() {
                                debug!("Session stopped listening");
                                break;
                            }
                        }
                        None => {
                            debug!("Peer hung up");
                            break;
                        }
                    },
                    _ = shutdown.changed() => {
                        debug!("Transport closed locally");
                        break;
                    }
                }
            }
            connected.store(false, Ordering::SeqCst);
            if inbound.send(Inbound::Closed).await.is_err() {
                debug!("Session gone before close was delivered");
            }
        });
        Ok(())
    }

    fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        if self.to_peer.send(frame).is_err() {
            warn!("Peer dropped; closing in-memory transport");
            self.connected.store(false, Ordering::SeqCst);
            self.shutdown.send_replace(true);
        }
        Ok(())
    }

    async fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.shutdown.send_replace(true);
    }
}

impl ChannelPeer {
    /// Delivers a raw frame to the client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] after [`ChannelPeer::hang_up`]
    /// or once the client side is gone.
    pub fn send_frame(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.to_client
            .as_ref()
            .ok_or(TransportError::NotConnected)?
            .send(frame)
            .map_err(|_| TransportError::NotConnected)
    }

    /// Encodes and delivers a packet to the client.
    ///
    /// # Errors
    ///
    /// Fails if the packet cannot be encoded or the client is unreachable.
    pub fn send_packet(&self, packet: &ServerPacket) -> Result<(), SessionError> {
        self.send_frame(packet.encode()?)?;
        Ok(())
    }

    /// Waits for the next frame sent by the client.
    ///
    /// Returns `None` once the client side is gone.
    pub async fn recv_frame(&mut self) -> Option<Vec<u8>> {
        self.from_client.recv().await
    }

    /// Waits for the next frame sent by the client and decodes it.
    pub async fn recv_packet(&mut self) -> Option<Result<ClientPacket, CodecError>> {
        let frame = self.recv_frame().await?;
        Some(ClientPacket::decode(&frame))
    }

    /// Ends the connection from the server side.
    pub fn hang_up(&mut self) {
        self.to_client = None;
    }
}
