//! Binary WebSocket transport.

use super::{Inbound, Transport, TransportError};
use crate::sync::lock;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::Mutex;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, error, info, instrument, warn};

/// Sends and receives packets as binary WebSocket messages.
///
/// One background task owns the socket. It forwards inbound binary messages,
/// writes queued outbound frames, and delivers [`Inbound::Closed`] when the
/// socket ends for any reason.
#[derive(Debug)]
pub struct WebSocketTransport {
    url: String,
    /// Queue into the socket task; empty until connected.
    outgoing: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    /// Sending `true` makes the socket task close the connection.
    shutdown: watch::Sender<bool>,
}

impl WebSocketTransport {
    /// Creates an unconnected transport for `url` (`ws://` or `wss://`).
    #[instrument(skip(url), fields(url = %url.as_ref()))]
    pub fn new(url: impl AsRef<str>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            url: url.as_ref().to_string(),
            outgoing: Mutex::new(None),
            shutdown,
        }
    }

    /// The server URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn connect(&self, inbound: mpsc::Sender<Inbound>) -> Result<(), TransportError> {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow_and_update() {
            return Err(closed_before_connecting());
        }

        info!("Trying to connect to WebSocket");
        let handshake = tokio::select! {
            result = connect_async(self.url.as_str()) => result,
            _ = shutdown.changed() => {
                debug!("Closed during WebSocket handshake");
                return Err(closed_before_connecting());
            }
        };
        let (mut stream, _response) = handshake.map_err(|e| {
            error!(error = %e, "WebSocket handshake failed");
            TransportError::ConnectionFailed {
                reason: e.to_string(),
            }
        })?;

        // Publish the queue before checking the flag; `close` sets the flag
        // before clearing the queue, so one of the two sides always sees the other.
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        *lock(&self.outgoing) = Some(out_tx);
        if *shutdown.borrow_and_update() {
            lock(&self.outgoing).take();
            debug!("Closed while the handshake completed");
            if let Err(e) = stream.close(None).await {
                debug!(error = %e, "WebSocket close handshake failed");
            }
            return Err(closed_before_connecting());
        }
        info!("Connection established");

        let (mut write, mut read) = stream.split();
        tokio::spawn(async move {
            let mut close_socket = false;
            loop {
                tokio::select! {
                    frame = out_rx.recv() => match frame {
                        Some(frame) => {
                            if let Err(e) = write.send(Message::Binary(frame.into())).await {
                                warn!(error = %e, "Bytes could not be transmitted; closing WebSocket");
                                break;
                            }
                        }
                        None => {
                            close_socket = true;
                            break;
                        }
                    },
                    message = read.next() => match message {
                        Some(Ok(Message::Binary(data))) => {
                            if inbound.send(Inbound::Frame(data.to_vec())).await.is_err() {
                                debug!("Session stopped listening");
                                close_socket = true;
                                break;
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!(?frame, "Received closing frame");
                            break;
                        }
                        Some(Ok(other)) => {
                            debug!(?other, "Skipping non-binary WebSocket message");
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "WebSocket read failed");
                            break;
                        }
                        None => break,
                    },
                    _ = shutdown.changed() => {
                        close_socket = true;
                        break;
                    }
                }
            }
            if close_socket {
                debug!("Closing WebSocket on request");
                if let Err(e) = write.close().await {
                    debug!(error = %e, "WebSocket close handshake failed");
                }
            }
            if inbound.send(Inbound::Closed).await.is_err() {
                debug!("Session gone before close was delivered");
            }
        });
        Ok(())
    }

    fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        let outgoing = lock(&self.outgoing);
        match outgoing.as_ref() {
            Some(tx) => tx.send(frame).map_err(|_| TransportError::NotConnected),
            None => Err(TransportError::NotConnected),
        }
    }

    async fn close(&self) {
        self.shutdown.send_replace(true);
        lock(&self.outgoing).take();
    }
}

fn closed_before_connecting() -> TransportError {
    TransportError::ConnectionFailed {
        reason: "Transport was closed before connecting".to_string(),
    }
}
