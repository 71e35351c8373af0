//! Session error types.

use crate::protocol::CodecError;
use crate::transport::TransportError;
use derive_more::Display;
use tictactoe_board::{InvalidArgument, MoveError};

/// Error returned synchronously by a caller-invoked session operation.
#[derive(Debug, Clone, Display)]
pub enum SessionError {
    /// Malformed game code or coordinate.
    #[display("{}", _0)]
    InvalidArgument(InvalidArgument),

    /// The local board rejected the move.
    #[display("{}", _0)]
    Move(MoveError),

    /// A packet could not be encoded or decoded.
    #[display("{}", _0)]
    Codec(CodecError),

    /// A packet was sent before connecting or after the connection closed.
    #[display("WebSocket is not connected")]
    WebSocketNotConnected,

    /// A transport reported [`TransportError::ConnectionFailed`].
    ///
    /// Only produced by the `From<TransportError>` conversion. The session
    /// reports its own connect failures as notifications, and sending never
    /// yields this kind, so no [`crate::Session`] operation returns it.
    #[display("Connection failed: {}", _0)]
    ConnectionFailed(String),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::Move(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::WebSocketNotConnected | Self::ConnectionFailed(_) => None,
        }
    }
}

impl From<InvalidArgument> for SessionError {
    fn from(err: InvalidArgument) -> Self {
        Self::InvalidArgument(err)
    }
}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        Self::Move(err)
    }
}

impl From<CodecError> for SessionError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotConnected => Self::WebSocketNotConnected,
            TransportError::ConnectionFailed { reason } => Self::ConnectionFailed(reason),
        }
    }
}
