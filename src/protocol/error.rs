//! Codec error types.

use derive_more::Display;
use tictactoe_board::InvalidArgument;

/// Failure while encoding or decoding a packet.
#[derive(Debug, Clone, Display)]
pub enum CodecError {
    /// A value does not fit its field, or a bit width is unusable.
    #[display("{}", _0)]
    InvalidArgument(InvalidArgument),

    /// A frame is too short, carries trailing data, or holds an
    /// out-of-range value.
    #[display("Invalid packet: {}", _0)]
    InvalidPacket(String),
}

impl CodecError {
    /// Creates an [`CodecError::InvalidPacket`] with the given reason.
    pub fn invalid_packet(reason: impl Into<String>) -> Self {
        Self::InvalidPacket(reason.into())
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::InvalidPacket(_) => None,
        }
    }
}

impl From<InvalidArgument> for CodecError {
    fn from(err: InvalidArgument) -> Self {
        Self::InvalidArgument(err)
    }
}
