//! Error types for board operations.

use crate::FieldCoordinate;
use derive_more::{Display, Error};
use tracing::instrument;

/// An argument was outside the range an operation accepts.
///
/// Raised for malformed coordinates and game codes, and re-used by the wire
/// codec for integers that do not fit their bit width.
#[derive(Debug, Clone, Display, Error)]
#[display("Invalid argument: {} at {}:{}", message, file, line)]
pub struct InvalidArgument {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl InvalidArgument {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// A move was rejected by the local board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MoveError {
    /// Moves are not permitted right now.
    #[display("The game is not active")]
    GameNotActive,

    /// The local player tried to move while the opponent is on turn.
    #[display("It is not your turn")]
    NotOnTurn,

    /// The target field already holds a symbol.
    #[display("Field {} is already occupied", _0)]
    FieldAlreadyOccupied(FieldCoordinate),
}

impl std::error::Error for MoveError {}
