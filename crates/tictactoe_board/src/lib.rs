//! Tic-tac-toe board state for a match played against a remote opponent.
//!
//! The board here is the client's mirror of a match whose authority is a
//! server. Local moves are applied optimistically; server snapshots replace
//! the whole board.
//!
//! # Architecture
//!
//! - **Symbol / GameCode**: the small value types the wire protocol carries
//! - **FieldCoordinate**: validated `(x, y)` to linear index mapping
//! - **GameState**: cells, turn and activity flags, win detection
//! - **rules**: line evaluation shared by the state and its tests

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod position;
pub mod rules;
mod state;
mod types;

pub use error::{InvalidArgument, MoveError};
pub use position::FieldCoordinate;
pub use state::GameState;
pub use types::{GameCode, Symbol};
