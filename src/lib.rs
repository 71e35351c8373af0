//! Remote tic-tac-toe client library
//!
//! Plays tic-tac-toe against a remote opponent through a match server that
//! speaks a compact bit-packed protocol over binary WebSocket frames.
//!
//! # Architecture
//!
//! - **protocol**: bit writer/reader and the packet codec
//! - **transport**: frame transports (WebSocket, in-memory)
//! - **Session**: owns the game, dispatches server packets, emits notifications
//! - **config**: TOML + environment configuration for the binary
//!
//! # Example
//!
//! ```no_run
//! use remote_tictactoe::{Notification, Session, transport::{Transport, WebSocketTransport}};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (session, mut notifications) = Session::connect(|| {
//!     Box::new(WebSocketTransport::new("ws://127.0.0.1:80")) as Box<dyn Transport>
//! });
//!
//! // The server greets every new connection with a fresh game code.
//! if let Some(Notification::Refresh) = notifications.recv().await {
//!     println!("{:?}", session.game().game_code());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
pub mod protocol;
mod session;
mod sync;
pub mod transport;

pub use config::{ClientConfig, ConfigError, SERVER_URL_ENV};
pub use error::SessionError;
pub use session::{Notification, Notifications, Session, SessionPhase, TransportFactory};
pub use tictactoe_board::{
    FieldCoordinate, GameCode, GameState, InvalidArgument, MoveError, Symbol,
};
