//! Session controller binding one match, one transport and the UI.
//!
//! A [`Session`] owns the local [`GameState`], decodes every inbound frame
//! in a background task and reports each outcome on a single
//! [`Notifications`] stream: either [`Notification::Refresh`] (re-read the
//! game) or a display-ready error message.
//!
//! Local moves are predictions. They are applied before the server answers,
//! and the next [`ServerPacket::GameInfo`] snapshot overwrites them.

use crate::SessionError;
use crate::protocol::{ClientPacket, ServerPacket};
use crate::sync::lock;
use crate::transport::{Inbound, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tictactoe_board::{FieldCoordinate, GameCode, GameState, InvalidArgument};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

/// Builds a fresh, unconnected transport for every (re)connection.
pub type TransportFactory = Box<dyn Fn() -> Box<dyn Transport> + Send + Sync>;

/// Inbound frames buffered between a transport and the decode loop.
const INBOUND_CAPACITY: usize = 16;

const CONNECTION_CLOSED_MESSAGE: &str = "WebSocket connection failed: the connection has been closed.";
const PACKET_INVALID_MESSAGE: &str = "Sorry, there was a problem sending data.";
const ACTION_INVALID_MESSAGE: &str = "You cannot do this right now.";
const GAME_CODE_INVALID_MESSAGE: &str = "You entered an invalid game code.";
const GAME_FULL_MESSAGE: &str = "The game is full. Please wait or join another game.";

/// Lifecycle of the session's current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionPhase {
    /// The transport is being opened.
    Connecting,
    /// Frames are being decoded and packets can be sent.
    Listening,
    /// The connection ended or never came up.
    Closed,
    /// The old connection is being replaced.
    Restarting,
}

/// One event for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The game state changed; re-read it with [`Session::game`].
    Refresh,
    /// Something failed; the message is ready for display.
    Error(String),
}

/// Receiving end of a session's notifications.
///
/// Holds at most one undelivered item: the session waits for the consumer
/// before handing over the next one.
#[derive(Debug)]
pub struct Notifications {
    rx: mpsc::Receiver<Notification>,
}

impl Notifications {
    /// Waits for the next notification.
    ///
    /// Returns `None` once the session and all its tasks are gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }
}

/// One transport plus whether the session itself asked it to close.
struct Connection {
    transport: Box<dyn Transport>,
    closed_purposely: AtomicBool,
}

impl Connection {
    fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            closed_purposely: AtomicBool::new(false),
        }
    }

    fn closed_purposely(&self) -> bool {
        self.closed_purposely.load(Ordering::SeqCst)
    }

    async fn close_purposely(&self) {
        self.closed_purposely.store(true, Ordering::SeqCst);
        self.transport.close().await;
    }
}

struct Inner {
    factory: TransportFactory,
    game: Mutex<GameState>,
    /// Code submitted but not yet confirmed, or the confirmed code.
    last_game_code_entered: Mutex<Option<GameCode>>,
    connection: Mutex<Arc<Connection>>,
    phase: watch::Sender<SessionPhase>,
    notify_tx: mpsc::Sender<Notification>,
    runtime: Handle,
}

/// Client side of one remote tic-tac-toe match.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Creates a session and starts connecting in the background.
    ///
    /// `factory` is called now and again on every
    /// [`Session::restart_connection`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[instrument(skip_all)]
    pub fn connect<F>(factory: F) -> (Self, Notifications)
    where
        F: Fn() -> Box<dyn Transport> + Send + Sync + 'static,
    {
        let (notify_tx, rx) = mpsc::channel(1);
        let (phase, _) = watch::channel(SessionPhase::Connecting);
        let first = Arc::new(Connection::new(factory()));
        let inner = Arc::new(Inner {
            factory: Box::new(factory),
            game: Mutex::new(GameState::new()),
            last_game_code_entered: Mutex::new(None),
            connection: Mutex::new(first),
            phase,
            notify_tx,
            runtime: Handle::current(),
        });
        let connection = inner.current_connection();
        Inner::start(&inner, connection);
        (Self { inner }, Notifications { rx })
    }

    /// Checks a user-entered game code without a session.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] unless the code is five letters `A`-`Z`
    /// in either case.
    pub fn validate_game_code(code: &str) -> Result<GameCode, InvalidArgument> {
        GameCode::parse(code)
    }

    /// Returns a snapshot of the current game.
    pub fn game(&self) -> GameState {
        lock(&self.inner.game).clone()
    }

    /// Returns the current connection phase.
    pub fn phase(&self) -> SessionPhase {
        *self.inner.phase.borrow()
    }

    /// Subscribes to phase changes.
    pub fn watch_phase(&self) -> watch::Receiver<SessionPhase> {
        self.inner.phase.subscribe()
    }

    /// Waits until the current connection attempt settles.
    ///
    /// Returns `true` if the session is listening.
    pub async fn connected(&self) -> bool {
        let mut phase = self.watch_phase();
        let settled = phase
            .wait_for(|p| !matches!(p, SessionPhase::Connecting | SessionPhase::Restarting))
            .await
            .map(|p| *p);
        matches!(settled, Ok(SessionPhase::Listening))
    }

    /// Places the local symbol at column `x`, row `y` and tells the server.
    ///
    /// The local board changes before the server confirms the move.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidArgument`] for coordinates outside the board
    /// - [`SessionError::Move`] if the board rejects the move
    /// - [`SessionError::WebSocketNotConnected`] if the packet cannot be sent
    #[instrument(skip(self))]
    pub fn make_move(&self, x: usize, y: usize) -> Result<(), SessionError> {
        let coord = FieldCoordinate::new(x, y)?;
        lock(&self.inner.game).make_move(coord, false)?;
        self.inner.notify_later(Notification::Refresh);
        self.send(ClientPacket::PlayerMakeMove(coord))
    }

    /// Asks to join the match with `code`.
    ///
    /// The code is remembered as pending until the server answers with a
    /// snapshot or rejects it.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidArgument`] for malformed codes
    /// - [`SessionError::WebSocketNotConnected`] if the packet cannot be sent
    #[instrument(skip(self))]
    pub fn submit_game_code(&self, code: &str) -> Result<(), SessionError> {
        let code = GameCode::parse(code)?;
        *lock(&self.inner.last_game_code_entered) = Some(code.clone());
        self.send(ClientPacket::CodeSubmit(code))
    }

    /// Asks the server for a full snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WebSocketNotConnected`] if not connected.
    #[instrument(skip(self))]
    pub fn request_current_status(&self) -> Result<(), SessionError> {
        self.send(ClientPacket::RequestCurrentStatus)
    }

    /// Asks the server to clear the board.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WebSocketNotConnected`] if not connected.
    #[instrument(skip(self))]
    pub fn reset_board(&self) -> Result<(), SessionError> {
        self.send(ClientPacket::BoardReset)
    }

    /// Asks the server to swap symbols.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WebSocketNotConnected`] if not connected.
    #[instrument(skip(self))]
    pub fn toggle_symbol(&self) -> Result<(), SessionError> {
        self.send(ClientPacket::ToggleSymbol)
    }

    /// Closes the connection without reporting the close as an error.
    #[instrument(skip(self))]
    pub async fn close_connection(&self) {
        let connection = self.inner.current_connection();
        connection.close_purposely().await;
        self.inner.mark_closed(&connection);
        info!("Connection closed on request");
    }

    /// Replaces the connection and the whole game state.
    ///
    /// The board, code, opponent and activity flags all start over.
    #[instrument(skip(self))]
    pub async fn restart_connection(&self) {
        info!("Restarting connection");
        self.inner.phase.send_replace(SessionPhase::Restarting);
        self.inner.current_connection().close_purposely().await;

        let connection = Arc::new(Connection::new((self.inner.factory)()));
        {
            let mut current = lock(&self.inner.connection);
            *current = Arc::clone(&connection);
            *lock(&self.inner.game) = GameState::new();
            *lock(&self.inner.last_game_code_entered) = None;
        }
        Inner::start(&self.inner, connection);
    }

    fn send(&self, packet: ClientPacket) -> Result<(), SessionError> {
        let frame = packet.encode()?;
        self.inner.current_connection().transport.send(frame)?;
        debug!(packet_type = %packet.packet_type(), "Sent packet");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase())
            .field("game", &self.game())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn current_connection(&self) -> Arc<Connection> {
        Arc::clone(&lock(&self.connection))
    }

    fn is_current(&self, connection: &Arc<Connection>) -> bool {
        Arc::ptr_eq(&lock(&self.connection), connection)
    }

    /// Spawns the connect task and the decode loop for `connection`.
    fn start(inner: &Arc<Self>, connection: Arc<Connection>) {
        inner.phase.send_replace(SessionPhase::Connecting);
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);

        inner
            .runtime
            .spawn(Self::listen(Arc::clone(inner), Arc::clone(&connection), inbound_rx));

        let task_inner = Arc::clone(inner);
        inner.runtime.spawn(async move {
            match connection.transport.connect(inbound_tx).await {
                Ok(()) => {
                    if task_inner.is_current(&connection) {
                        task_inner.phase.send_if_modified(|phase| {
                            let connecting = *phase == SessionPhase::Connecting;
                            if connecting {
                                *phase = SessionPhase::Listening;
                            }
                            connecting
                        });
                    }
                }
                Err(e) if connection.closed_purposely() => {
                    debug!(error = %e, "Connection closed on request before it was established");
                    task_inner.mark_closed(&connection);
                }
                Err(e) => {
                    error!(error = %e, "Error in WebSocket connection");
                    task_inner.mark_closed(&connection);
                    task_inner
                        .notify(Notification::Error(format!("WebSocket connection failed: {}", e)))
                        .await;
                }
            }
        });
    }

    /// Decodes frames of one connection until it closes.
    async fn listen(
        inner: Arc<Self>,
        connection: Arc<Connection>,
        mut inbound: mpsc::Receiver<Inbound>,
    ) {
        debug!("Listening to incoming frames");
        while let Some(event) = inbound.recv().await {
            match event {
                Inbound::Frame(frame) => {
                    debug!(bytes = ?frame, "Received data from server");
                    match inner.dispatch_from(&connection, &frame) {
                        Some(notification) => inner.notify(notification).await,
                        None => debug!("Dropping frame from a replaced or closed connection"),
                    }
                }
                Inbound::Closed => {
                    inner.mark_closed(&connection);
                    if !connection.closed_purposely() {
                        warn!("Connection closed unexpectedly");
                        inner
                            .notify(Notification::Error(CONNECTION_CLOSED_MESSAGE.to_string()))
                            .await;
                    }
                    break;
                }
            }
        }
        debug!("Stopped listening");
    }

    fn mark_closed(&self, connection: &Arc<Connection>) {
        if !self.is_current(connection) {
            return;
        }
        self.phase.send_if_modified(|phase| match *phase {
            SessionPhase::Connecting | SessionPhase::Listening => {
                *phase = SessionPhase::Closed;
                true
            }
            SessionPhase::Closed | SessionPhase::Restarting => false,
        });
    }

    /// Dispatches a frame unless `connection` was closed or replaced.
    ///
    /// The connection lock is held throughout, so a restart cannot swap in a
    /// fresh game between the check and the update.
    fn dispatch_from(&self, connection: &Arc<Connection>, frame: &[u8]) -> Option<Notification> {
        let current = lock(&self.connection);
        if !Arc::ptr_eq(&current, connection) || connection.closed_purposely() {
            return None;
        }
        Some(self.dispatch(frame))
    }

    /// Decodes one frame and applies it, producing exactly one notification.
    fn dispatch(&self, frame: &[u8]) -> Notification {
        match ServerPacket::decode(frame) {
            Ok(packet) => self.apply(packet),
            Err(e) => {
                warn!(error = %e, "Could not decode server packet");
                Notification::Error(format!("Something went wrong: {}", e))
            }
        }
    }

    fn apply(&self, packet: ServerPacket) -> Notification {
        debug!(packet_type = %packet.packet_type(), "Applying server packet");
        match packet {
            ServerPacket::Welcome(code) => {
                info!(%code, "Received game code");
                lock(&self.game).set_game_code(Some(code.clone()));
                *lock(&self.last_game_code_entered) = Some(code);
                Notification::Refresh
            }
            ServerPacket::PacketInvalid => Notification::Error(PACKET_INVALID_MESSAGE.to_string()),
            ServerPacket::OpponentMakeMove(coord) => {
                match lock(&self.game).make_move(coord, true) {
                    Ok(()) => Notification::Refresh,
                    Err(e) => {
                        warn!(error = %e, %coord, "Opponent move rejected by local board");
                        Notification::Error(format!("Something went wrong: {}", e))
                    }
                }
            }
            ServerPacket::OpponentLeave => {
                info!("Opponent left");
                lock(&self.game).set_has_opponent(false);
                Notification::Refresh
            }
            ServerPacket::GameInfo(info) => {
                let code = lock(&self.last_game_code_entered).clone();
                let mut game = lock(&self.game);
                game.set_on_turn(info.on_turn);
                game.set_has_opponent(info.has_opponent);
                if info.game_active {
                    game.set_game_active(info.symbol);
                } else {
                    game.set_symbol(info.symbol);
                }
                game.set_game_code(code);
                game.update_board(info.cells);
                Notification::Refresh
            }
            ServerPacket::ActionInvalid => Notification::Error(ACTION_INVALID_MESSAGE.to_string()),
            ServerPacket::GameCodeInvalid => {
                let confirmed = lock(&self.game).game_code().cloned();
                *lock(&self.last_game_code_entered) = confirmed;
                Notification::Error(GAME_CODE_INVALID_MESSAGE.to_string())
            }
            ServerPacket::GameFull => Notification::Error(GAME_FULL_MESSAGE.to_string()),
        }
    }

    /// Hands a notification to the consumer, waiting until it is taken.
    async fn notify(&self, notification: Notification) {
        if self.notify_tx.send(notification).await.is_err() {
            debug!("Notification receiver dropped");
        }
    }

    /// Like [`Inner::notify`], for callers that cannot wait.
    fn notify_later(&self, notification: Notification) {
        let tx = self.notify_tx.clone();
        self.runtime.spawn(async move {
            if tx.send(notification).await.is_err() {
                debug!("Notification receiver dropped");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::GameInfo;
    use tictactoe_board::Symbol;

    fn inner() -> Arc<Inner> {
        let (notify_tx, _rx) = mpsc::channel(1);
        let (phase, _) = watch::channel(SessionPhase::Listening);
        let factory: TransportFactory =
            Box::new(|| Box::new(crate::transport::ChannelTransport::pair().0) as Box<dyn Transport>);
        let connection = Arc::new(Connection::new(factory()));
        Arc::new(Inner {
            factory,
            game: Mutex::new(GameState::new()),
            last_game_code_entered: Mutex::new(None),
            connection: Mutex::new(connection),
            phase,
            notify_tx,
            runtime: Handle::current(),
        })
    }

    #[tokio::test]
    async fn test_welcome_sets_code() {
        let inner = inner();
        let frame = [0u8; 4];
        assert_eq!(inner.dispatch(&frame), Notification::Refresh);
        assert_eq!(lock(&inner.game).game_code().map(GameCode::as_str), Some("AAAAA"));
    }

    #[tokio::test]
    async fn test_inactive_game_info_keeps_activity() {
        let inner = inner();
        lock(&inner.game).set_has_opponent(true);
        lock(&inner.game).set_game_active(Symbol::X);

        let info = GameInfo {
            symbol: Symbol::O,
            on_turn: false,
            has_opponent: true,
            game_active: false,
            cells: [None; 9],
        };
        assert_eq!(inner.apply(ServerPacket::GameInfo(info)), Notification::Refresh);

        let game = lock(&inner.game).clone();
        assert!(game.game_active());
        assert_eq!(game.symbol(), Some(Symbol::O));
    }

    #[tokio::test]
    async fn test_rejected_opponent_move_reports_error() {
        let inner = inner();
        let coord = FieldCoordinate::new(0, 0).unwrap();
        let notification = inner.apply(ServerPacket::OpponentMakeMove(coord));
        assert!(matches!(notification, Notification::Error(msg) if msg.contains("not active")));
    }

    #[tokio::test]
    async fn test_frames_from_replaced_connection_are_dropped() {
        let inner = inner();
        let (stale_transport, _peer) = crate::transport::ChannelTransport::pair();
        let stale = Arc::new(Connection::new(Box::new(stale_transport)));

        assert_eq!(inner.dispatch_from(&stale, &[0u8; 4]), None);
        assert_eq!(lock(&inner.game).game_code(), None);

        let current = inner.current_connection();
        assert_eq!(inner.dispatch_from(&current, &[0u8; 4]), Some(Notification::Refresh));
        assert!(lock(&inner.game).game_code().is_some());
    }

    #[tokio::test]
    async fn test_frames_after_requested_close_are_dropped() {
        let inner = inner();
        let current = inner.current_connection();
        current.closed_purposely.store(true, Ordering::SeqCst);

        assert_eq!(inner.dispatch_from(&current, &[0u8; 4]), None);
        assert_eq!(lock(&inner.game).game_code(), None);
    }

    #[tokio::test]
    async fn test_trailing_byte_reports_error() {
        let inner = inner();
        // ActionInvalid followed by a stray byte.
        let notification = inner.dispatch(&[0b1010_0000, 0x01]);
        assert!(matches!(notification, Notification::Error(msg) if msg.starts_with("Something went wrong")));
    }
}
