//! Tests for the WebSocket transport against a loopback server.

use futures_util::{SinkExt, StreamExt};
use remote_tictactoe::transport::{Inbound, Transport, WebSocketTransport};
use remote_tictactoe::{GameCode, Notification, Notifications, Session, SessionError, SessionPhase};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

type ServerSocket = WebSocketStream<TcpStream>;

/// Accepts WebSocket clients on a loopback port and hands each one over.
async fn serve() -> (String, mpsc::UnboundedReceiver<ServerSocket>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            if let Ok(socket) = accept_async(stream).await {
                if tx.send(socket).is_err() {
                    break;
                }
            }
        }
    });
    (url, rx)
}

fn websocket_session(url: String) -> (Session, Notifications) {
    Session::connect(move || Box::new(WebSocketTransport::new(&url)) as Box<dyn Transport>)
}

async fn next(notifications: &mut Notifications) -> Notification {
    timeout(Duration::from_secs(5), notifications.recv())
        .await
        .expect("timed out waiting for a notification")
        .expect("notification stream ended")
}

async fn next_message(socket: &mut ServerSocket) -> Message {
    timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("timed out waiting for a client message")
        .expect("client stream ended")
        .expect("client message failed")
}

async fn assert_silent(notifications: &mut Notifications) {
    let result = timeout(Duration::from_millis(200), notifications.recv()).await;
    assert!(result.is_err(), "unexpected notification: {:?}", result);
}

#[tokio::test]
async fn test_binary_frames_round_trip() {
    let (url, mut servers) = serve().await;
    let (session, mut notifications) = websocket_session(url);
    assert!(session.connected().await);
    let mut server = servers.recv().await.unwrap();

    // Text is not part of the protocol and must be skipped.
    server.send(Message::Text("hello".into())).await.unwrap();
    server.send(Message::Binary(vec![0u8, 0, 0, 0].into())).await.unwrap();

    assert_eq!(next(&mut notifications).await, Notification::Refresh);
    assert_eq!(session.game().game_code().map(GameCode::as_str), Some("AAAAA"));

    session.reset_board().unwrap();
    match next_message(&mut server).await {
        Message::Binary(data) => assert_eq!(data.to_vec(), vec![0b0110_0000]),
        other => panic!("expected a binary frame, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_close_reported_once() {
    let (url, mut servers) = serve().await;
    let (session, mut notifications) = websocket_session(url);
    assert!(session.connected().await);
    let mut server = servers.recv().await.unwrap();

    server.close(None).await.unwrap();

    assert_eq!(
        next(&mut notifications).await,
        Notification::Error("WebSocket connection failed: the connection has been closed.".to_string())
    );
    assert_silent(&mut notifications).await;
    assert_eq!(session.phase(), SessionPhase::Closed);
    assert!(matches!(
        session.toggle_symbol(),
        Err(SessionError::WebSocketNotConnected)
    ));
}

#[tokio::test]
async fn test_requested_close_reaches_server() {
    let (url, mut servers) = serve().await;
    let (session, mut notifications) = websocket_session(url);
    assert!(session.connected().await);
    let mut server = servers.recv().await.unwrap();

    session.close_connection().await;

    assert!(matches!(next_message(&mut server).await, Message::Close(_)));
    assert_silent(&mut notifications).await;
    assert!(matches!(
        session.reset_board(),
        Err(SessionError::WebSocketNotConnected)
    ));
}

#[tokio::test]
async fn test_close_while_connecting_blocks_sends() {
    let (url, mut servers) = serve().await;
    let (session, mut notifications) = websocket_session(url);

    session.close_connection().await;

    assert_silent(&mut notifications).await;
    assert_eq!(session.phase(), SessionPhase::Closed);
    assert!(matches!(
        session.reset_board(),
        Err(SessionError::WebSocketNotConnected)
    ));
    // No socket was left open on the server.
    let accepted = timeout(Duration::from_millis(200), servers.recv()).await;
    assert!(accepted.is_err(), "a client connection stayed open");
}

#[tokio::test]
async fn test_restart_while_connecting_leaves_one_socket() {
    let (url, mut servers) = serve().await;
    let (session, mut notifications) = websocket_session(url);

    session.restart_connection().await;
    assert!(session.connected().await);

    let mut server = servers.recv().await.unwrap();
    session.request_current_status().unwrap();
    match next_message(&mut server).await {
        Message::Binary(data) => assert_eq!(data.to_vec(), vec![0b0010_0000]),
        other => panic!("expected a binary frame, got {:?}", other),
    }
    assert_silent(&mut notifications).await;
    let extra = timeout(Duration::from_millis(200), servers.recv()).await;
    assert!(extra.is_err(), "the replaced connection reached the server");
}

#[tokio::test]
async fn test_close_after_handshake_on_transport() {
    let (url, mut servers) = serve().await;
    let transport = WebSocketTransport::new(&url);
    let (inbound_tx, mut inbound) = mpsc::channel(4);

    transport.connect(inbound_tx).await.unwrap();
    let mut server = servers.recv().await.unwrap();
    transport.close().await;

    assert!(transport.send(vec![0b0110_0000]).is_err());
    assert!(matches!(next_message(&mut server).await, Message::Close(_)));
    let event = timeout(Duration::from_secs(5), inbound.recv()).await.unwrap();
    assert_eq!(event, Some(Inbound::Closed));
}

#[tokio::test]
async fn test_unreachable_server_reports_failure() {
    // Bind and drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    let (session, mut notifications) = websocket_session(url);

    match next(&mut notifications).await {
        Notification::Error(message) => {
            assert!(message.starts_with("WebSocket connection failed: "), "{}", message)
        }
        Notification::Refresh => panic!("expected a connection error"),
    }
    assert!(!session.connected().await);
}
