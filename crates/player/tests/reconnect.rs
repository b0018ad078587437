//! Socket client against a local tokio-tungstenite server: handshake on every
//! open, reconnection after a server-side close, and giving up once the retry
//! budget is spent.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage, WebSocketStream};
use url::Url;

use drawesome_player::infrastructure::messaging::{ConnectionEvent, ConnectionState};
use drawesome_player::infrastructure::websocket::{create_connection, ReconnectPolicy};
use drawesome_shared::ClientMessage;

const WAIT: Duration = Duration::from_secs(5);

fn policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy {
        max_attempts,
        backoff: Duration::from_millis(50),
    }
}

fn socket_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("ws://{addr}/ws/game/1/")).expect("socket url")
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = tokio::time::timeout(WAIT, listener.accept())
        .await
        .expect("client did not connect")
        .expect("accept tcp connection");
    accept_async(stream).await.expect("websocket handshake")
}

async fn recv_client(ws: &mut WebSocketStream<TcpStream>) -> ClientMessage {
    loop {
        let msg = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("no frame from client")
            .expect("client closed the socket")
            .expect("websocket error");
        if let WsMessage::Text(text) = msg {
            return serde_json::from_str(&text).expect("client sent an unknown command");
        }
    }
}

/// Wait for the next state change, skipping frames.
async fn next_state(
    events: &mut mpsc::UnboundedReceiver<ConnectionEvent>,
) -> (u64, ConnectionState) {
    loop {
        let event = tokio::time::timeout(WAIT, events.recv())
            .await
            .expect("no connection event")
            .expect("client stopped");
        if let ConnectionEvent::StateChanged { epoch, state, .. } = event {
            return (epoch, state);
        }
    }
}

#[tokio::test]
async fn handshake_then_frames_and_commands_flow() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut connection = create_connection(socket_url(listener.local_addr().unwrap()), policy(1));

    let mut server = accept(&listener).await;
    assert_eq!(recv_client(&mut server).await, ClientMessage::Connected);
    assert_eq!(
        next_state(&mut connection.events).await,
        (1, ConnectionState::Connecting)
    );
    assert_eq!(
        next_state(&mut connection.events).await,
        (1, ConnectionState::Connected)
    );
    assert!(connection.state_observer.is_connected());

    server
        .send(WsMessage::Text(r#"{"command":"resume"}"#.into()))
        .await
        .unwrap();
    let frame = tokio::time::timeout(WAIT, connection.events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        frame,
        ConnectionEvent::Frame {
            epoch: 1,
            text: r#"{"command":"resume"}"#.into(),
        }
    );

    connection.command_bus.send(ClientMessage::Pause).unwrap();
    assert_eq!(recv_client(&mut server).await, ClientMessage::Pause);
}

#[tokio::test]
async fn reconnect_sends_a_fresh_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut connection = create_connection(socket_url(listener.local_addr().unwrap()), policy(3));

    let mut first = accept(&listener).await;
    assert_eq!(recv_client(&mut first).await, ClientMessage::Connected);
    first.close(None).await.unwrap();
    drop(first);

    let mut second = accept(&listener).await;
    assert_eq!(recv_client(&mut second).await, ClientMessage::Connected);

    let mut states = Vec::new();
    while states.last() != Some(&(2, ConnectionState::Connected)) {
        states.push(next_state(&mut connection.events).await);
    }
    assert_eq!(
        states,
        vec![
            (1, ConnectionState::Connecting),
            (1, ConnectionState::Connected),
            (1, ConnectionState::Reconnecting),
            (2, ConnectionState::Connecting),
            (2, ConnectionState::Connected),
        ]
    );
}

#[tokio::test]
async fn gives_up_after_budget_when_server_is_gone() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut connection = create_connection(socket_url(addr), policy(2));

    let server = accept(&listener).await;
    drop(listener);
    drop(server);

    let mut reconnecting = 0;
    loop {
        let (_, state) = next_state(&mut connection.events).await;
        match state {
            ConnectionState::Reconnecting => reconnecting += 1,
            ConnectionState::Failed => break,
            _ => {}
        }
    }
    assert_eq!(reconnecting, 2);
    assert_eq!(connection.handle.state(), ConnectionState::Failed);

    // The client task is gone: no more events and the bus is closed
    assert!(tokio::time::timeout(WAIT, connection.events.recv())
        .await
        .unwrap()
        .is_none());
    assert!(connection.command_bus.is_closed());
}

#[tokio::test]
async fn intentional_disconnect_does_not_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut connection = create_connection(socket_url(listener.local_addr().unwrap()), policy(5));

    let mut server = accept(&listener).await;
    assert_eq!(recv_client(&mut server).await, ClientMessage::Connected);
    assert_eq!(
        next_state(&mut connection.events).await,
        (1, ConnectionState::Connecting)
    );
    assert_eq!(
        next_state(&mut connection.events).await,
        (1, ConnectionState::Connected)
    );

    connection.handle.disconnect();

    assert_eq!(
        next_state(&mut connection.events).await,
        (1, ConnectionState::Disconnected)
    );
    assert!(
        tokio::time::timeout(Duration::from_millis(300), listener.accept())
            .await
            .is_err(),
        "client reconnected after an intentional disconnect"
    );
}
