//! WebSocket Bridge - wires the CommandBus and connection events to the
//! socket client.
//!
//! `create_connection` sets up:
//! - A CommandBus for sending control envelopes
//! - A stream of `ConnectionEvent`s for the session
//! - A background task running the `SessionClient`

use std::sync::atomic::AtomicU8;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use url::Url;

use drawesome_shared::ClientMessage;

use super::client::SessionClient;
use super::core::ReconnectPolicy;
use crate::infrastructure::messaging::{
    CommandBus, ConnectionEvent, ConnectionHandle, ConnectionState, ConnectionStateObserver,
    COMMAND_QUEUE_CAPACITY,
};

/// Result of creating a connection.
///
/// Contains all the pieces needed to use the connection:
/// - `command_bus`: Send commands to the server
/// - `events`: Frames and state changes, tagged with the socket epoch
/// - `handle`: Control connection lifecycle
/// - `state_observer`: Observe connection state
pub struct Connection {
    pub command_bus: CommandBus,
    pub events: mpsc::UnboundedReceiver<ConnectionEvent>,
    pub handle: ConnectionHandle,
    pub state_observer: ConnectionStateObserver,
}

/// Spawn the socket client for `url`. Must be called inside a tokio runtime.
pub fn create_connection(url: Url, policy: ReconnectPolicy) -> Connection {
    let (cmd_tx, cmd_rx) = mpsc::channel::<ClientMessage>(COMMAND_QUEUE_CAPACITY);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (disconnect_tx, disconnect_rx) = oneshot::channel::<()>();

    let state = Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8()));

    let command_bus = CommandBus::new(cmd_tx);
    let state_observer = ConnectionStateObserver::new(Arc::clone(&state));

    tracing::info!(
        url = %url,
        max_attempts = policy.max_attempts,
        backoff_ms = policy.backoff.as_millis() as u64,
        "Spawning game socket client"
    );
    let client = SessionClient::new(url, policy, Arc::clone(&state), event_tx);
    tokio::spawn(client.run(cmd_rx, disconnect_rx));

    let handle = ConnectionHandle::new(state, disconnect_tx);

    Connection {
        command_bus,
        events: event_rx,
        handle,
        state_observer,
    }
}
