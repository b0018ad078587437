//! Connection lifecycle management.
//!
//! This module provides types for observing the game socket lifecycle and
//! requesting an intentional disconnect.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;

/// Connection state for the game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to the server
    Disconnected,
    /// Attempting to open a socket
    Connecting,
    /// Socket open and `connected` handshake sent
    Connected,
    /// Connection lost, a reconnect attempt is scheduled
    Reconnecting,
    /// Retry budget exhausted; no further attempts
    Failed,
}

impl ConnectionState {
    /// Convert to u8 for atomic storage.
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Reconnecting => 3,
            ConnectionState::Failed => 4,
        }
    }

    /// Convert from u8 (atomic storage).
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Reconnecting,
            4 => ConnectionState::Failed,
            _ => ConnectionState::Disconnected,
        }
    }

    /// Whether the client will never try to connect again.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Failed)
    }
}

/// What the transport reports to the session.
///
/// Every event carries the epoch of the socket that produced it. A new epoch
/// starts with each connection attempt, so the session can tell a live socket
/// from one that has already been replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    StateChanged {
        epoch: u64,
        state: ConnectionState,
        /// Closes counted since the last successful open
        attempt: u32,
    },
    Frame {
        epoch: u64,
        text: String,
    },
}

/// Handle to manage connection lifecycle.
///
/// This is returned when creating a connection and allows:
/// - Querying connection state
/// - Requesting disconnect
///
/// Dropping the handle closes the connection the same way `disconnect()` does,
/// so the owner must keep it alive for as long as the session runs.
pub struct ConnectionHandle {
    state: Arc<AtomicU8>,
    disconnect_tx: Option<oneshot::Sender<()>>,
}

impl ConnectionHandle {
    pub fn new(state: Arc<AtomicU8>, disconnect_tx: oneshot::Sender<()>) -> Self {
        Self {
            state,
            disconnect_tx: Some(disconnect_tx),
        }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Request an intentional disconnect. No reconnection follows.
    ///
    /// The socket may not close immediately - check `state()` to verify.
    pub fn disconnect(mut self) {
        if let Some(tx) = self.disconnect_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Get a clone of the state Arc for sharing with observers.
    pub fn state_arc(&self) -> Arc<AtomicU8> {
        Arc::clone(&self.state)
    }
}

/// Read-only view of the connection state.
///
/// Multiple observers can share the same underlying state without owning the
/// `ConnectionHandle`.
#[derive(Clone)]
pub struct ConnectionStateObserver {
    state: Arc<AtomicU8>,
}

impl ConnectionStateObserver {
    pub fn from_handle(handle: &ConnectionHandle) -> Self {
        Self {
            state: handle.state_arc(),
        }
    }

    pub fn new(state: Arc<AtomicU8>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// Internal helper to update connection state (used by the client).
pub fn set_connection_state(state_ref: &AtomicU8, new_state: ConnectionState) {
    state_ref.store(new_state.to_u8(), Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_roundtrip() {
        let states = [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Reconnecting,
            ConnectionState::Failed,
        ];

        for state in states {
            assert_eq!(ConnectionState::from_u8(state.to_u8()), state);
        }
        assert!(ConnectionState::Failed.is_terminal());
        assert!(!ConnectionState::Reconnecting.is_terminal());
    }

    #[test]
    fn test_observer_follows_handle() {
        let state = Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8()));
        let (tx, _rx) = oneshot::channel();
        let handle = ConnectionHandle::new(Arc::clone(&state), tx);
        let observer = ConnectionStateObserver::from_handle(&handle);

        assert!(!observer.is_connected());
        set_connection_state(&state, ConnectionState::Connected);
        assert!(observer.is_connected());
        assert!(handle.is_connected());
    }

    #[test]
    fn test_disconnect_signals_client() {
        let state = Arc::new(AtomicU8::new(ConnectionState::Connected.to_u8()));
        let (tx, mut rx) = oneshot::channel();
        ConnectionHandle::new(state, tx).disconnect();
        assert_eq!(rx.try_recv(), Ok(()));
    }
}
