//! Game socket client using tokio-tungstenite

use std::sync::atomic::AtomicU8;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use drawesome_shared::ClientMessage;

use super::core::{ReconnectPolicy, ReconnectState};
use crate::infrastructure::messaging::{set_connection_state, ConnectionEvent, ConnectionState};

/// How one transport ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportOutcome {
    /// Error, close frame, or a failed open; eligible for reconnection
    Closed,
    /// The command bus was dropped; the session is gone
    CommandsClosed,
}

/// Owns the game socket for one session.
///
/// Exactly one transport is live at a time. Every (re)connection builds a new
/// socket, sends the `connected` handshake, and starts a new epoch.
pub struct SessionClient {
    url: Url,
    reconnect: ReconnectState,
    state: Arc<AtomicU8>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    epoch: u64,
}

impl SessionClient {
    pub fn new(
        url: Url,
        policy: ReconnectPolicy,
        state: Arc<AtomicU8>,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Self {
        Self {
            url,
            reconnect: ReconnectState::new(policy),
            state,
            events,
            epoch: 0,
        }
    }

    fn set_state(&self, new_state: ConnectionState) {
        set_connection_state(&self.state, new_state);
        let _ = self.events.send(ConnectionEvent::StateChanged {
            epoch: self.epoch,
            state: new_state,
            attempt: self.reconnect.attempt_count(),
        });
    }

    /// Drive connections until the retry budget is spent, the handle asks for
    /// a disconnect, or the command bus is dropped.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<ClientMessage>,
        mut disconnect: oneshot::Receiver<()>,
    ) {
        loop {
            self.epoch += 1;

            let outcome = tokio::select! {
                _ = &mut disconnect => {
                    tracing::info!(epoch = self.epoch, "Disconnect requested");
                    self.set_state(ConnectionState::Disconnected);
                    return;
                }
                outcome = self.run_transport(&mut commands) => outcome,
            };

            if outcome == TransportOutcome::CommandsClosed {
                tracing::info!(epoch = self.epoch, "Command bus closed, stopping client");
                self.set_state(ConnectionState::Disconnected);
                return;
            }

            let Some(delay) = self.reconnect.on_close() else {
                tracing::error!(
                    attempts = self.reconnect.attempt_count(),
                    "Max reconnection attempts reached, giving up"
                );
                self.set_state(ConnectionState::Failed);
                return;
            };

            tracing::info!(
                attempt = self.reconnect.attempt_count(),
                max_attempts = self.reconnect.policy().max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Connection lost, scheduling reconnect"
            );
            self.set_state(ConnectionState::Reconnecting);

            // Wait out the delay. Commands issued meanwhile have no live socket
            // to go to and are dropped.
            let deadline = Instant::now() + delay;
            loop {
                tokio::select! {
                    _ = &mut disconnect => {
                        tracing::info!("Reconnection cancelled - intentional disconnect");
                        self.set_state(ConnectionState::Disconnected);
                        return;
                    }
                    _ = tokio::time::sleep_until(deadline) => break,
                    command = commands.recv() => match command {
                        Some(message) => tracing::warn!(
                            command = message.command(),
                            "Dropping command while disconnected"
                        ),
                        None => {
                            self.set_state(ConnectionState::Disconnected);
                            return;
                        }
                    },
                }
            }
        }
    }

    /// Open one socket and pump it until it dies.
    async fn run_transport(
        &mut self,
        commands: &mut mpsc::Receiver<ClientMessage>,
    ) -> TransportOutcome {
        self.set_state(ConnectionState::Connecting);

        let ws_stream = match connect_async(self.url.as_str()).await {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Failed to open game socket");
                return TransportOutcome::Closed;
            }
        };

        tracing::info!(url = %self.url, epoch = self.epoch, "Connected to game server");
        self.reconnect.on_open();
        self.set_state(ConnectionState::Connected);

        let (mut write, mut read) = ws_stream.split();

        if let Err(e) = write.send(encode(ClientMessage::Connected)).await {
            tracing::warn!(error = %e, "Failed to send connected handshake");
            return TransportOutcome::Closed;
        }

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        let _ = self.events.send(ConnectionEvent::Frame {
                            epoch: self.epoch,
                            text: text.to_string(),
                        });
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(epoch = self.epoch, "Server closed connection");
                        return TransportOutcome::Closed;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(epoch = self.epoch, error = %e, "WebSocket error");
                        return TransportOutcome::Closed;
                    }
                },
                command = commands.recv() => match command {
                    Some(message) => {
                        tracing::debug!(command = message.command(), "Sending command");
                        if let Err(e) = write.send(encode(message)).await {
                            tracing::warn!(error = %e, "Failed to send command");
                            return TransportOutcome::Closed;
                        }
                    }
                    None => {
                        let _ = write.close().await;
                        return TransportOutcome::CommandsClosed;
                    }
                },
            }
        }
    }
}

fn encode(message: ClientMessage) -> Message {
    // A fieldless tagged enum always serializes
    let json = serde_json::to_string(&message)
        .unwrap_or_else(|_| format!(r#"{{"command":"{}"}}"#, message.command()));
    Message::Text(json)
}
