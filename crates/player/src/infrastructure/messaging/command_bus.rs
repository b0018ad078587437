//! Command Bus for sending control envelopes to the game server.
//!
//! Commands are queued on a bounded channel drained by the socket client.
//! Sending is fire-and-forget: the server answers, if at all, with a later
//! `state` / `init_stage` / `error` command.

use drawesome_shared::ClientMessage;
use tokio::sync::mpsc;

/// Queue depth between the session and the socket writer.
pub const COMMAND_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("command queue is full, dropped `{0}`")]
    QueueFull(&'static str),

    #[error("connection is closed, dropped `{0}`")]
    Closed(&'static str),
}

/// Command bus for sending messages to the game server.
///
/// This is a concrete struct (not a trait) that can be cloned and shared.
/// Services depend on this directly rather than through a trait object.
#[derive(Clone)]
pub struct CommandBus {
    tx: mpsc::Sender<ClientMessage>,
}

impl CommandBus {
    pub fn new(tx: mpsc::Sender<ClientMessage>) -> Self {
        Self { tx }
    }

    /// Queue a fire-and-forget command. Never waits.
    pub fn send(&self, message: ClientMessage) -> Result<(), SendError> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(m) => SendError::QueueFull(m.command()),
            mpsc::error::TrySendError::Closed(m) => SendError::Closed(m.command()),
        })
    }

    /// Whether the socket client has stopped draining the queue.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_command() {
        let (tx, mut rx) = mpsc::channel(10);
        let bus = CommandBus::new(tx);

        bus.send(ClientMessage::Pause).unwrap();

        assert_eq!(rx.recv().await, Some(ClientMessage::Pause));
    }

    #[test]
    fn test_full_and_closed_queues() {
        let (tx, rx) = mpsc::channel(1);
        let bus = CommandBus::new(tx);

        bus.send(ClientMessage::Start).unwrap();
        assert_eq!(
            bus.send(ClientMessage::Cancel),
            Err(SendError::QueueFull("cancel"))
        );

        drop(rx);
        assert!(bus.is_closed());
        assert_eq!(
            bus.send(ClientMessage::Resume),
            Err(SendError::Closed("resume"))
        );
    }
}
