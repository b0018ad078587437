//! WebSocket message types for server-player communication
//!
//! Every frame on the game socket is a JSON object tagged by its `command`
//! field. There is no sequence number or timestamp: ordering is the arrival
//! order on the socket.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Unknown inbound commands deserialize to `ServerMessage::Unknown`
//! - Renaming a command is a breaking change

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    AnswerReveal, GameStage, PlayerStatus, ProtocolError, ResultEntry, ScreenId, Standing, Task,
    TaskType,
};

// =============================================================================
// Client Messages (Player → Server)
// =============================================================================

/// Messages from a player (or host) to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Handshake sent on every successful open; the server answers with current state
    Connected,
    /// Host starts the game
    Start,
    /// Host pauses the game
    Pause,
    /// Host resumes a paused game
    Resume,
    /// Host cancels the game
    Cancel,
    /// Host restarts a finished game
    Restart,
}

impl ClientMessage {
    pub fn command(&self) -> &'static str {
        match self {
            ClientMessage::Connected => "connected",
            ClientMessage::Start => "start",
            ClientMessage::Pause => "pause",
            ClientMessage::Resume => "resume",
            ClientMessage::Cancel => "cancel",
            ClientMessage::Restart => "restart",
        }
    }
}

// =============================================================================
// Server Messages (Server → Player)
// =============================================================================

/// Messages from the server to a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Re-render the screen named by `active_screen`
    Update(UpdatePayload),
    /// Reveal one answer on the answers screen
    DisplayAnswer {
        variant: AnswerReveal,
        #[serde(default)]
        is_correct: bool,
    },
    /// Game paused, optionally with a reason
    Pause {
        #[serde(default)]
        text: Option<String>,
    },
    /// Game resumed
    Resume,
    /// Game cancelled, optionally with a reason
    Cancel {
        #[serde(default)]
        text: Option<String>,
    },
    /// Host-only stage notification
    InitStage { stage: GameStage },
    /// Session state sent in reply to `connected`
    State {
        #[serde(default)]
        stage: Option<GameStage>,
        #[serde(default)]
        game_code: Option<String>,
        #[serde(default)]
        is_paused: bool,
    },
    /// Countdown tick
    Timer(TimerUpdate),
    /// Server rejected a command
    Error {
        error_type: String,
        #[serde(default)]
        error_message: String,
    },
    /// Ask the client to submit its checked likes
    CollectLikes,
    /// Unknown command for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Command name for logging.
    pub fn command(&self) -> &'static str {
        match self {
            ServerMessage::Update(_) => "update",
            ServerMessage::DisplayAnswer { .. } => "display_answer",
            ServerMessage::Pause { .. } => "pause",
            ServerMessage::Resume => "resume",
            ServerMessage::Cancel { .. } => "cancel",
            ServerMessage::InitStage { .. } => "init_stage",
            ServerMessage::State { .. } => "state",
            ServerMessage::Timer(_) => "timer",
            ServerMessage::Error { .. } => "error",
            ServerMessage::CollectLikes => "collect_likes",
            ServerMessage::Unknown => "unknown",
        }
    }
}

/// Body of an `update` command. Which fields are present depends on
/// `active_screen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub active_screen: ScreenId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<BTreeMap<String, PlayerStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ResultEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standings: Option<Vec<Standing>>,
}

impl UpdatePayload {
    /// An update with only the target screen set.
    pub fn for_screen(active_screen: ScreenId) -> Self {
        Self {
            active_screen,
            players: None,
            task_type: None,
            task: None,
            results: None,
            variants: None,
            standings: None,
        }
    }

    /// Decode the task carried by a `task` screen update.
    pub fn decode_task(&self) -> Result<Task, ProtocolError> {
        let task_type = self
            .task_type
            .ok_or(ProtocolError::MissingField(self.active_screen, "task_type"))?;
        Task::from_parts(task_type, self.task.clone())
    }
}

/// Body of a `timer` command.
///
/// Current servers send `initial` and `left`; older ones send a single `time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

impl TimerUpdate {
    /// Seconds left, clamped at zero. `None` when the frame carries no value.
    pub fn remaining(&self) -> Option<u32> {
        self.left
            .or(self.time)
            .map(|secs| secs.clamp(0, i64::from(u32::MAX)) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_message_is_bare_command() {
        let json = serde_json::to_value(ClientMessage::Connected).unwrap();
        assert_eq!(json, json!({"command": "connected"}));
        let json = serde_json::to_value(ClientMessage::Restart).unwrap();
        assert_eq!(json, json!({"command": "restart"}));
    }

    #[test]
    fn test_update_task_screen() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "command": "update",
            "active_screen": "task",
            "task_type": "drawing",
            "task": "a castle"
        }))
        .unwrap();

        let ServerMessage::Update(update) = msg else {
            panic!("expected update");
        };
        assert_eq!(update.active_screen, ScreenId::Task);
        assert_eq!(
            update.decode_task().unwrap(),
            Task::Drawing {
                prompt: "a castle".into(),
            }
        );
    }

    #[test]
    fn test_update_status_players() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "command": "update",
            "active_screen": "status",
            "task_type": "writing",
            "players": {
                "bob": {"avatar": null, "finished": true},
                "ann": {"avatar": "/media/ann.png"}
            }
        }))
        .unwrap();

        let ServerMessage::Update(update) = msg else {
            panic!("expected update");
        };
        let players = update.players.unwrap();
        assert!(players["bob"].finished);
        assert!(!players["ann"].finished);
    }

    #[test]
    fn test_display_answer() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "command": "display_answer",
            "variant": {
                "text": "a dragon",
                "author": {"nickname": "ann"},
                "selected_by": [{"nickname": "bob", "avatar": "/media/bob.png"}]
            },
            "is_correct": true
        }))
        .unwrap();

        match msg {
            ServerMessage::DisplayAnswer {
                variant,
                is_correct,
            } => {
                assert!(is_correct);
                assert_eq!(variant.selected_by.len(), 1);
                assert_eq!(variant.author.avatar, None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_command_decodes_to_unknown() {
        let msg: ServerMessage =
            serde_json::from_value(json!({"command": "fireworks", "color": "red"})).unwrap();
        assert_eq!(msg, ServerMessage::Unknown);
    }

    #[test]
    fn test_resume_ignores_extra_fields() {
        let msg: ServerMessage =
            serde_json::from_value(json!({"command": "resume", "type": "game.resumed"})).unwrap();
        assert_eq!(msg, ServerMessage::Resume);
    }

    #[test]
    fn test_state_defaults() {
        let msg: ServerMessage = serde_json::from_value(json!({"command": "state"})).unwrap();
        assert_eq!(
            msg,
            ServerMessage::State {
                stage: None,
                game_code: None,
                is_paused: false,
            }
        );
    }

    #[test]
    fn test_timer_accepts_legacy_time() {
        let current: ServerMessage =
            serde_json::from_value(json!({"command": "timer", "initial": 40, "left": 12})).unwrap();
        let legacy: ServerMessage =
            serde_json::from_value(json!({"command": "timer", "time": -1})).unwrap();

        let ServerMessage::Timer(current) = current else {
            panic!("expected timer");
        };
        let ServerMessage::Timer(legacy) = legacy else {
            panic!("expected timer");
        };
        assert_eq!(current.remaining(), Some(12));
        assert_eq!(legacy.remaining(), Some(0));
        assert_eq!(TimerUpdate::default().remaining(), None);
    }
}
