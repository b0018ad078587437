//! Shared vocabulary types used inside the command envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Screens and Stages
// =============================================================================

/// One of the mutually exclusive game screens a client can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenId {
    Status,
    Task,
    Results,
    Answers,
    FinalStandings,
}

impl ScreenId {
    /// Every screen, in display order.
    pub const ALL: [ScreenId; 5] = [
        ScreenId::Status,
        ScreenId::Task,
        ScreenId::Results,
        ScreenId::Answers,
        ScreenId::FinalStandings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScreenId::Status => "status",
            ScreenId::Task => "task",
            ScreenId::Results => "results",
            ScreenId::Answers => "answers",
            ScreenId::FinalStandings => "final_standings",
        }
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side game stage, reported to the host on `state` / `init_stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStage {
    Pregame,
    Preround,
    Round,
    Finished,
    /// Unknown stage for forward compatibility
    #[serde(other)]
    Unknown,
}

/// Kind of task a player is asked to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Drawing,
    Writing,
    Selecting,
}

// =============================================================================
// Players
// =============================================================================

/// A player as shown on the answer card (author or selector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Per-player progress shown on the status screen, keyed by nickname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatus {
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub finished: bool,
}

/// One answer revealed on the answers screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerReveal {
    pub text: String,
    pub author: PlayerRef,
    /// Players who picked this answer, in the order they are revealed
    #[serde(default)]
    pub selected_by: Vec<PlayerRef>,
}

/// One row of the per-round results list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    #[serde(rename = "player__nickname")]
    pub nickname: String,
    #[serde(rename = "player__drawing_color", default)]
    pub drawing_color: Option<String>,
    pub result: i64,
    #[serde(default)]
    pub round_increment: i64,
}

/// One row of the final standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    #[serde(rename = "player__nickname")]
    pub nickname: String,
    #[serde(rename = "player__avatar", default)]
    pub avatar: Option<String>,
    #[serde(rename = "player__drawing_color", default)]
    pub drawing_color: Option<String>,
    pub result: i64,
    #[serde(default)]
    pub likes_cnt: i64,
}

// =============================================================================
// Tasks
// =============================================================================

/// Payload of a selecting task: the painting and the answers to choose from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectingTask {
    pub painting: String,
    pub variants: Vec<String>,
}

/// The task a player must complete, replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Draw the given prompt
    Drawing { prompt: String },
    /// Guess what the painting shows
    Writing { painting: String },
    /// Pick the correct answer for the painting
    Selecting(SelectingTask),
}

impl Task {
    /// Build a task from the sibling `task_type` / `task` fields of an update.
    pub fn from_parts(task_type: TaskType, raw: Option<Value>) -> Result<Self, ProtocolError> {
        let raw = raw.ok_or(ProtocolError::MissingTask(task_type))?;
        let invalid = |source| ProtocolError::InvalidTask { task_type, source };
        Ok(match task_type {
            TaskType::Drawing => Task::Drawing {
                prompt: serde_json::from_value(raw).map_err(invalid)?,
            },
            TaskType::Writing => Task::Writing {
                painting: serde_json::from_value(raw).map_err(invalid)?,
            },
            TaskType::Selecting => Task::Selecting(serde_json::from_value(raw).map_err(invalid)?),
        })
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            Task::Drawing { .. } => TaskType::Drawing,
            Task::Writing { .. } => TaskType::Writing,
            Task::Selecting(_) => TaskType::Selecting,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// A well-formed envelope whose payload does not fit the command.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("update for the {0} screen is missing a required field: {1}")]
    MissingField(ScreenId, &'static str),

    #[error("{0:?} task has no payload")]
    MissingTask(TaskType),

    #[error("{task_type:?} task payload has the wrong shape: {source}")]
    InvalidTask {
        task_type: TaskType,
        #[source]
        source: serde_json::Error,
    },
}
