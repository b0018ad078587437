//! Drawesome Protocol - Shared types for the game server and player clients
//!
//! This crate contains all types exchanged between the server and a player:
//! - WebSocket command envelopes (`ClientMessage`, `ServerMessage`)
//! - Upload side-channel request/response bodies
//! - Shared enums and value objects (screens, stages, tasks)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, and thiserror
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Forward compatible** - Unknown commands and statuses decode to a catch-all

pub mod messages;
pub mod requests;
pub mod responses;
pub mod types;

// =============================================================================
// WebSocket Message Types
// =============================================================================
pub use messages::{ClientMessage, ServerMessage, TimerUpdate, UpdatePayload};

// =============================================================================
// Upload Side Channel
// =============================================================================
pub use requests::{Media, MediaKind, UploadRequest};
pub use responses::{UploadResponse, UploadStatus};

// =============================================================================
// Vocabulary Types
// =============================================================================
pub use types::{
    AnswerReveal, GameStage, PlayerRef, PlayerStatus, ProtocolError, ResultEntry, ScreenId,
    SelectingTask, Standing, Task, TaskType,
};
