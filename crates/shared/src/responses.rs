//! Upload side-channel response bodies.

use serde::{Deserialize, Serialize};

/// Outcome reported by the upload endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Success,
    Error,
    /// Unknown status for forward compatibility
    #[serde(other)]
    Unknown,
}

/// JSON body returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: UploadStatus,
    /// Human-readable reason, shown next to the input on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadResponse {
    pub fn success() -> Self {
        Self {
            status: UploadStatus::Success,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: UploadStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UploadStatus::Success
    }
}
