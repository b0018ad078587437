//! Upload Port - request/response side channel for media.

use async_trait::async_trait;
use drawesome_shared::{UploadRequest, UploadResponse};

/// Transport-level upload failures. A reachable server that rejects the media
/// answers with `UploadResponse { status: error, .. }` instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UploadError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("upload request failed: {0}")]
    RequestFailed(String),

    #[error("upload endpoint returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("upload response could not be parsed: {0}")]
    InvalidResponse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaUploadPort: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> Result<UploadResponse, UploadError>;
}
