//! Session command service for control envelopes and media submissions.
//!
//! Controls go out on the game socket through the `CommandBus`. Media go
//! through the upload side channel, and each upload reports back to the
//! session as an event.

use std::sync::Arc;

use drawesome_shared::{Media, MediaKind, UploadRequest};
use tokio::sync::mpsc;

use crate::application::controls::Control;
use crate::application::session::SessionEvent;
use crate::infrastructure::messaging::{CommandBus, SendError};
use crate::ports::outbound::MediaUploadPort;

/// Shortest free-text answer a player may submit by hand.
pub const DEFAULT_MIN_VARIANT_LEN: usize = 6;

/// What triggered a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOrigin {
    /// Explicit player action
    User,
    /// The countdown reached zero
    Timeout,
}

/// Application service for sending session commands.
#[derive(Clone)]
pub struct SessionCommandService {
    commands: CommandBus,
    uploads: Arc<dyn MediaUploadPort>,
    events: mpsc::UnboundedSender<SessionEvent>,
    game_id: Option<String>,
    min_variant_len: usize,
}

impl SessionCommandService {
    pub fn new(
        commands: CommandBus,
        uploads: Arc<dyn MediaUploadPort>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            commands,
            uploads,
            events,
            game_id: None,
            min_variant_len: DEFAULT_MIN_VARIANT_LEN,
        }
    }

    /// Attach the game id to every upload.
    pub fn with_game_id(mut self, game_id: impl Into<String>) -> Self {
        self.game_id = Some(game_id.into());
        self
    }

    pub fn with_min_variant_len(mut self, min_variant_len: usize) -> Self {
        self.min_variant_len = min_variant_len;
        self
    }

    pub fn min_variant_len(&self) -> usize {
        self.min_variant_len
    }

    pub fn send_control(&self, control: Control) -> Result<(), SendError> {
        self.commands.send(control.message())
    }

    pub fn submit_painting(&self, data_url: String, origin: SubmitOrigin) {
        self.submit(Media::Painting(data_url), origin);
    }

    pub fn submit_answer(&self, text: String) {
        self.submit(Media::Answer(text), SubmitOrigin::User);
    }

    /// Submit a free-text answer. Returns whether an upload was started.
    ///
    /// Manual submissions shorter than the minimum length are not sent; a
    /// timeout submission always goes out.
    pub fn submit_variant(&self, text: String, origin: SubmitOrigin) -> bool {
        if origin == SubmitOrigin::User && text.chars().count() < self.min_variant_len {
            tracing::debug!(
                len = text.chars().count(),
                min = self.min_variant_len,
                "Answer too short, not submitting"
            );
            return false;
        }
        self.submit(Media::Variant(text), origin);
        true
    }

    /// Submit liked answer ids. Returns whether an upload was started.
    pub fn submit_likes(&self, likes: Vec<i64>) -> bool {
        if likes.is_empty() {
            return false;
        }
        self.submit(Media::Likes(likes), SubmitOrigin::User);
        true
    }

    fn submit(&self, media: Media, origin: SubmitOrigin) {
        let kind: MediaKind = media.kind();
        let mut request = UploadRequest::new(media);
        if let Some(game_id) = &self.game_id {
            request = request.with_game_id(game_id.clone());
        }

        let uploads = Arc::clone(&self.uploads);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = uploads.upload(request).await;
            if let Err(e) = &result {
                tracing::warn!(media_type = %kind, ?origin, error = %e, "Upload failed");
            }
            let _ = events.send(SessionEvent::UploadFinished {
                kind,
                origin,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{MockMediaUploadPort, UploadError};
    use drawesome_shared::{ClientMessage, UploadResponse};

    struct Harness {
        service: SessionCommandService,
        commands: mpsc::Receiver<ClientMessage>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    }

    fn harness(uploads: MockMediaUploadPort) -> Harness {
        let (cmd_tx, commands) = mpsc::channel(8);
        let (event_tx, events) = mpsc::unbounded_channel();
        let service =
            SessionCommandService::new(CommandBus::new(cmd_tx), Arc::new(uploads), event_tx)
                .with_game_id("7");
        Harness {
            service,
            commands,
            events,
        }
    }

    #[tokio::test]
    async fn test_control_goes_out_on_the_bus() {
        let mut h = harness(MockMediaUploadPort::new());
        h.service.send_control(Control::Start).unwrap();
        assert_eq!(h.commands.recv().await, Some(ClientMessage::Start));
    }

    #[tokio::test]
    async fn test_short_variant_from_user_is_not_transmitted() {
        let mut uploads = MockMediaUploadPort::new();
        uploads.expect_upload().never();
        let h = harness(uploads);

        assert!(!h.service.submit_variant("cat".into(), SubmitOrigin::User));
    }

    #[tokio::test]
    async fn test_short_variant_on_timeout_is_transmitted() {
        let mut uploads = MockMediaUploadPort::new();
        uploads
            .expect_upload()
            .withf(|request| {
                request.media == Media::Variant("cat".into())
                    && request.game_id.as_deref() == Some("7")
            })
            .times(1)
            .returning(|_| Ok(UploadResponse::success()));
        let mut h = harness(uploads);

        let accepted = h.service.submit_variant("cat".into(), SubmitOrigin::Timeout);
        assert!(accepted);

        let Some(SessionEvent::UploadFinished {
            kind,
            origin,
            result,
        }) = h.events.recv().await
        else {
            panic!("expected an upload result");
        };
        assert_eq!(kind, MediaKind::Variant);
        assert_eq!(origin, SubmitOrigin::Timeout);
        assert!(result.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_length_counts_characters() {
        let mut uploads = MockMediaUploadPort::new();
        uploads
            .expect_upload()
            .times(1)
            .returning(|_| Ok(UploadResponse::success()));
        let mut h = harness(uploads);

        // Six characters, twelve bytes
        let accepted = h.service.submit_variant("котики".into(), SubmitOrigin::User);
        assert!(accepted);
        assert!(h.events.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_empty_likes_are_not_submitted() {
        let mut uploads = MockMediaUploadPort::new();
        uploads.expect_upload().never();
        let h = harness(uploads);
        assert!(!h.service.submit_likes(Vec::new()));
    }

    #[tokio::test]
    async fn test_upload_failure_is_reported() {
        let mut uploads = MockMediaUploadPort::new();
        uploads
            .expect_upload()
            .returning(|_| Err(UploadError::HttpStatus { status: 502 }));
        let mut h = harness(uploads);

        h.service.submit_painting("data:image/png;base64,AAAA".into(), SubmitOrigin::Timeout);

        let Some(SessionEvent::UploadFinished { kind, result, .. }) = h.events.recv().await else {
            panic!("expected an upload result");
        };
        assert_eq!(kind, MediaKind::Painting);
        assert!(matches!(
            result,
            Err(UploadError::HttpStatus { status: 502 })
        ));
    }
}
