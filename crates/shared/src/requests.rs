//! Upload side-channel request bodies.
//!
//! Media never travels over the game socket; it is POSTed as JSON to the
//! upload endpoint and keyed by `media_type`.

use serde::{Deserialize, Serialize};

/// Submitted media, tagged by `media_type` with the payload in `media`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "media_type", content = "media", rename_all = "snake_case")]
pub enum Media {
    /// PNG data URL of the canvas
    Painting(String),
    /// Text of the option the player selected
    Answer(String),
    /// Free-text guess for the painting
    Variant(String),
    /// Ids of the answers the player liked
    Likes(Vec<i64>),
}

/// Discriminator of a [`Media`] value, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Painting,
    Answer,
    Variant,
    Likes,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Painting => "painting",
            MediaKind::Answer => "answer",
            MediaKind::Variant => "variant",
            MediaKind::Likes => "likes",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Media {
    pub fn kind(&self) -> MediaKind {
        match self {
            Media::Painting(_) => MediaKind::Painting,
            Media::Answer(_) => MediaKind::Answer,
            Media::Variant(_) => MediaKind::Variant,
            Media::Likes(_) => MediaKind::Likes,
        }
    }
}

/// JSON body of an upload POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(flatten)]
    pub media: Media,
    /// Game the media belongs to, when the server cannot infer it from the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
}

impl UploadRequest {
    pub fn new(media: Media) -> Self {
        Self {
            media,
            game_id: None,
        }
    }

    pub fn with_game_id(mut self, game_id: impl Into<String>) -> Self {
        self.game_id = Some(game_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_request_body_shape() {
        let body = UploadRequest::new(Media::Variant("a red dragon".into())).with_game_id("42");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"media_type": "variant", "media": "a red dragon", "game_id": "42"})
        );
    }

    #[test]
    fn test_likes_body_without_game_id() {
        let body = UploadRequest::new(Media::Likes(vec![3, 7]));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"media_type": "likes", "media": [3, 7]})
        );
        assert_eq!(body.media.kind(), MediaKind::Likes);
    }
}
