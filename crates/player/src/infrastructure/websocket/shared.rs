//! Shared helpers for the game socket client.

use url::Url;

// Reconnection defaults
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocketUrlError {
    #[error("origin scheme `{0}` is not http or https")]
    UnsupportedScheme(String),

    #[error("origin has no host")]
    MissingHost,

    #[error("game id must not be empty")]
    EmptyGameId,
}

/// Derive the game socket URL from the page origin.
///
/// `http` maps to `ws` and `https` to `wss`; the path is
/// `/ws/game/<game_id>/`.
pub fn game_socket_url(origin: &Url, game_id: &str) -> Result<Url, SocketUrlError> {
    let scheme = match origin.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(SocketUrlError::UnsupportedScheme(other.to_string())),
    };
    let host = origin.host_str().ok_or(SocketUrlError::MissingHost)?;
    if game_id.trim().is_empty() {
        return Err(SocketUrlError::EmptyGameId);
    }

    let authority = match origin.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Url::parse(&format!("{scheme}://{authority}/ws/game/{game_id}/"))
        .map_err(|_| SocketUrlError::MissingHost)
}
