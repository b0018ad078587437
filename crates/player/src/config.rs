//! Player configuration from the environment.
//!
//! Supported environment variables:
//! - DRAWESOME_ORIGIN: page origin the game is served from (default `http://localhost:8000`)
//! - DRAWESOME_GAME_ID: game to join (required)
//! - DRAWESOME_COOKIES: `name=value; ...` cookie string carrying `sessionid` and `csrftoken`
//! - DRAWESOME_RECONNECT_ATTEMPTS: reconnects after a close before giving up (default 5)
//! - DRAWESOME_RECONNECT_DELAY_MS: fixed delay between reconnects (default 2000)
//! - DRAWESOME_DISPLAY_SELECTED_MS: reveal stagger, must match the server (default 1000)
//! - DRAWESOME_WAIT_BEFORE_FLIP_MS: reveal settle, must match the server (default 3000)
//! - DRAWESOME_MIN_VARIANT_LEN: minimum answer length for manual submission (default 6)
//! - DRAWESOME_UPLOAD_TIMEOUT_MS: upload request timeout (default 10000)

use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::application::reveal::RevealTiming;
use crate::application::services::DEFAULT_MIN_VARIANT_LEN;
use crate::application::session::SessionSettings;
use crate::infrastructure::websocket::{game_socket_url, ReconnectPolicy, SocketUrlError};

pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";
pub const DEFAULT_UPLOAD_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("DRAWESOME_ORIGIN is not a valid URL: {0}")]
    InvalidOrigin(#[from] url::ParseError),

    #[error("cannot derive the game socket URL: {0}")]
    SocketUrl(#[from] SocketUrlError),
}

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub origin: Url,
    pub game_id: String,
    pub socket_url: Url,
    pub cookies: Option<String>,
    pub reconnect: ReconnectPolicy,
    pub reveal: RevealTiming,
    pub min_variant_len: usize,
    pub upload_timeout: Duration,
}

impl PlayerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin_raw = lookup("DRAWESOME_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let origin = Url::parse(&origin_raw)?;

        let game_id = lookup("DRAWESOME_GAME_ID")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::Missing("DRAWESOME_GAME_ID"))?;

        let socket_url = game_socket_url(&origin, &game_id)?;

        let defaults = ReconnectPolicy::default();
        let reconnect = ReconnectPolicy {
            max_attempts: parsed(&lookup, "DRAWESOME_RECONNECT_ATTEMPTS")
                .unwrap_or(defaults.max_attempts),
            backoff: millis(&lookup, "DRAWESOME_RECONNECT_DELAY_MS").unwrap_or(defaults.backoff),
        };

        let timing = RevealTiming::default();
        let reveal = RevealTiming {
            stagger: millis(&lookup, "DRAWESOME_DISPLAY_SELECTED_MS").unwrap_or(timing.stagger),
            settle: millis(&lookup, "DRAWESOME_WAIT_BEFORE_FLIP_MS").unwrap_or(timing.settle),
        };

        Ok(Self {
            origin,
            game_id,
            socket_url,
            cookies: lookup("DRAWESOME_COOKIES").filter(|c| !c.trim().is_empty()),
            reconnect,
            reveal,
            min_variant_len: parsed(&lookup, "DRAWESOME_MIN_VARIANT_LEN")
                .unwrap_or(DEFAULT_MIN_VARIANT_LEN),
            upload_timeout: millis(&lookup, "DRAWESOME_UPLOAD_TIMEOUT_MS")
                .unwrap_or(Duration::from_millis(DEFAULT_UPLOAD_TIMEOUT_MS)),
        })
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            game_id: Some(self.game_id.clone()),
            reveal: self.reveal,
            min_variant_len: self.min_variant_len,
        }
    }
}

/// Parse an optional variable, ignoring (with a warning) values that do not parse.
fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(key)?;
    match val.trim().parse::<T>() {
        Ok(parsed) => {
            tracing::info!(key, val = %val, "Applied environment override");
            Some(parsed)
        }
        Err(_) => {
            tracing::warn!(key, val = %val, "Environment override is not a valid number, ignoring");
            None
        }
    }
}

fn millis<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parsed::<u64, F>(lookup, key).map(Duration::from_millis)
}
