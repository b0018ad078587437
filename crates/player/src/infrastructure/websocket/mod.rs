//! WebSocket client for the game server connection
//!
//! - `core`: reconnection bookkeeping
//! - `client`: tokio-tungstenite socket loop
//! - `bridge`: spawns the client and hands out the command bus and events

mod bridge;
mod client;
mod core;
mod shared;

pub use bridge::{create_connection, Connection};
pub use client::SessionClient;
pub use self::core::{ReconnectPolicy, ReconnectState};
pub use shared::{
    game_socket_url, SocketUrlError, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY_MS,
};
