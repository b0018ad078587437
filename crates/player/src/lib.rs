//! Drawesome Player crate.
//!
//! Session synchronization client for the Drawesome party game: owns the game
//! socket, interprets the server's command protocol, drives the screen state
//! machine, and sequences the answer reveal animation. Rendering and input
//! capture are external collaborators reached through the `ports` traits.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;

pub use application::session::{
    spawn_session, GameSession, IntentSender, SessionEvent, SessionHandle, SessionSettings,
    UserIntent,
};
pub use config::PlayerConfig;
