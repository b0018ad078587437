//! Application services
//!
//! Services depend on port traits and the command bus, not on concrete
//! socket or HTTP implementations.

pub mod session_command_service;

pub use session_command_service::{SessionCommandService, SubmitOrigin, DEFAULT_MIN_VARIANT_LEN};
