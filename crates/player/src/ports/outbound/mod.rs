//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing the session to render, read local input, and upload media without
//! depending on concrete implementations.

pub mod input_port;
pub mod presentation_port;
pub mod upload_port;

pub use input_port::InputPort;
pub use presentation_port::{Popup, PresentationPort};
pub use upload_port::{MediaUploadPort, UploadError};

#[cfg(test)]
pub use upload_port::MockMediaUploadPort;
