//! Ports - interfaces to the collaborators this crate does not own.

pub mod outbound;
