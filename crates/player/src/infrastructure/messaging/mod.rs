//! Command bus and connection lifecycle types.
//!
//! - `CommandBus`: queue control envelopes for the socket writer
//! - `ConnectionHandle`: manage connection lifecycle
//! - `ConnectionEvent`: frames and state changes delivered to the session
//!
//! The socket client (in the websocket module) drains the bus and produces
//! the events.

pub mod command_bus;
pub mod connection;

pub use command_bus::{CommandBus, SendError, COMMAND_QUEUE_CAPACITY};
pub use connection::{
    set_connection_state, ConnectionEvent, ConnectionHandle, ConnectionState,
    ConnectionStateObserver,
};
