pub mod controls;
pub mod countdown;
pub mod dispatcher;
pub mod reveal;
pub mod screens;
pub mod services;
pub mod session;
