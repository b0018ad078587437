//! Runtime-agnostic reconnection bookkeeping for the game socket client.
//!
//! The client owns the actual socket and calls into this core on every open
//! and close.

use std::time::Duration;

use super::shared::{DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY_MS};

/// Bounded retry with a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
        }
    }
}

/// Retry counter shared by every transport of one session.
///
/// `attempt_count` resets on every successful open and grows by one on every
/// close. Once it exceeds `max_attempts` the client gives up for good.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectState {
    policy: ReconnectPolicy,
    attempt_count: u32,
}

impl ReconnectState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempt_count: 0,
        }
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub fn on_open(&mut self) {
        self.attempt_count = 0;
    }

    /// Count a close and return the delay before the next attempt, or `None`
    /// when the budget is spent.
    pub fn on_close(&mut self) -> Option<Duration> {
        self.attempt_count = self.attempt_count.saturating_add(1);
        (!self.is_exhausted()).then_some(self.policy.backoff)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt_count > self.policy.max_attempts
    }
}
