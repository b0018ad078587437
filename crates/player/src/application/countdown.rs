//! Countdown display state.

use drawesome_shared::TimerUpdate;

/// What a `timer` frame changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    pub seconds_left: u32,
    pub initial: Option<u32>,
    /// True exactly once per countdown, on the first frame that reaches zero
    pub expired: bool,
}

#[derive(Debug, Default)]
pub struct Countdown {
    initial: Option<u32>,
    seconds_left: Option<u32>,
    expiry_handled: bool,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a `timer` frame. Frames without a value are ignored.
    pub fn apply(&mut self, update: TimerUpdate) -> Option<CountdownTick> {
        let seconds_left = update.remaining()?;
        if update.initial.is_some() {
            self.initial = update.initial;
        }
        self.seconds_left = Some(seconds_left);

        let expired = if seconds_left == 0 {
            !std::mem::replace(&mut self.expiry_handled, true)
        } else {
            self.expiry_handled = false;
            false
        };

        Some(CountdownTick {
            seconds_left,
            initial: self.initial,
            expired,
        })
    }

    pub fn seconds_left(&self) -> Option<u32> {
        self.seconds_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left(secs: i64) -> TimerUpdate {
        TimerUpdate {
            initial: None,
            left: Some(secs),
            time: None,
        }
    }

    #[test]
    fn test_expires_once_per_countdown() {
        let mut countdown = Countdown::new();
        assert!(!countdown.apply(left(2)).unwrap().expired);
        assert!(countdown.apply(left(0)).unwrap().expired);
        assert!(!countdown.apply(left(0)).unwrap().expired);

        // A new countdown re-arms the expiry
        assert!(!countdown.apply(left(30)).unwrap().expired);
        assert!(countdown.apply(left(0)).unwrap().expired);
    }

    #[test]
    fn test_initial_is_remembered() {
        let mut countdown = Countdown::new();
        countdown.apply(TimerUpdate {
            initial: Some(40),
            left: Some(40),
            time: None,
        });
        let tick = countdown.apply(left(39)).unwrap();
        assert_eq!(tick.initial, Some(40));
        assert_eq!(countdown.seconds_left(), Some(39));
    }

    #[test]
    fn test_empty_frame_is_ignored() {
        let mut countdown = Countdown::new();
        assert_eq!(countdown.apply(TimerUpdate::default()), None);
        assert_eq!(countdown.seconds_left(), None);
    }
}
