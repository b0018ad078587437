//! Host control permissions.
//!
//! The server is authoritative: `state` / `init_stage` / `error` replace the
//! set outright. Sending a control applies an optimistic guess first so the
//! buttons react before the server answers.

use std::collections::BTreeSet;

use drawesome_shared::{ClientMessage, GameStage};

/// Error type the server uses when `start` is refused.
pub const START_GAME_ERROR: &str = "start_game";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Control {
    Start,
    Pause,
    Resume,
    Cancel,
    Restart,
}

impl Control {
    pub fn message(self) -> ClientMessage {
        match self {
            Control::Start => ClientMessage::Start,
            Control::Pause => ClientMessage::Pause,
            Control::Resume => ClientMessage::Resume,
            Control::Cancel => ClientMessage::Cancel,
            Control::Restart => ClientMessage::Restart,
        }
    }
}

/// The controls currently offered to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlSet {
    enabled: BTreeSet<Control>,
}

impl ControlSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(controls: &[Control]) -> Self {
        Self {
            enabled: controls.iter().copied().collect(),
        }
    }

    /// Controls permitted in a server-reported stage.
    pub fn for_stage(stage: GameStage) -> Self {
        match stage {
            GameStage::Pregame => Self::of(&[Control::Start, Control::Cancel]),
            GameStage::Finished => Self::of(&[Control::Restart]),
            GameStage::Preround | GameStage::Round | GameStage::Unknown => {
                Self::of(&[Control::Cancel, Control::Resume, Control::Pause])
            }
        }
    }

    /// Optimistic set right after `sent` goes out. `None` keeps the current set.
    pub fn after_sending(sent: Control) -> Option<Self> {
        match sent {
            Control::Start | Control::Resume => Some(Self::of(&[Control::Pause, Control::Cancel])),
            Control::Pause => Some(Self::of(&[Control::Resume, Control::Cancel])),
            Control::Cancel => Some(Self::empty()),
            Control::Restart => None,
        }
    }

    /// Set after a server-declared error of `error_type`. `None` keeps the current set.
    pub fn after_error(error_type: &str) -> Option<Self> {
        (error_type == START_GAME_ERROR).then(|| Self::of(&[Control::Start]))
    }

    pub fn contains(&self, control: Control) -> bool {
        self.enabled.contains(&control)
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Control> + '_ {
        self.enabled.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_rules() {
        assert_eq!(
            ControlSet::for_stage(GameStage::Pregame),
            ControlSet::of(&[Control::Start, Control::Cancel])
        );
        assert_eq!(
            ControlSet::for_stage(GameStage::Round),
            ControlSet::of(&[Control::Pause, Control::Resume, Control::Cancel])
        );
        assert_eq!(
            ControlSet::for_stage(GameStage::Finished),
            ControlSet::of(&[Control::Restart])
        );
    }

    #[test]
    fn test_optimistic_updates() {
        assert_eq!(
            ControlSet::after_sending(Control::Pause),
            Some(ControlSet::of(&[Control::Resume, Control::Cancel]))
        );
        assert_eq!(
            ControlSet::after_sending(Control::Cancel),
            Some(ControlSet::empty())
        );
        assert_eq!(ControlSet::after_sending(Control::Restart), None);
    }

    #[test]
    fn test_start_error_leaves_only_start() {
        let set = ControlSet::after_error(START_GAME_ERROR).unwrap();
        assert!(set.contains(Control::Start));
        assert_eq!(set.iter().count(), 1);
        assert_eq!(ControlSet::after_error("upload"), None);
    }

    #[test]
    fn test_iteration_is_ordered() {
        let set = ControlSet::of(&[Control::Cancel, Control::Start]);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Control::Start, Control::Cancel]
        );
    }
}
