//! Presentation Port - narrow rendering boundary
//!
//! Pixel rendering, layout and styling live outside this crate. The session
//! calls into this port after it has updated its own state, so every call
//! reflects state that is already consistent.

use drawesome_shared::{MediaKind, PlayerRef, ScreenId};

use crate::application::controls::ControlSet;
use crate::application::screens::ScreenContent;

/// Transient overlays. At most one is visible; showing one hides the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    /// Host paused the game (or disconnected)
    Pause,
    /// Game was cancelled; terminal
    Cancelled,
    /// Connection lost, a reconnect attempt is scheduled
    Reconnecting,
    /// Retry budget exhausted; terminal until reload
    ServerUnavailable,
}

pub trait PresentationPort: Send {
    /// Rebuild a screen's contents from a fresh update. Does not change visibility.
    fn render_screen(&mut self, content: &ScreenContent);

    /// Make `screen` the only visible screen, hiding every other one.
    fn show_only(&mut self, screen: ScreenId);

    fn show_popup(&mut self, popup: Popup, text: Option<&str>);

    fn hide_popups(&mut self);

    /// Show exactly the given host controls.
    fn show_controls(&mut self, controls: &ControlSet);

    fn show_countdown(&mut self, seconds_left: u32, initial: Option<u32>);

    fn show_game_code(&mut self, code: &str);

    // -------------------------------------------------------------------------
    // Answer card
    // -------------------------------------------------------------------------

    /// Reset the card for a new answer: show its text face up, no selectors.
    fn present_answer(&mut self, text: &str);

    /// Hide the card and clear its flip state (entering the answers screen).
    fn reset_answer_card(&mut self);

    /// Append the `index`-th selector icon to the card.
    fn show_selector(&mut self, index: usize, selector: &PlayerRef);

    /// Fill the card back with the author and verdict, then flip it.
    fn reveal_correctness(&mut self, author: &PlayerRef, is_correct: bool);

    // -------------------------------------------------------------------------
    // Errors
    // -------------------------------------------------------------------------

    /// Server-declared protocol error.
    fn show_error(&mut self, error_type: &str, message: &str);

    /// Inline validation error next to the input that produced `kind`.
    fn show_submission_error(&mut self, kind: MediaKind, message: &str);

    fn clear_submission_error(&mut self, kind: MediaKind);

    /// Whether leaving the page should prompt the user.
    fn set_leave_warning(&mut self, enabled: bool);
}
