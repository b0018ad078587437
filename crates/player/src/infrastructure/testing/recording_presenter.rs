//! Recording implementations of PresentationPort and InputPort for testing
//!
//! The presenter keeps every call in order so tests can assert on exactly
//! what the player would have seen. The input double is a plain struct whose
//! fields tests set directly.

use drawesome_shared::{MediaKind, PlayerRef, ScreenId};

use crate::application::controls::ControlSet;
use crate::application::screens::ScreenContent;
use crate::ports::outbound::{InputPort, Popup, PresentationPort};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    RenderScreen(ScreenId),
    ShowOnly(ScreenId),
    ShowPopup(Popup, Option<String>),
    HidePopups,
    ShowControls(ControlSet),
    ShowCountdown(u32, Option<u32>),
    ShowGameCode(String),
    PresentAnswer(String),
    ResetAnswerCard,
    /// Selector index and nickname
    ShowSelector(usize, String),
    /// Author nickname and verdict
    RevealCorrectness(String, bool),
    ShowError(String, String),
    ShowSubmissionError(MediaKind, String),
    ClearSubmissionError(MediaKind),
    SetLeaveWarning(bool),
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    calls: Vec<PresenterCall>,
    visible: Option<ScreenId>,
}

impl RecordingPresenter {
    pub fn calls(&self) -> &[PresenterCall] {
        &self.calls
    }

    /// The screen the last `show_only` made visible.
    pub fn visible(&self) -> Option<ScreenId> {
        self.visible
    }
}

impl PresentationPort for RecordingPresenter {
    fn render_screen(&mut self, content: &ScreenContent) {
        self.calls.push(PresenterCall::RenderScreen(content.screen()));
    }

    fn show_only(&mut self, screen: ScreenId) {
        self.visible = Some(screen);
        self.calls.push(PresenterCall::ShowOnly(screen));
    }

    fn show_popup(&mut self, popup: Popup, text: Option<&str>) {
        self.calls
            .push(PresenterCall::ShowPopup(popup, text.map(str::to_string)));
    }

    fn hide_popups(&mut self) {
        self.calls.push(PresenterCall::HidePopups);
    }

    fn show_controls(&mut self, controls: &ControlSet) {
        self.calls.push(PresenterCall::ShowControls(controls.clone()));
    }

    fn show_countdown(&mut self, seconds_left: u32, initial: Option<u32>) {
        self.calls
            .push(PresenterCall::ShowCountdown(seconds_left, initial));
    }

    fn show_game_code(&mut self, code: &str) {
        self.calls.push(PresenterCall::ShowGameCode(code.to_string()));
    }

    fn present_answer(&mut self, text: &str) {
        self.calls.push(PresenterCall::PresentAnswer(text.to_string()));
    }

    fn reset_answer_card(&mut self) {
        self.calls.push(PresenterCall::ResetAnswerCard);
    }

    fn show_selector(&mut self, index: usize, selector: &PlayerRef) {
        self.calls
            .push(PresenterCall::ShowSelector(index, selector.nickname.clone()));
    }

    fn reveal_correctness(&mut self, author: &PlayerRef, is_correct: bool) {
        self.calls.push(PresenterCall::RevealCorrectness(
            author.nickname.clone(),
            is_correct,
        ));
    }

    fn show_error(&mut self, error_type: &str, message: &str) {
        self.calls.push(PresenterCall::ShowError(
            error_type.to_string(),
            message.to_string(),
        ));
    }

    fn show_submission_error(&mut self, kind: MediaKind, message: &str) {
        self.calls
            .push(PresenterCall::ShowSubmissionError(kind, message.to_string()));
    }

    fn clear_submission_error(&mut self, kind: MediaKind) {
        self.calls.push(PresenterCall::ClearSubmissionError(kind));
    }

    fn set_leave_warning(&mut self, enabled: bool) {
        self.calls.push(PresenterCall::SetLeaveWarning(enabled));
    }
}

/// Input double with directly settable contents.
#[derive(Debug, Default)]
pub struct RecordingInput {
    pub painting: Option<String>,
    pub variant: String,
    pub likes: Vec<i64>,
    pub canvas_cleared: usize,
    pub variant_cleared: usize,
}

impl InputPort for RecordingInput {
    fn painting_snapshot(&mut self) -> Option<String> {
        self.painting.clone()
    }

    fn clear_canvas(&mut self) {
        self.canvas_cleared += 1;
    }

    fn variant_text(&self) -> String {
        self.variant.clone()
    }

    fn clear_variant_text(&mut self) {
        self.variant.clear();
        self.variant_cleared += 1;
    }

    fn checked_likes(&self) -> Vec<i64> {
        self.likes.clone()
    }
}
