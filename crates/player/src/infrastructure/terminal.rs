//! Headless presentation and input for the terminal binary.
//!
//! `TracingPresenter` renders by logging; `TerminalInput` is a shared buffer
//! that lines typed on stdin fill in. Each line is parsed into a
//! `TerminalCommand`: some edit the buffer, others become user intents.

use std::sync::{Arc, Mutex, MutexGuard};

use drawesome_shared::{MediaKind, PlayerRef, ScreenId};

use crate::application::controls::{Control, ControlSet};
use crate::application::screens::ScreenContent;
use crate::application::session::UserIntent;
use crate::ports::outbound::{InputPort, Popup, PresentationPort};

/// 1x1 transparent PNG, submitted when nothing has been drawn.
pub const BLANK_PAINTING: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

#[derive(Debug, Default)]
pub struct TracingPresenter;

impl PresentationPort for TracingPresenter {
    fn render_screen(&mut self, content: &ScreenContent) {
        match content {
            ScreenContent::Status { task_type, players } => {
                let finished = players.iter().filter(|(_, s)| s.finished).count();
                tracing::info!(?task_type, players = players.len(), finished, "Status");
            }
            ScreenContent::Task(task) => tracing::info!(?task, "New task"),
            ScreenContent::Results(results) => {
                for entry in results {
                    tracing::info!(
                        player = %entry.nickname,
                        result = entry.result,
                        round = entry.round_increment,
                        "Result"
                    );
                }
            }
            ScreenContent::Answers(variants) => tracing::info!(?variants, "Answers"),
            ScreenContent::FinalStandings(standings) => {
                for row in standings {
                    tracing::info!(
                        place = row.place,
                        podium = row.podium,
                        player = %row.standing.nickname,
                        result = row.standing.result,
                        likes = row.standing.likes_cnt,
                        "Final standing"
                    );
                }
            }
        }
    }

    fn show_only(&mut self, screen: ScreenId) {
        tracing::info!(%screen, "Showing screen");
    }

    fn show_popup(&mut self, popup: Popup, text: Option<&str>) {
        tracing::warn!(?popup, text = text.unwrap_or_default(), "Popup");
    }

    fn hide_popups(&mut self) {
        tracing::debug!("Popups hidden");
    }

    fn show_controls(&mut self, controls: &ControlSet) {
        let enabled: Vec<Control> = controls.iter().collect();
        tracing::info!(?enabled, "Host controls");
    }

    fn show_countdown(&mut self, seconds_left: u32, initial: Option<u32>) {
        tracing::debug!(seconds_left, ?initial, "Countdown");
    }

    fn show_game_code(&mut self, code: &str) {
        tracing::info!(code, "Game code");
    }

    fn present_answer(&mut self, text: &str) {
        tracing::info!(answer = text, "Revealing answer");
    }

    fn reset_answer_card(&mut self) {}

    fn show_selector(&mut self, index: usize, selector: &PlayerRef) {
        tracing::info!(index, player = %selector.nickname, "Picked by");
    }

    fn reveal_correctness(&mut self, author: &PlayerRef, is_correct: bool) {
        tracing::info!(author = %author.nickname, is_correct, "Answer flipped");
    }

    fn show_error(&mut self, error_type: &str, message: &str) {
        tracing::error!(error_type, message, "Server error");
    }

    fn show_submission_error(&mut self, kind: MediaKind, message: &str) {
        tracing::warn!(media_type = %kind, message, "Submission rejected");
    }

    fn clear_submission_error(&mut self, _kind: MediaKind) {}

    fn set_leave_warning(&mut self, enabled: bool) {
        tracing::debug!(enabled, "Leave warning");
    }
}

#[derive(Debug, Default)]
struct InputBuffer {
    painting: Option<String>,
    variant: String,
    likes: Vec<i64>,
}

/// Input state shared between the stdin reader and the session.
#[derive(Debug, Clone, Default)]
pub struct TerminalInput {
    buffer: Arc<Mutex<InputBuffer>>,
}

impl TerminalInput {
    fn lock(&self) -> MutexGuard<'_, InputBuffer> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply one parsed line. Returns the intent it stands for, if any.
    pub fn apply(&self, command: TerminalCommand) -> Option<UserIntent> {
        match command {
            TerminalCommand::Intent(intent) => return Some(intent),
            TerminalCommand::Paint(data_url) => self.lock().painting = Some(data_url),
            TerminalCommand::Write(text) => self.lock().variant = text,
            TerminalCommand::Like(id) => {
                let mut buffer = self.lock();
                if let Some(pos) = buffer.likes.iter().position(|l| *l == id) {
                    buffer.likes.remove(pos);
                } else {
                    buffer.likes.push(id);
                }
            }
        }
        None
    }
}

impl InputPort for TerminalInput {
    fn painting_snapshot(&mut self) -> Option<String> {
        Some(
            self.lock()
                .painting
                .clone()
                .unwrap_or_else(|| BLANK_PAINTING.to_string()),
        )
    }

    fn clear_canvas(&mut self) {
        self.lock().painting = None;
    }

    fn variant_text(&self) -> String {
        self.lock().variant.clone()
    }

    fn clear_variant_text(&mut self) {
        self.lock().variant.clear();
    }

    fn checked_likes(&self) -> Vec<i64> {
        self.lock().likes.clone()
    }
}

/// One line typed by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Intent(UserIntent),
    /// Replace the canvas with a PNG data URL
    Paint(String),
    /// Replace the answer field
    Write(String),
    /// Toggle the like on an answer id
    Like(i64),
}

/// Parse `start`, `pause`, `resume`, `cancel`, `restart`, `submit`,
/// `send`, `pick <option>`, `write <text>`, `paint <data-url>`, `like <id>`.
pub fn parse_line(line: &str) -> Option<TerminalCommand> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let intent = |i| Some(TerminalCommand::Intent(i));
    let control = |c| intent(UserIntent::Control(c));
    match word {
        "start" => control(Control::Start),
        "pause" => control(Control::Pause),
        "resume" => control(Control::Resume),
        "cancel" => control(Control::Cancel),
        "restart" => control(Control::Restart),
        "submit" => intent(UserIntent::SubmitPainting),
        "send" => intent(UserIntent::SubmitVariant),
        "pick" if !rest.is_empty() => intent(UserIntent::SelectAnswer(rest.to_string())),
        "write" => Some(TerminalCommand::Write(rest.to_string())),
        "paint" if !rest.is_empty() => Some(TerminalCommand::Paint(rest.to_string())),
        "like" => rest.parse().ok().map(TerminalCommand::Like),
        _ => None,
    }
}
