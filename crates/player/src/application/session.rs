//! Game session event loop.
//!
//! One `GameSession` owns every piece of client state: the active screen, the
//! current task, the permitted controls, the countdown and the reveal run.
//! Socket frames, connection changes, user intents, reveal timers and upload
//! completions all arrive as `SessionEvent`s on one channel and are handled
//! to completion, one at a time. Spawned work (reveal timers, uploads) only
//! ever sends events back.

use std::sync::Arc;

use drawesome_shared::{
    AnswerReveal, GameStage, MediaKind, ScreenId, Task, TimerUpdate, UpdatePayload, UploadResponse,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::controls::{Control, ControlSet};
use super::countdown::Countdown;
use super::dispatcher::{dispatch_frame, CommandHandler};
use super::reveal::{RevealSequencer, RevealStep, RevealTiming};
use super::screens::{ScreenContent, ScreenStateMachine};
use super::services::{SessionCommandService, SubmitOrigin};
use crate::infrastructure::messaging::{CommandBus, ConnectionEvent, ConnectionState};
use crate::ports::outbound::{InputPort, MediaUploadPort, Popup, PresentationPort, UploadError};

/// Something the player did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    /// Host pressed a control button
    Control(Control),
    /// Submit the current canvas
    SubmitPainting,
    /// Submit the free-text answer field
    SubmitVariant,
    /// Pick one of the options of a selecting task
    SelectAnswer(String),
}

#[derive(Debug)]
pub enum SessionEvent {
    Transport(ConnectionEvent),
    User(UserIntent),
    Reveal {
        generation: u64,
        step: RevealStep,
    },
    UploadFinished {
        kind: MediaKind,
        origin: SubmitOrigin,
        result: Result<UploadResponse, UploadError>,
    },
}

/// Knobs the session takes from the player configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub game_id: Option<String>,
    pub reveal: RevealTiming,
    pub min_variant_len: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            game_id: None,
            reveal: RevealTiming::default(),
            min_variant_len: super::services::DEFAULT_MIN_VARIANT_LEN,
        }
    }
}

pub struct GameSession<P, I> {
    presenter: P,
    input: I,
    commands: SessionCommandService,
    events: mpsc::UnboundedSender<SessionEvent>,
    screens: ScreenStateMachine,
    task: Option<Task>,
    controls: ControlSet,
    countdown: Countdown,
    reveal: RevealSequencer,
    /// Epoch of the socket whose frames are trusted
    live_epoch: Option<u64>,
    connection_notice: bool,
    cancelled: bool,
    leave_warning: bool,
}

impl<P: PresentationPort, I: InputPort> GameSession<P, I> {
    pub fn new(
        presenter: P,
        input: I,
        commands: SessionCommandService,
        events: mpsc::UnboundedSender<SessionEvent>,
        timing: RevealTiming,
    ) -> Self {
        Self {
            presenter,
            input,
            commands,
            events,
            screens: ScreenStateMachine::new(),
            task: None,
            controls: ControlSet::empty(),
            countdown: Countdown::new(),
            reveal: RevealSequencer::new(timing),
            live_epoch: None,
            connection_notice: false,
            cancelled: false,
            leave_warning: true,
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn active_screen(&self) -> Option<ScreenId> {
        self.screens.active()
    }

    pub fn screens(&self) -> &ScreenStateMachine {
        &self.screens
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Whether leaving now should prompt the player.
    pub fn leave_warning_enabled(&self) -> bool {
        self.leave_warning
    }

    /// Consume events until the connection goes away for good.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<SessionEvent>,
        mut connection: mpsc::UnboundedReceiver<ConnectionEvent>,
    ) -> Self {
        loop {
            let event = tokio::select! {
                Some(event) = events.recv() => event,
                event = connection.recv() => match event {
                    Some(event) => SessionEvent::Transport(event),
                    None => break,
                },
            };
            self.handle_event(event);
        }
        tracing::info!("Connection closed, session loop finished");
        self.reveal.cancel();
        self
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Transport(ConnectionEvent::StateChanged {
                epoch,
                state,
                attempt,
            }) => self.on_connection_state(epoch, state, attempt),
            SessionEvent::Transport(ConnectionEvent::Frame { epoch, text }) => {
                if self.live_epoch != Some(epoch) {
                    tracing::debug!(epoch, live = ?self.live_epoch, "Dropping frame from stale socket");
                    return;
                }
                dispatch_frame(&text, self);
            }
            SessionEvent::User(intent) => self.on_intent(intent),
            SessionEvent::Reveal { generation, step } => self.on_reveal_step(generation, step),
            SessionEvent::UploadFinished {
                kind,
                origin,
                result,
            } => self.on_upload_finished(kind, origin, result),
        }
    }

    // -------------------------------------------------------------------------
    // Connection
    // -------------------------------------------------------------------------

    fn on_connection_state(&mut self, epoch: u64, state: ConnectionState, attempt: u32) {
        tracing::debug!(epoch, ?state, attempt, "Connection state changed");
        match state {
            ConnectionState::Connected => {
                self.live_epoch = Some(epoch);
                if std::mem::take(&mut self.connection_notice) {
                    self.presenter.hide_popups();
                }
            }
            ConnectionState::Connecting => {}
            ConnectionState::Reconnecting => {
                self.live_epoch = None;
                self.show_connection_notice(Popup::Reconnecting);
            }
            ConnectionState::Failed => {
                self.live_epoch = None;
                self.show_connection_notice(Popup::ServerUnavailable);
            }
            ConnectionState::Disconnected => {
                self.live_epoch = None;
            }
        }
    }

    fn show_connection_notice(&mut self, popup: Popup) {
        // A cancelled game has nothing left to reconnect to
        if self.cancelled {
            return;
        }
        self.connection_notice = true;
        self.presenter.show_popup(popup, None);
    }

    // -------------------------------------------------------------------------
    // User intents
    // -------------------------------------------------------------------------

    fn on_intent(&mut self, intent: UserIntent) {
        match intent {
            UserIntent::Control(control) => self.send_control(control),
            UserIntent::SubmitPainting => match self.task {
                Some(Task::Drawing { .. }) => self.submit_painting(SubmitOrigin::User),
                _ => tracing::warn!("No drawing task, ignoring painting submission"),
            },
            UserIntent::SubmitVariant => match self.task {
                Some(Task::Writing { .. }) => self.submit_variant(SubmitOrigin::User),
                _ => tracing::warn!("No writing task, ignoring answer submission"),
            },
            UserIntent::SelectAnswer(text) => match &self.task {
                Some(Task::Selecting(task)) if task.variants.contains(&text) => {
                    self.commands.submit_answer(text);
                }
                _ => tracing::warn!(answer = %text, "Answer is not one of the current options"),
            },
        }
    }

    fn send_control(&mut self, control: Control) {
        if !self.controls.contains(control) {
            tracing::warn!(?control, "Control not permitted right now, not sending");
            return;
        }
        match self.commands.send_control(control) {
            Ok(()) => {
                if let Some(controls) = ControlSet::after_sending(control) {
                    self.set_controls(controls);
                }
            }
            Err(e) => tracing::warn!(?control, error = %e, "Failed to send control"),
        }
    }

    fn submit_painting(&mut self, origin: SubmitOrigin) {
        match self.input.painting_snapshot() {
            Some(painting) => self.commands.submit_painting(painting, origin),
            None => tracing::warn!(?origin, "No canvas to submit"),
        }
    }

    fn submit_variant(&mut self, origin: SubmitOrigin) {
        let text = self.input.variant_text();
        if origin == SubmitOrigin::User {
            self.presenter.clear_submission_error(MediaKind::Variant);
        }
        if !self.commands.submit_variant(text, origin) {
            let message = format!(
                "Answer must be at least {} characters",
                self.commands.min_variant_len()
            );
            self.presenter
                .show_submission_error(MediaKind::Variant, &message);
        }
    }

    /// The countdown ran out: send whatever the current task has so far.
    fn submit_on_timeout(&mut self) {
        if !self.screens.is_visible(ScreenId::Task) {
            return;
        }
        match self.task {
            Some(Task::Drawing { .. }) => self.submit_painting(SubmitOrigin::Timeout),
            Some(Task::Writing { .. }) => self.submit_variant(SubmitOrigin::Timeout),
            Some(Task::Selecting(_)) | None => {}
        }
    }

    fn on_upload_finished(
        &mut self,
        kind: MediaKind,
        origin: SubmitOrigin,
        result: Result<UploadResponse, UploadError>,
    ) {
        let failure = match result {
            Ok(response) if response.is_success() => {
                tracing::debug!(media_type = %kind, "Upload accepted");
                if origin == SubmitOrigin::User {
                    self.presenter.clear_submission_error(kind);
                }
                return;
            }
            Ok(response) => response
                .message
                .unwrap_or_else(|| "Submission was rejected".to_string()),
            Err(e) => e.to_string(),
        };

        match origin {
            SubmitOrigin::User => self.presenter.show_submission_error(kind, &failure),
            SubmitOrigin::Timeout => {
                tracing::warn!(media_type = %kind, message = %failure, "Timeout submission failed");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Screens and reveal
    // -------------------------------------------------------------------------

    fn transition(&mut self, content: ScreenContent) {
        // Pending reveal steps belong to the screen being left
        self.reveal.cancel();

        let screen = content.screen();
        self.task = None;
        match &content {
            ScreenContent::Task(task) => {
                match task {
                    Task::Drawing { .. } => self.input.clear_canvas(),
                    Task::Writing { .. } => {
                        self.input.clear_variant_text();
                        self.presenter.clear_submission_error(MediaKind::Variant);
                    }
                    Task::Selecting(_) => {}
                }
                self.task = Some(task.clone());
            }
            ScreenContent::Answers(_) => self.presenter.reset_answer_card(),
            _ => {}
        }

        self.presenter.render_screen(&content);
        self.screens.activate(screen);
        self.presenter.show_only(screen);

        if self.screens.is_terminal() {
            self.set_leave_warning(false);
        }
    }

    fn on_reveal_step(&mut self, generation: u64, step: RevealStep) {
        if !self.reveal.is_current(generation) {
            tracing::trace!(generation, "Dropping stale reveal step");
            return;
        }
        match step {
            RevealStep::ShowSelector { index, selector } => {
                self.presenter.show_selector(index, &selector);
            }
            RevealStep::RevealCorrectness { author, is_correct } => {
                self.presenter.reveal_correctness(&author, is_correct);
                self.reveal.finish(generation);
            }
        }
    }

    fn set_controls(&mut self, controls: ControlSet) {
        self.controls = controls;
        self.presenter.show_controls(&self.controls);
    }

    fn set_leave_warning(&mut self, enabled: bool) {
        if self.leave_warning != enabled {
            self.leave_warning = enabled;
            self.presenter.set_leave_warning(enabled);
        }
    }
}

impl<P: PresentationPort, I: InputPort> CommandHandler for GameSession<P, I> {
    fn on_update(&mut self, update: UpdatePayload) {
        match ScreenContent::from_update(&update) {
            Ok(content) => self.transition(content),
            Err(e) => {
                tracing::warn!(screen = %update.active_screen, error = %e, "Dropping malformed update");
            }
        }
    }

    fn on_display_answer(&mut self, variant: AnswerReveal, is_correct: bool) {
        if !self.screens.is_visible(ScreenId::Answers) {
            tracing::debug!(active = ?self.screens.active(), "Answer reveal outside the answers screen");
        }
        self.presenter.present_answer(&variant.text);
        self.reveal.start(&variant, is_correct, self.events.clone());
    }

    fn on_pause(&mut self, text: Option<String>) {
        if self.cancelled {
            return;
        }
        self.presenter.show_popup(Popup::Pause, text.as_deref());
    }

    fn on_resume(&mut self) {
        // The cancellation notice stays up
        if self.cancelled {
            return;
        }
        self.presenter.hide_popups();
    }

    fn on_cancel(&mut self, text: Option<String>) {
        tracing::info!(reason = text.as_deref().unwrap_or_default(), "Game cancelled");
        self.cancelled = true;
        self.reveal.cancel();
        self.presenter.show_popup(Popup::Cancelled, text.as_deref());
        self.set_controls(ControlSet::empty());
        self.set_leave_warning(false);
    }

    fn on_stage(&mut self, stage: GameStage) {
        self.set_controls(ControlSet::for_stage(stage));
    }

    fn on_game_code(&mut self, code: String) {
        self.presenter.show_game_code(&code);
    }

    fn on_timer(&mut self, timer: TimerUpdate) {
        let Some(tick) = self.countdown.apply(timer) else {
            return;
        };
        self.presenter.show_countdown(tick.seconds_left, tick.initial);
        if tick.expired {
            self.submit_on_timeout();
        }
    }

    fn on_error(&mut self, error_type: String, message: String) {
        tracing::warn!(error_type = %error_type, message = %message, "Server reported an error");
        self.presenter.show_error(&error_type, &message);
        if let Some(controls) = ControlSet::after_error(&error_type) {
            self.set_controls(controls);
        }
    }

    fn on_collect_likes(&mut self) {
        let likes = self.input.checked_likes();
        if !self.commands.submit_likes(likes) {
            tracing::debug!("No likes to submit");
        }
    }
}

/// Handle to a spawned session.
pub struct SessionHandle<P, I> {
    events: mpsc::UnboundedSender<SessionEvent>,
    task: JoinHandle<GameSession<P, I>>,
}

/// Cloneable sender of user intents into a running session.
#[derive(Clone)]
pub struct IntentSender {
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl IntentSender {
    /// Queue a user intent. Returns false once the session has stopped.
    pub fn send(&self, intent: UserIntent) -> bool {
        self.events.send(SessionEvent::User(intent)).is_ok()
    }
}

impl<P, I> SessionHandle<P, I> {
    pub fn intents(&self) -> IntentSender {
        IntentSender {
            events: self.events.clone(),
        }
    }

    /// Wait for the session loop to finish and take back its state.
    pub async fn join(self) -> Result<GameSession<P, I>, tokio::task::JoinError> {
        self.task.await
    }
}

/// Build a session around a live connection and run it on its own task.
pub fn spawn_session<P, I>(
    presenter: P,
    input: I,
    command_bus: CommandBus,
    connection: mpsc::UnboundedReceiver<ConnectionEvent>,
    uploads: Arc<dyn MediaUploadPort>,
    settings: SessionSettings,
) -> SessionHandle<P, I>
where
    P: PresentationPort + 'static,
    I: InputPort + 'static,
{
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let mut commands = SessionCommandService::new(command_bus, uploads, events_tx.clone())
        .with_min_variant_len(settings.min_variant_len);
    if let Some(game_id) = settings.game_id {
        commands = commands.with_game_id(game_id);
    }

    let session = GameSession::new(
        presenter,
        input,
        commands,
        events_tx.clone(),
        settings.reveal,
    );
    let task = tokio::spawn(session.run(events_rx, connection));

    SessionHandle {
        events: events_tx,
        task,
    }
}
