//! Message Dispatcher
//!
//! Decodes one text frame and routes it to the handler method for its
//! `command`. Unknown commands and undecodable frames are logged and dropped;
//! nothing here returns an error to the transport.

use drawesome_shared::{AnswerReveal, GameStage, ServerMessage, TimerUpdate, UpdatePayload};

/// Receiver of decoded server commands.
///
/// Commands a handler does not care about default to no-ops.
pub trait CommandHandler {
    fn on_update(&mut self, update: UpdatePayload);

    fn on_display_answer(&mut self, variant: AnswerReveal, is_correct: bool);

    fn on_pause(&mut self, text: Option<String>);

    fn on_resume(&mut self);

    fn on_cancel(&mut self, text: Option<String>);

    /// `init_stage` or the `stage` of a `state` reply.
    fn on_stage(&mut self, stage: GameStage);

    fn on_game_code(&mut self, _code: String) {}

    fn on_timer(&mut self, timer: TimerUpdate);

    fn on_error(&mut self, error_type: String, message: String);

    fn on_collect_likes(&mut self) {}
}

/// Decode a raw frame into a command envelope.
pub fn decode(frame: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(frame)
}

/// Route an already decoded command.
pub fn dispatch<H: CommandHandler + ?Sized>(message: ServerMessage, handler: &mut H) {
    match message {
        ServerMessage::Update(update) => handler.on_update(update),
        ServerMessage::DisplayAnswer {
            variant,
            is_correct,
        } => handler.on_display_answer(variant, is_correct),
        ServerMessage::Pause { text } => handler.on_pause(text),
        ServerMessage::Resume => handler.on_resume(),
        ServerMessage::Cancel { text } => handler.on_cancel(text),
        ServerMessage::InitStage { stage } => handler.on_stage(stage),
        ServerMessage::State {
            stage,
            game_code,
            is_paused,
        } => {
            if let Some(stage) = stage {
                handler.on_stage(stage);
            }
            if let Some(code) = game_code {
                handler.on_game_code(code);
            }
            if is_paused {
                handler.on_pause(None);
            }
        }
        ServerMessage::Timer(timer) => handler.on_timer(timer),
        ServerMessage::Error {
            error_type,
            error_message,
        } => handler.on_error(error_type, error_message),
        ServerMessage::CollectLikes => handler.on_collect_likes(),
        ServerMessage::Unknown => {
            tracing::debug!("Ignoring unknown server command");
        }
    }
}

/// Decode and route one frame. Returns whether the frame was decoded.
pub fn dispatch_frame<H: CommandHandler + ?Sized>(frame: &str, handler: &mut H) -> bool {
    match decode(frame) {
        Ok(message) => {
            tracing::trace!(command = message.command(), "Dispatching server command");
            dispatch(message, handler);
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, frame_len = frame.len(), "Dropping undecodable frame");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawesome_shared::ScreenId;

    #[derive(Default)]
    struct Calls(Vec<String>);

    impl CommandHandler for Calls {
        fn on_update(&mut self, update: UpdatePayload) {
            self.0.push(format!("update:{}", update.active_screen));
        }
        fn on_display_answer(&mut self, variant: AnswerReveal, is_correct: bool) {
            self.0.push(format!("display_answer:{}:{}", variant.text, is_correct));
        }
        fn on_pause(&mut self, text: Option<String>) {
            self.0.push(format!("pause:{}", text.unwrap_or_default()));
        }
        fn on_resume(&mut self) {
            self.0.push("resume".into());
        }
        fn on_cancel(&mut self, text: Option<String>) {
            self.0.push(format!("cancel:{}", text.unwrap_or_default()));
        }
        fn on_stage(&mut self, stage: GameStage) {
            self.0.push(format!("stage:{stage:?}"));
        }
        fn on_game_code(&mut self, code: String) {
            self.0.push(format!("code:{code}"));
        }
        fn on_timer(&mut self, timer: TimerUpdate) {
            self.0.push(format!("timer:{:?}", timer.remaining()));
        }
        fn on_error(&mut self, error_type: String, message: String) {
            self.0.push(format!("error:{error_type}:{message}"));
        }
    }

    fn run(frames: &[&str]) -> Vec<String> {
        let mut calls = Calls::default();
        for frame in frames {
            dispatch_frame(frame, &mut calls);
        }
        calls.0
    }

    #[test]
    fn test_routes_by_command() {
        let calls = run(&[
            r#"{"command":"update","active_screen":"results","results":[]}"#,
            r#"{"command":"display_answer","variant":{"text":"cat","author":{"nickname":"ann"},"selected_by":[]},"is_correct":true}"#,
            r#"{"command":"pause","text":"host left"}"#,
            r#"{"command":"resume"}"#,
            r#"{"command":"timer","time":-2}"#,
            r#"{"command":"error","error_type":"start_game","error_message":"need 3 players"}"#,
        ]);
        assert_eq!(
            calls,
            vec![
                format!("update:{}", ScreenId::Results),
                "display_answer:cat:true".to_string(),
                "pause:host left".to_string(),
                "resume".to_string(),
                "timer:Some(0)".to_string(),
                "error:start_game:need 3 players".to_string(),
            ]
        );
    }

    #[test]
    fn test_state_fans_out() {
        let calls = run(&[
            r#"{"command":"state","stage":"round","game_code":"AB12","is_paused":true}"#,
        ]);
        assert_eq!(calls, vec!["stage:Round", "code:AB12", "pause:"]);
    }

    #[test]
    fn test_unknown_and_malformed_frames_are_dropped() {
        let mut calls = Calls::default();
        let confetti = r#"{"command":"confetti","amount":3}"#;
        assert!(dispatch_frame(confetti, &mut calls));
        assert!(!dispatch_frame("not json", &mut calls));
        assert!(!dispatch_frame(r#"{"command":"update"}"#, &mut calls));
        assert!(calls.0.is_empty());
    }

    #[test]
    fn test_collect_likes_defaults_to_noop() {
        assert!(run(&[r#"{"command":"collect_likes"}"#]).is_empty());
    }
}
