//! Hand-written test doubles for the presentation and input ports.

mod recording_presenter;

pub use recording_presenter::{PresenterCall, RecordingInput, RecordingPresenter};
