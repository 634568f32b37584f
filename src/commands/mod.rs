//! Command handlers
//!
//! The async entry points a UI shell calls. Every command reports failure as
//! a serializable [`ErrorResponse`].

pub mod lesson;
pub mod recording;

pub use lesson::{open_lesson, play_lesson, upload_lesson, LessonSummary, LibraryState};
pub use recording::{
    get_recording_duration, get_recording_state, pause_recording, resume_recording,
    start_recording, stop_recording, submit_input, RecorderState, RecordingSummary,
};

use crate::utils::{AppError, ErrorResponse};

fn to_response<E: Into<AppError>>(error: E) -> ErrorResponse {
    let error = error.into();
    tracing::warn!("Command failed: {}", error);
    ErrorResponse::from(error)
}
