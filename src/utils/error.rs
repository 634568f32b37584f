//! Error types and handling
//!
//! Common error types used across the engine.

use crate::events::LogError;
use crate::lesson::StoreError;
use crate::player::PlayerError;
use crate::recorder::RecordingError;
use crate::render::RenderError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),

    #[error("Event log error: {0}")]
    EventLog(#[from] LogError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Lesson store error: {0}")]
    Store(#[from] StoreError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlayerError),
}

impl AppError {
    /// Whether the caller can reasonably retry the failed operation
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Io(_) => true,
            AppError::Playback(e) => e.is_retryable(),
            AppError::Store(StoreError::Io(_)) => true,
            _ => false,
        }
    }
}

/// Error response for the UI shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Recording(RecordingError::NoAudioCaptured) => "NO_AUDIO_CAPTURED",
            AppError::Recording(_) => "RECORDING_ERROR",
            AppError::EventLog(_) => "EVENT_LOG_ERROR",
            AppError::Render(_) => "RENDER_ERROR",
            AppError::Store(StoreError::NotFound(_)) => "LESSON_NOT_FOUND",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Playback(PlayerError::AudioUnavailable(_)) => "AUDIO_UNAVAILABLE",
            AppError::Playback(_) => "PLAYBACK_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            retryable: error.is_retryable(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
