//! Lesson playback
//!
//! The audio clock drives everything: each time update advances the sync
//! engine, which redraws strokes and asks the renderer for a new slide when
//! the page changes.

pub mod cursor;
pub mod driver;
pub mod export;
pub mod player;
pub mod sync;

pub use cursor::PlaybackCursor;
pub use driver::{run_player, spawn_clock_ticks, PlayerHandle, PlayerInput, PlayerUpdate};
pub use export::{export_frame_png, render_frame_at};
pub use player::{AudioStatus, LessonPlayer};
pub use sync::{SyncEngine, SyncOutcome};

use crate::render::RenderError;
use thiserror::Error;

/// Playback errors
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    #[error("Player is closed")]
    Closed,

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Player task failed: {0}")]
    Task(String),
}

impl PlayerError {
    /// Whether reloading the media may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlayerError::AudioUnavailable(_) | PlayerError::Io(_))
    }
}
