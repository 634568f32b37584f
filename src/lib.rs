//! Lesson Studio - narrated whiteboard lessons, recorded and replayed.
//!
//! Capture narration audio together with a timestamped log of slide changes
//! and pen strokes, store both as a lesson, and replay the lesson later with
//! strokes redrawn in lockstep with the audio clock.

pub mod capture;
pub mod commands;
pub mod config;
pub mod events;
pub mod lesson;
pub mod player;
pub mod recorder;
pub mod render;
pub mod utils;

pub use config::EngineConfig;
pub use utils::{AppError, AppResult, ErrorResponse};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG`; defaults to debug output for this crate. Calling it
/// again after a subscriber is installed has no effect.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lesson_studio=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Starting Lesson Studio v{}", env!("CARGO_PKG_VERSION"));
    }
}
