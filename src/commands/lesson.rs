//! Lesson library commands

use super::recording::RecorderState;
use super::to_response;
use crate::config::PlaybackConfig;
use crate::lesson::{self, LessonStore, OpenedLesson};
use crate::player::{LessonPlayer, PlayerHandle};
use crate::render::SlideRasterizer;
use crate::utils::ErrorResponse;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Application state for the lesson library
pub struct LibraryState {
    pub store: Arc<dyn LessonStore>,
    pub playback: PlaybackConfig,
    /// Slide rasterizer, if slides can be rendered on this host
    pub rasterizer: Option<Arc<dyn SlideRasterizer>>,
}

impl LibraryState {
    pub fn new(store: Arc<dyn LessonStore>, playback: PlaybackConfig) -> Self {
        Self {
            store,
            playback,
            rasterizer: None,
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn SlideRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }
}

/// Lesson details for the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
    pub duration_ms: u64,
    pub event_count: usize,
    pub dropped_lines: usize,
    pub audio_url: Option<String>,
    pub has_slides: bool,
}

impl From<&OpenedLesson> for LessonSummary {
    fn from(opened: &OpenedLesson) -> Self {
        let artifact = &opened.artifact;
        Self {
            id: artifact.id.clone(),
            title: artifact.title.clone(),
            duration_ms: artifact.duration_ms,
            event_count: artifact.events.len(),
            dropped_lines: opened.dropped.len(),
            audio_url: artifact.audio.url().map(str::to_string),
            has_slides: artifact.slide_document.is_some(),
        }
    }
}

/// Upload the last finished recording. Returns the stored lesson id.
///
/// The recording is kept if the upload fails so it can be retried.
pub async fn upload_lesson(
    recorder: &RecorderState,
    library: &LibraryState,
) -> Result<String, ErrorResponse> {
    let mut finished = recorder.finished.lock().await;
    let Some(recorded) = finished.as_ref() else {
        return Err(ErrorResponse {
            code: "NOTHING_TO_UPLOAD".to_string(),
            message: "No finished recording to upload".to_string(),
            retryable: false,
        });
    };

    let request = recorded.upload_request().map_err(to_response)?;
    let id = library.store.upload(request).await.map_err(to_response)?;

    *finished = None;
    Ok(id)
}

/// Fetch and parse a lesson
pub async fn open_lesson(library: &LibraryState, id: &str) -> Result<LessonSummary, ErrorResponse> {
    let opened = load(library, id).await?;
    Ok(LessonSummary::from(&opened))
}

/// Open a lesson and start its player loop
pub async fn play_lesson(library: &LibraryState, id: &str) -> Result<PlayerHandle, ErrorResponse> {
    let opened = load(library, id).await?;
    let player = LessonPlayer::new(opened.artifact, &library.playback, library.rasterizer.clone());
    Ok(PlayerHandle::spawn(player, 64))
}

async fn load(library: &LibraryState, id: &str) -> Result<OpenedLesson, ErrorResponse> {
    lesson::open_lesson(library.store.as_ref(), id, library.playback.parse_policy)
        .await
        .map_err(to_response)
}
