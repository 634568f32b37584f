//! Recording commands

use super::to_response;
use crate::config::CaptureConfig;
use crate::recorder::{
    AudioEncoder, CaptureInput, RecordedLesson, RecordingConfig, RecordingCoordinator,
    RecordingState, TimeSource,
};
use crate::utils::ErrorResponse;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state for recording
pub struct RecorderState {
    pub coordinator: Arc<Mutex<RecordingCoordinator>>,
    /// Last finished recording, held until it is uploaded
    pub finished: Arc<Mutex<Option<RecordedLesson>>>,
}

impl RecorderState {
    pub fn new(capture: CaptureConfig) -> Self {
        Self::from_coordinator(RecordingCoordinator::new(capture))
    }

    pub fn with_time_source(capture: CaptureConfig, time_source: Arc<dyn TimeSource>) -> Self {
        Self::from_coordinator(RecordingCoordinator::with_time_source(capture, time_source))
    }

    fn from_coordinator(coordinator: RecordingCoordinator) -> Self {
        Self {
            coordinator: Arc::new(Mutex::new(coordinator)),
            finished: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

/// What a finished recording produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSummary {
    pub lesson_id: String,
    pub title: String,
    pub duration_ms: u64,
    pub event_count: usize,
    pub audio_bytes: usize,
}

/// Start recording with the given narration encoder
pub async fn start_recording(
    state: &RecorderState,
    encoder: Box<dyn AudioEncoder>,
    config: RecordingConfig,
) -> Result<(), ErrorResponse> {
    let mut coordinator = state.coordinator.lock().await;
    coordinator.set_encoder(encoder).map_err(to_response)?;
    coordinator.start(config).await.map_err(to_response)
}

/// Queue one UI input and dispatch everything pending.
///
/// Returns the number of events emitted.
pub async fn submit_input(state: &RecorderState, input: CaptureInput) -> Result<usize, ErrorResponse> {
    let mut coordinator = state.coordinator.lock().await;
    coordinator.submit(input);
    Ok(coordinator.dispatch_pending())
}

/// Pause recording
pub async fn pause_recording(state: &RecorderState) -> Result<(), ErrorResponse> {
    let mut coordinator = state.coordinator.lock().await;
    coordinator.pause().await.map_err(to_response)
}

/// Resume recording
pub async fn resume_recording(state: &RecorderState) -> Result<(), ErrorResponse> {
    let mut coordinator = state.coordinator.lock().await;
    coordinator.resume().await.map_err(to_response)
}

/// Stop recording and keep the result for upload
pub async fn stop_recording(state: &RecorderState) -> Result<RecordingSummary, ErrorResponse> {
    let recorded = {
        let mut coordinator = state.coordinator.lock().await;
        coordinator.stop().await.map_err(to_response)?
    };

    let summary = RecordingSummary {
        lesson_id: recorded.artifact.id.clone(),
        title: recorded.artifact.title.clone(),
        duration_ms: recorded.artifact.duration_ms,
        event_count: recorded.artifact.events.len(),
        audio_bytes: match &recorded.artifact.audio {
            crate::lesson::AudioHandle::Captured { data, .. } => data.len(),
            crate::lesson::AudioHandle::Remote { .. } => 0,
        },
    };

    *state.finished.lock().await = Some(recorded);
    Ok(summary)
}

/// Get current recording state
pub async fn get_recording_state(state: &RecorderState) -> Result<RecordingState, ErrorResponse> {
    let coordinator = state.coordinator.lock().await;
    Ok(coordinator.state())
}

/// Get current recording duration in milliseconds
pub async fn get_recording_duration(state: &RecorderState) -> Result<u64, ErrorResponse> {
    let coordinator = state.coordinator.lock().await;
    Ok(coordinator.duration_ms())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FeedEncoder;
    use crate::recorder::ManualTimeSource;

    #[tokio::test]
    async fn test_recording_lifecycle() {
        let clock = Arc::new(ManualTimeSource::new(0));
        let state = RecorderState::with_time_source(CaptureConfig::default(), clock.clone());
        let (encoder, feed) = FeedEncoder::new("audio/webm");

        start_recording(&state, Box::new(encoder), RecordingConfig::whiteboard("Demo", 800, 600))
            .await
            .unwrap();
        assert_eq!(get_recording_state(&state).await.unwrap(), RecordingState::Recording);

        feed.push(vec![7; 32]);
        clock.advance(100);
        let emitted = submit_input(&state, CaptureInput::PointerDown { x: 10.0, y: 10.0 })
            .await
            .unwrap();
        assert_eq!(emitted, 1);
        clock.advance(50);
        submit_input(&state, CaptureInput::PointerMove { x: 20.0, y: 10.0 })
            .await
            .unwrap();
        assert_eq!(get_recording_duration(&state).await.unwrap(), 150);

        let summary = stop_recording(&state).await.unwrap();
        assert_eq!(summary.title, "Demo");
        assert_eq!(summary.audio_bytes, 32);
        assert_eq!(summary.event_count, 4);
        assert!(state.finished.lock().await.is_some());
        assert_eq!(get_recording_state(&state).await.unwrap(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn test_stop_without_audio_is_reported() {
        let state = RecorderState::default();
        let (encoder, _feed) = FeedEncoder::new("audio/webm");
        start_recording(&state, Box::new(encoder), RecordingConfig::whiteboard("Silent", 640, 480))
            .await
            .unwrap();

        let err = stop_recording(&state).await.unwrap_err();
        assert_eq!(err.code, "NO_AUDIO_CAPTURED");
        assert!(!err.retryable);
        assert!(state.finished.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_second_start_keeps_running_encoder() {
        let state = RecorderState::default();
        let (webm, feed) = FeedEncoder::new("audio/webm");
        start_recording(&state, Box::new(webm), RecordingConfig::whiteboard("First", 800, 600))
            .await
            .unwrap();

        let (ogg, _ogg_feed) = FeedEncoder::new("audio/ogg");
        let err = start_recording(&state, Box::new(ogg), RecordingConfig::whiteboard("Second", 800, 600))
            .await
            .unwrap_err();
        assert_eq!(err.code, "RECORDING_ERROR");

        feed.push(vec![1, 2, 3]);
        stop_recording(&state).await.unwrap();

        let finished = state.finished.lock().await;
        let request = finished.as_ref().unwrap().upload_request().unwrap();
        assert_eq!(request.title, "First");
        assert_eq!(request.audio_mime_type, "audio/webm");
        assert_eq!(request.audio, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_pause_when_idle_fails() {
        let state = RecorderState::default();
        let err = pause_recording(&state).await.unwrap_err();
        assert_eq!(err.code, "RECORDING_ERROR");
    }
}
