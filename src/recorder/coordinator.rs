//! Recording coordinator
//!
//! Orchestrates the narration encoder and the annotation session and manages
//! the recording lifecycle.

use super::channel::{AudioChunk, AudioEncoder, RecordingError, RecordingResult};
use super::clock::{SystemTimeSource, TimeSource};
use super::input::{CaptureInput, InputQueue};
use super::session::RecordingSession;
use super::state::{RecordingConfig, RecordingState, ToolStyle};
use crate::config::CaptureConfig;
use crate::events::{to_ndjson, Event, LogError};
use crate::lesson::schema::{AudioHandle, CanvasSize, LessonArtifact, UploadRequest};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

/// Events emitted during recording
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingEvent {
    /// Recording started
    Started,
    /// Recording stopped and finalized
    Stopped { duration_ms: u64 },
    /// Recording stopped but nothing usable was produced
    Discarded { reason: String },
    /// Recording paused
    Paused,
    /// Recording resumed
    Resumed,
    /// Recording progress update (duration in ms)
    Progress(u64),
}

/// A finished recording, ready to upload
#[derive(Debug, Clone)]
pub struct RecordedLesson {
    pub artifact: LessonArtifact,
    pub owner_id: String,
}

impl RecordedLesson {
    /// Build the upload submission for this recording
    pub fn upload_request(&self) -> Result<UploadRequest, LogError> {
        let (audio, audio_mime_type) = match &self.artifact.audio {
            AudioHandle::Captured { mime_type, data } => (data.to_vec(), mime_type.clone()),
            AudioHandle::Remote { .. } => (Vec::new(), String::new()),
        };

        Ok(UploadRequest {
            title: self.artifact.title.clone(),
            owner_id: self.owner_id.clone(),
            duration_ms: self.artifact.duration_ms,
            audio,
            audio_mime_type,
            events: to_ndjson(&self.artifact.events)?,
            slide_document: self.artifact.slide_document.clone(),
            canvas: self.artifact.canvas,
        })
    }
}

/// Drives one recording at a time
pub struct RecordingCoordinator {
    /// Current recording state
    state: RecordingState,

    /// Narration encoder
    encoder: Option<Box<dyn AudioEncoder>>,

    /// Live annotation session
    session: Option<RecordingSession>,

    /// Configuration of the live recording
    config: Option<RecordingConfig>,

    /// Defaults for new sessions' tool style
    capture_config: CaptureConfig,

    /// Wall clock for new sessions
    time_source: Arc<dyn TimeSource>,

    /// UI input not yet applied to the session
    inputs: InputQueue,

    /// Chunks delivered by the encoder
    audio_rx: Option<mpsc::UnboundedReceiver<AudioChunk>>,
    audio: Vec<u8>,

    /// Event broadcaster
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl RecordingCoordinator {
    /// Create a new recording coordinator
    pub fn new(capture_config: CaptureConfig) -> Self {
        Self::with_time_source(capture_config, Arc::new(SystemTimeSource::new()))
    }

    /// Create a coordinator on an explicit wall clock
    pub fn with_time_source(capture_config: CaptureConfig, time_source: Arc<dyn TimeSource>) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            state: RecordingState::Idle,
            encoder: None,
            session: None,
            config: None,
            capture_config,
            time_source,
            inputs: InputQueue::new(),
            audio_rx: None,
            audio: Vec::new(),
            event_tx,
        }
    }

    /// Set the narration encoder used by the next recording.
    ///
    /// The encoder of a live recording cannot be replaced.
    pub fn set_encoder(&mut self, encoder: Box<dyn AudioEncoder>) -> RecordingResult<()> {
        if self.is_live() {
            tracing::warn!("Rejecting encoder {} during a live recording", encoder.id());
            return Err(RecordingError::AlreadyRecording);
        }
        tracing::info!("Using audio encoder: {}", encoder.id());
        self.encoder = Some(encoder);
        Ok(())
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    fn is_live(&self) -> bool {
        matches!(self.state, RecordingState::Recording | RecordingState::Paused)
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    /// Events captured so far, including inputs already dispatched
    pub fn events(&self) -> &[Event] {
        self.session.as_ref().map(|s| s.events()).unwrap_or(&[])
    }

    /// Bytes of narration received so far
    pub fn audio_bytes(&self) -> usize {
        self.audio.len()
    }

    /// Start recording
    pub async fn start(&mut self, config: RecordingConfig) -> RecordingResult<()> {
        if self.is_live() {
            return Err(RecordingError::AlreadyRecording);
        }
        if config.canvas_width == 0 || config.canvas_height == 0 {
            return Err(RecordingError::ConfigurationError(
                "canvas size must be non-zero".to_string(),
            ));
        }
        let encoder = self.encoder.as_mut().ok_or_else(|| {
            RecordingError::ConfigurationError("no audio encoder configured".to_string())
        })?;

        tracing::info!("Starting recording '{}' ({} pages)", config.title, config.page_count());

        let (audio_tx, audio_rx) = mpsc::unbounded_channel();
        encoder.start(audio_tx).await?;

        self.audio_rx = Some(audio_rx);
        self.audio.clear();
        self.inputs.clear();
        self.session = Some(RecordingSession::start(
            &config,
            ToolStyle::from(&self.capture_config),
            Arc::clone(&self.time_source),
        ));
        self.config = Some(config);

        self.state = RecordingState::Recording;
        let _ = self.event_tx.send(RecordingEvent::Started);

        tracing::info!("Recording started");
        Ok(())
    }

    /// Queue a UI input for the next dispatch
    pub fn submit(&mut self, input: CaptureInput) {
        self.inputs.push(input);
    }

    /// Apply queued inputs in order and collect delivered audio.
    ///
    /// Returns the number of events emitted.
    pub fn dispatch_pending(&mut self) -> usize {
        self.collect_audio();

        let Some(session) = self.session.as_mut() else {
            if !self.inputs.is_empty() {
                tracing::debug!("Dropping {} inputs with no active recording", self.inputs.len());
                self.inputs.clear();
            }
            return 0;
        };

        let mut emitted = 0;
        while let Some(input) = self.inputs.pop() {
            emitted += session.handle(input);
        }

        if emitted > 0 {
            tracing::debug!("Dispatched inputs, {} new events", emitted);
            let _ = self
                .event_tx
                .send(RecordingEvent::Progress(session.elapsed_ms()));
        }
        emitted
    }

    /// Pause recording. Pausing while already paused is a no-op.
    pub async fn pause(&mut self) -> RecordingResult<()> {
        match self.state {
            RecordingState::Paused => return Ok(()),
            RecordingState::Recording => {}
            _ => return Err(RecordingError::NotRecording),
        }

        tracing::info!("Pausing recording");

        // Input that arrived before the pause still belongs to the recording
        self.dispatch_pending();
        // The session follows the encoder, so a failed pause leaves both live
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.pause().await?;
        }
        if let Some(session) = self.session.as_mut() {
            session.pause();
        }

        self.state = RecordingState::Paused;
        let _ = self.event_tx.send(RecordingEvent::Paused);

        Ok(())
    }

    /// Resume recording. Resuming while recording is a no-op.
    pub async fn resume(&mut self) -> RecordingResult<()> {
        match self.state {
            RecordingState::Recording => return Ok(()),
            RecordingState::Paused => {}
            _ => return Err(RecordingError::NotRecording),
        }

        tracing::info!("Resuming recording");

        self.dispatch_pending();
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.resume().await?;
        }
        if let Some(session) = self.session.as_mut() {
            session.resume();
        }

        self.state = RecordingState::Recording;
        let _ = self.event_tx.send(RecordingEvent::Resumed);

        Ok(())
    }

    /// Stop recording and finalize the lesson artifact.
    ///
    /// A recording with no captured audio is discarded and reported as
    /// [`RecordingError::NoAudioCaptured`].
    pub async fn stop(&mut self) -> RecordingResult<RecordedLesson> {
        if !self.is_live() {
            return Err(RecordingError::NotRecording);
        }

        tracing::info!("Stopping recording");

        self.dispatch_pending();

        let mime_type = match self.encoder.as_mut() {
            Some(encoder) => {
                encoder.stop().await?;
                encoder.mime_type().to_string()
            }
            None => String::new(),
        };
        self.collect_audio();
        self.audio_rx = None;

        let session = self.session.take().ok_or(RecordingError::NotRecording)?;
        let config = self.config.take().ok_or(RecordingError::NotRecording)?;
        let (log, duration_ms) = session.finish();
        let audio = std::mem::take(&mut self.audio);

        self.state = RecordingState::Stopped;

        if audio.is_empty() {
            tracing::warn!(
                "Discarding recording '{}': no audio captured ({} events dropped)",
                config.title,
                log.len()
            );
            let _ = self.event_tx.send(RecordingEvent::Discarded {
                reason: RecordingError::NoAudioCaptured.to_string(),
            });
            self.state = RecordingState::Idle;
            return Err(RecordingError::NoAudioCaptured);
        }

        let artifact = LessonArtifact {
            id: Uuid::new_v4().to_string(),
            title: config.title,
            duration_ms,
            audio: AudioHandle::Captured {
                mime_type,
                data: audio.into(),
            },
            events: log.into_events().into(),
            slide_document: config.slide_document,
            created_at: Utc::now(),
            canvas: Some(CanvasSize {
                width: config.canvas_width,
                height: config.canvas_height,
            }),
        };

        let _ = self.event_tx.send(RecordingEvent::Stopped { duration_ms });

        // Reset state
        self.state = RecordingState::Idle;

        tracing::info!(
            "Recording stopped. Duration: {}ms, {} events",
            duration_ms,
            artifact.events.len()
        );
        Ok(RecordedLesson {
            artifact,
            owner_id: config.owner_id,
        })
    }

    /// Get recording duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.session.as_ref().map(|s| s.elapsed_ms()).unwrap_or(0)
    }

    fn collect_audio(&mut self) {
        let Some(rx) = self.audio_rx.as_mut() else {
            return;
        };
        while let Ok(chunk) = rx.try_recv() {
            self.audio.extend_from_slice(&chunk.data);
        }
    }
}

impl Default for RecordingCoordinator {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}
