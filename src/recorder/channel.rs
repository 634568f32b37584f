//! Audio channel abstraction
//!
//! The narration encoder is an external capability: it turns live input into
//! encoded byte chunks. The coordinator only drives its lifecycle and
//! collects whatever chunks it pushes into the sink.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Recording errors
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("No audio was captured; the recording was discarded")]
    NoAudioCaptured,

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

pub type RecordingResult<T> = Result<T, RecordingError>;

/// One encoded piece of the narration stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub data: Vec<u8>,
}

/// Where an encoder delivers its chunks
pub type ChunkSink = mpsc::UnboundedSender<AudioChunk>;

/// Lifecycle of an audio encoder
#[async_trait]
pub trait AudioEncoder: Send {
    /// Identifier for logging
    fn id(&self) -> &str;

    /// MIME type of the produced stream, e.g. `audio/webm`
    fn mime_type(&self) -> &str;

    /// Begin encoding, delivering chunks into `sink`
    async fn start(&mut self, sink: ChunkSink) -> RecordingResult<()>;

    /// Stop producing chunks until resumed
    async fn pause(&mut self) -> RecordingResult<()>;

    async fn resume(&mut self) -> RecordingResult<()>;

    /// Flush and release the sink
    async fn stop(&mut self) -> RecordingResult<()>;

    fn is_recording(&self) -> bool;
}
