//! Audio encoder fed by the host
//!
//! The host platform owns the microphone and its encoder; it pushes encoded
//! bytes through a [`ChunkFeed`]. The feed forwards them to the coordinator
//! while recording and drops them while paused or stopped, so the audio
//! stream and the event clock exclude the same intervals.

use crate::recorder::channel::{AudioChunk, AudioEncoder, ChunkSink, RecordingError, RecordingResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct FeedShared {
    sink: Option<ChunkSink>,
    paused: bool,
    dropped_chunks: usize,
}

/// Host-side handle for pushing encoded audio
#[derive(Debug, Clone)]
pub struct ChunkFeed {
    shared: Arc<Mutex<FeedShared>>,
}

impl ChunkFeed {
    /// Push one encoded chunk. Returns false if it was dropped.
    pub fn push(&self, data: Vec<u8>) -> bool {
        let mut shared = self.shared.lock();
        if data.is_empty() {
            return false;
        }
        let delivered = match (&shared.sink, shared.paused) {
            (Some(sink), false) => sink.send(AudioChunk { data }).is_ok(),
            _ => false,
        };
        if !delivered {
            shared.dropped_chunks += 1;
        }
        delivered
    }

    /// Chunks rejected because capture was paused or stopped
    pub fn dropped_chunks(&self) -> usize {
        self.shared.lock().dropped_chunks
    }
}

/// [`AudioEncoder`] whose chunks come from a [`ChunkFeed`]
#[derive(Debug)]
pub struct FeedEncoder {
    id: String,
    mime_type: String,
    shared: Arc<Mutex<FeedShared>>,
}

impl FeedEncoder {
    /// Create an encoder and the feed the host pushes into
    pub fn new(mime_type: impl Into<String>) -> (Self, ChunkFeed) {
        let shared = Arc::new(Mutex::new(FeedShared::default()));
        let encoder = Self {
            id: "narration".to_string(),
            mime_type: mime_type.into(),
            shared: Arc::clone(&shared),
        };
        (encoder, ChunkFeed { shared })
    }
}

#[async_trait]
impl AudioEncoder for FeedEncoder {
    fn id(&self) -> &str {
        &self.id
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    async fn start(&mut self, sink: ChunkSink) -> RecordingResult<()> {
        let mut shared = self.shared.lock();
        if shared.sink.is_some() {
            return Err(RecordingError::Encoder(format!(
                "encoder '{}' is already running",
                self.id
            )));
        }
        shared.sink = Some(sink);
        shared.paused = false;
        Ok(())
    }

    async fn pause(&mut self) -> RecordingResult<()> {
        self.shared.lock().paused = true;
        Ok(())
    }

    async fn resume(&mut self) -> RecordingResult<()> {
        self.shared.lock().paused = false;
        Ok(())
    }

    async fn stop(&mut self) -> RecordingResult<()> {
        let mut shared = self.shared.lock();
        shared.sink = None;
        shared.paused = false;
        Ok(())
    }

    fn is_recording(&self) -> bool {
        let shared = self.shared.lock();
        shared.sink.is_some() && !shared.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_feed_respects_pause() {
        let (mut encoder, feed) = FeedEncoder::new("audio/webm");
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(!feed.push(vec![0]), "nothing is accepted before start");

        encoder.start(tx).await.unwrap();
        assert!(feed.push(vec![1, 2]));

        encoder.pause().await.unwrap();
        assert!(!feed.push(vec![3]));

        encoder.resume().await.unwrap();
        assert!(feed.push(vec![4]));

        encoder.stop().await.unwrap();
        assert!(!feed.push(vec![5]));

        let mut received = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            received.push(chunk.data);
        }
        assert_eq!(received, vec![vec![1, 2], vec![4]]);
        assert_eq!(feed.dropped_chunks(), 3);
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let (mut encoder, _feed) = FeedEncoder::new("audio/webm");
        let (tx, _rx) = mpsc::unbounded_channel();
        encoder.start(tx.clone()).await.unwrap();
        assert!(encoder.start(tx).await.is_err());
    }
}
