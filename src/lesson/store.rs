//! Lesson storage contract and lesson loading

use super::bundle::StoreError;
use super::schema::{AudioHandle, DocumentHandle, LessonArtifact, LessonManifest, UploadRequest};
use crate::events::{parse_ndjson, DroppedLine, ParsePolicy};
use crate::utils::AppResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Upload/fetch contract of a lesson host
#[async_trait]
pub trait LessonStore: Send + Sync {
    /// Persist a finished recording, returning its lesson id
    async fn upload(&self, request: UploadRequest) -> Result<String, StoreError>;

    /// Resolve a lesson id to the locations of its parts
    async fn fetch(&self, id: &str) -> Result<LessonManifest, StoreError>;

    /// Fetch a text resource (the event log) by URL
    async fn fetch_text(&self, url: &str) -> Result<String, StoreError>;
}

/// A lesson ready for playback
#[derive(Debug, Clone)]
pub struct OpenedLesson {
    pub artifact: Arc<LessonArtifact>,
    /// Event log lines skipped while parsing
    pub dropped: Vec<DroppedLine>,
}

/// Fetch a lesson's manifest and event log and assemble the artifact
pub async fn open_lesson(
    store: &dyn LessonStore,
    id: &str,
    policy: ParsePolicy,
) -> AppResult<OpenedLesson> {
    let manifest = store.fetch(id).await?;
    let text = store.fetch_text(&manifest.events_url).await?;
    let parsed = parse_ndjson(&text, policy)?;

    if !parsed.dropped.is_empty() {
        tracing::warn!(
            "Lesson {} loaded with {} unreadable event line(s)",
            id,
            parsed.dropped_count()
        );
    }

    let events = parsed.log.into_events();
    tracing::info!(
        "Opened lesson '{}' ({} events, {} ms)",
        manifest.title,
        events.len(),
        manifest.duration
    );

    let artifact = LessonArtifact {
        id: manifest.id,
        title: manifest.title,
        duration_ms: manifest.duration,
        audio: AudioHandle::Remote {
            url: manifest.audio_url,
        },
        events: events.into(),
        slide_document: manifest.pdf_url.map(DocumentHandle::new),
        created_at: manifest.created_at,
        canvas: manifest.canvas,
    };

    Ok(OpenedLesson {
        artifact: Arc::new(artifact),
        dropped: parsed.dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::utils::AppError;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory store keyed by URL
    #[derive(Default)]
    struct MemoryStore {
        manifests: Mutex<HashMap<String, LessonManifest>>,
        texts: Mutex<HashMap<String, String>>,
    }

    impl MemoryStore {
        fn with_lesson(events: &str) -> Self {
            let store = Self::default();
            store.manifests.lock().insert(
                "l1".to_string(),
                LessonManifest {
                    id: "l1".to_string(),
                    title: "Vectors".to_string(),
                    duration: 4000,
                    audio_url: "https://media.example.com/l1.webm".to_string(),
                    events_url: "mem://l1/events".to_string(),
                    pdf_url: Some("https://media.example.com/l1.pdf".to_string()),
                    canvas: None,
                    created_at: chrono::Utc::now(),
                },
            );
            store
                .texts
                .lock()
                .insert("mem://l1/events".to_string(), events.to_string());
            store
        }
    }

    #[async_trait]
    impl LessonStore for MemoryStore {
        async fn upload(&self, _request: UploadRequest) -> Result<String, StoreError> {
            Err(StoreError::Task("read-only".to_string()))
        }

        async fn fetch(&self, id: &str) -> Result<LessonManifest, StoreError> {
            self.manifests
                .lock()
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }

        async fn fetch_text(&self, url: &str) -> Result<String, StoreError> {
            self.texts
                .lock()
                .get(url)
                .cloned()
                .ok_or_else(|| StoreError::MissingFile(url.to_string()))
        }
    }

    const LOG: &str = concat!(
        "{\"t\":0,\"type\":\"slide\",\"page\":1}\n",
        "not json\n",
        "{\"t\":900,\"type\":\"slide\",\"page\":2}\n",
    );

    #[tokio::test]
    async fn test_open_lesson_builds_artifact() {
        let store = MemoryStore::with_lesson(LOG);
        let opened = open_lesson(&store, "l1", ParsePolicy::SkipInvalid).await.unwrap();

        let artifact = &opened.artifact;
        assert_eq!(artifact.title, "Vectors");
        assert_eq!(artifact.events.len(), 2);
        assert!(matches!(artifact.events[1].kind, EventKind::Slide { page: 2 }));
        assert_eq!(artifact.audio.url(), Some("https://media.example.com/l1.webm"));
        assert_eq!(
            artifact.slide_document.as_ref().map(|d| d.url.as_str()),
            Some("https://media.example.com/l1.pdf")
        );
        assert_eq!(opened.dropped.len(), 1);
        assert_eq!(opened.dropped[0].line, 2);
    }

    #[tokio::test]
    async fn test_open_lesson_strict_policy_rejects() {
        let store = MemoryStore::with_lesson(LOG);
        let err = open_lesson(&store, "l1", ParsePolicy::Strict).await.unwrap_err();
        assert!(matches!(err, AppError::EventLog(_)));
    }

    #[tokio::test]
    async fn test_open_unknown_lesson() {
        let store = MemoryStore::default();
        let err = open_lesson(&store, "nope", ParsePolicy::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::NotFound(_))));
    }
}
