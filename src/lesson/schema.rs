//! Lesson schema definitions
//!
//! The finalized artifact a recording produces and the records exchanged with
//! a lesson store.

use crate::events::Event;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Meta Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonMeta {
    pub version: String,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

impl Default for LessonMeta {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "lesson-v1".to_string(),
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Media Handles
// =============================================================================

/// Where a lesson's narration lives
#[derive(Debug, Clone, PartialEq)]
pub enum AudioHandle {
    /// Hosted audio, streamed by the viewer's media element
    Remote { url: String },
    /// Audio captured by a finished recording, not yet uploaded
    Captured { mime_type: String, data: Arc<[u8]> },
}

impl AudioHandle {
    pub fn url(&self) -> Option<&str> {
        match self {
            AudioHandle::Remote { url } => Some(url),
            AudioHandle::Captured { .. } => None,
        }
    }
}

/// Slide document handed to the rasterizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHandle {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

impl DocumentHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_count: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Width / height, if both are non-zero
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.width > 0 && self.height > 0).then(|| self.width as f64 / self.height as f64)
    }
}

// =============================================================================
// Artifact
// =============================================================================

/// Finalized, immutable lesson: narration, event log and optional slides.
///
/// Shared between players behind an `Arc`; nothing mutates it after creation.
#[derive(Debug, Clone)]
pub struct LessonArtifact {
    pub id: String,
    pub title: String,
    pub duration_ms: u64,
    pub audio: AudioHandle,
    pub events: Arc<[Event]>,
    pub slide_document: Option<DocumentHandle>,
    pub created_at: DateTime<Utc>,
    /// Canvas the lesson was drawn on, when known
    pub canvas: Option<CanvasSize>,
}

// =============================================================================
// Store Records
// =============================================================================

/// Lesson metadata persisted next to the media (`lesson.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    pub duration_ms: u64,
    pub audio_file: String,
    pub audio_mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slides_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasSize>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to persist a finished recording
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub owner_id: String,
    pub duration_ms: u64,
    pub audio: Vec<u8>,
    pub audio_mime_type: String,
    /// Serialized event log (NDJSON)
    pub events: String,
    pub slide_document: Option<DocumentHandle>,
    pub canvas: Option<CanvasSize>,
}

/// Fetch contract: where a stored lesson's parts can be retrieved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonManifest {
    pub id: String,
    pub title: String,
    pub duration: u64,
    pub audio_url: String,
    pub events_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasSize>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
