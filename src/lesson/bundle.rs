//! Lesson bundle read/write operations
//!
//! A bundle is a directory `<id>.lesson` containing:
//! - meta.json: Version and format
//! - lesson.json: Lesson record (title, owner, duration, media file names)
//! - events.ndjson: The event log
//! - audio.<ext>: Captured narration
//! - slides.<ext> or slides/: Optional slide document

use super::schema::{LessonManifest, LessonMeta, LessonRecord, UploadRequest};
use super::store::LessonStore;
use crate::utils::urls::{file_url, is_remote, local_path};
use async_trait::async_trait;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Get the bundle extension
pub const BUNDLE_EXTENSION: &str = "lesson";

const RECORD_FILE: &str = "lesson.json";
const META_FILE: &str = "meta.json";
const EVENTS_FILE: &str = "events.ndjson";

/// Lesson store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("Missing required file: {0}")]
    MissingFile(String),

    #[error("Lesson not found: {0}")]
    NotFound(String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("Store task failed: {0}")]
    Task(String),
}

/// Media bytes and files written alongside a lesson record
pub struct BundleContents<'a> {
    pub audio: &'a [u8],
    pub events: &'a str,
    /// Local slide document (file or directory of page images) to copy in
    pub slides: Option<&'a Path>,
}

/// File extension for an audio MIME type (`audio/webm;codecs=opus` -> `webm`)
pub fn audio_extension(mime_type: &str) -> &'static str {
    let essence = mime_type.split(';').next().unwrap_or("").trim();
    match essence.to_ascii_lowercase().as_str() {
        "audio/webm" | "video/webm" => "webm",
        "audio/ogg" | "audio/opus" => "ogg",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/mp4" | "audio/aac" | "audio/x-m4a" => "m4a",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        _ => "bin",
    }
}

/// Write a lesson to a bundle directory
pub fn write_lesson(
    record: &LessonRecord,
    contents: &BundleContents<'_>,
    bundle_path: &Path,
) -> Result<(), StoreError> {
    if !bundle_path.exists() {
        fs::create_dir_all(bundle_path)?;
    }

    fs::write(bundle_path.join(&record.audio_file), contents.audio)?;
    fs::write(bundle_path.join(EVENTS_FILE), contents.events)?;

    if let (Some(source), Some(target)) = (contents.slides, record.slides_file.as_deref()) {
        if !is_remote(target) {
            copy_slides(source, &bundle_path.join(target))?;
        }
    }

    let meta_content = serde_json::to_string_pretty(&LessonMeta::default())?;
    fs::write(bundle_path.join(META_FILE), meta_content)?;

    // Record goes last so a half-written bundle never looks valid
    let record_content = serde_json::to_string_pretty(record)?;
    fs::write(bundle_path.join(RECORD_FILE), record_content)?;

    tracing::debug!("Saved lesson '{}' to {:?}", record.title, bundle_path);

    Ok(())
}

fn copy_slides(source: &Path, target: &Path) -> Result<(), StoreError> {
    if source.is_dir() {
        fs::create_dir_all(target)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::copy(entry.path(), target.join(entry.file_name()))?;
            }
        }
    } else if source.is_file() {
        fs::copy(source, target)?;
    } else {
        return Err(StoreError::MissingFile(source.display().to_string()));
    }
    Ok(())
}

/// Read a lesson record from a bundle directory
pub fn read_record(bundle_path: &Path) -> Result<LessonRecord, StoreError> {
    if !bundle_path.is_dir() {
        return Err(StoreError::InvalidBundle(
            "Path is not a directory".to_string(),
        ));
    }

    let record_path = bundle_path.join(RECORD_FILE);
    if !record_path.exists() {
        return Err(StoreError::MissingFile(RECORD_FILE.to_string()));
    }

    let content = fs::read_to_string(&record_path)?;
    let record: LessonRecord = serde_json::from_str(&content)?;

    tracing::debug!("Loaded lesson '{}' from {:?}", record.title, bundle_path);

    Ok(record)
}

/// Read bundle metadata
pub fn read_meta(bundle_path: &Path) -> Result<LessonMeta, StoreError> {
    let meta_path = bundle_path.join(META_FILE);

    if !meta_path.exists() {
        return Err(StoreError::MissingFile(META_FILE.to_string()));
    }

    let content = fs::read_to_string(&meta_path)?;
    let meta: LessonMeta = serde_json::from_str(&content)?;

    Ok(meta)
}

/// Check if a path is a valid lesson bundle
pub fn is_valid_bundle(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }

    path.join(RECORD_FILE).exists() && path.join(EVENTS_FILE).exists()
}

// =============================================================================
// Filesystem Store
// =============================================================================

/// [`LessonStore`] over a directory of `<id>.lesson` bundles
#[derive(Debug, Clone)]
pub struct BundleStore {
    root: PathBuf,
}

impl BundleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Bundle directory for a lesson id
    pub fn bundle_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StoreError::InvalidBundle(format!("Invalid lesson id '{}'", id)));
        }
        Ok(self.root.join(format!("{}.{}", id, BUNDLE_EXTENSION)))
    }

    /// Ids of every valid bundle under the root
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_bundle = path.extension().and_then(|e| e.to_str()) == Some(BUNDLE_EXTENSION);
            if is_bundle && is_valid_bundle(&path) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn upload_blocking(&self, request: UploadRequest) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let bundle_path = self.bundle_path(&id)?;

        let audio_file = format!("audio.{}", audio_extension(&request.audio_mime_type));

        // Local documents are copied in; remote ones are referenced by URL
        let mut slides_source = None;
        let slides_file = match &request.slide_document {
            Some(doc) if is_remote(&doc.url) => Some(doc.url.clone()),
            Some(doc) => {
                let source = local_path(&doc.url)
                    .ok_or_else(|| StoreError::UnsupportedUrl(doc.url.clone()))?;
                let name = if source.is_dir() {
                    "slides".to_string()
                } else {
                    let ext = source
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("pdf");
                    format!("slides.{}", ext)
                };
                slides_source = Some(source);
                Some(name)
            }
            None => None,
        };

        let record = LessonRecord {
            id: id.clone(),
            title: request.title,
            owner_id: request.owner_id,
            duration_ms: request.duration_ms,
            audio_file,
            audio_mime_type: request.audio_mime_type,
            slides_file,
            canvas: request.canvas,
            created_at: Utc::now(),
        };

        let contents = BundleContents {
            audio: &request.audio,
            events: &request.events,
            slides: slides_source.as_deref(),
        };

        if let Err(e) = write_lesson(&record, &contents, &bundle_path) {
            // Leave no partial bundle behind
            let _ = fs::remove_dir_all(&bundle_path);
            return Err(e);
        }

        tracing::info!("Stored lesson {} ({} ms)", id, record.duration_ms);
        Ok(id)
    }

    fn fetch_blocking(&self, id: &str) -> Result<LessonManifest, StoreError> {
        let bundle_path = self.bundle_path(id)?;
        if !is_valid_bundle(&bundle_path) {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let record = read_record(&bundle_path)?;
        let pdf_url = record.slides_file.as_deref().map(|slides| {
            if is_remote(slides) {
                slides.to_string()
            } else {
                file_url(&bundle_path.join(slides))
            }
        });

        Ok(LessonManifest {
            id: record.id,
            title: record.title,
            duration: record.duration_ms,
            audio_url: file_url(&bundle_path.join(&record.audio_file)),
            events_url: file_url(&bundle_path.join(EVENTS_FILE)),
            pdf_url,
            canvas: record.canvas,
            created_at: record.created_at,
        })
    }
}

#[async_trait]
impl LessonStore for BundleStore {
    async fn upload(&self, request: UploadRequest) -> Result<String, StoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.upload_blocking(request))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    async fn fetch(&self, id: &str) -> Result<LessonManifest, StoreError> {
        let store = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || store.fetch_blocking(&id))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    async fn fetch_text(&self, url: &str) -> Result<String, StoreError> {
        let path = local_path(url).ok_or_else(|| StoreError::UnsupportedUrl(url.to_string()))?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::MissingFile(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
