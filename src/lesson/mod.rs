//! Lesson artifacts and their storage
//!
//! A lesson is narration audio, an event log and an optional slide document.
//! Recordings are uploaded through a [`LessonStore`]; viewers open them by id.

pub mod bundle;
pub mod schema;
pub mod store;

pub use bundle::{BundleStore, StoreError, BUNDLE_EXTENSION};
pub use schema::{
    AudioHandle, CanvasSize, DocumentHandle, LessonArtifact, LessonManifest, LessonMeta,
    LessonRecord, UploadRequest,
};
pub use store::{open_lesson, LessonStore, OpenedLesson};
