//! Annotation event log
//!
//! The event log is the portable half of a lesson: every slide change and
//! stroke segment, stamped with the recording clock, serialized as
//! newline-delimited JSON.

pub mod codec;
pub mod event;
pub mod log;

pub use codec::{parse_ndjson, to_ndjson, write_ndjson, DroppedLine, LogError, ParsePolicy, ParsedLog};
pub use event::{CanvasPoint, Event, EventKind, Ink, ERASER_SENTINEL};
pub use log::{first_slide_page, EventLog};
