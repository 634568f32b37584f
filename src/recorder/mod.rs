//! Recording system module
//!
//! This module implements the capture side of a lesson:
//! - RecordingClock for the pause-aware recording timeline
//! - RecordingSession to turn UI input into annotation events
//! - AudioEncoder trait for the narration stream
//! - RecordingCoordinator to orchestrate both and finalize the artifact

pub mod channel;
pub mod clock;
pub mod coordinator;
pub mod input;
pub mod session;
pub mod state;

pub use channel::{AudioChunk, AudioEncoder, ChunkSink, RecordingError, RecordingResult};
pub use clock::{ManualTimeSource, RecordingClock, SystemTimeSource, TimeSource};
pub use coordinator::{RecordedLesson, RecordingCoordinator, RecordingEvent};
pub use input::{CaptureInput, InputQueue};
pub use session::{ActiveStroke, RecordingSession};
pub use state::{RecordingConfig, RecordingState, Tool, ToolStyle};
