//! Playback cursor

use crate::events::CanvasPoint;

/// How far into the event log playback has progressed
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackCursor {
    /// Number of events already applied
    pub last_applied_index: usize,
    /// Page currently shown
    pub current_slide: u32,
    /// Last point of the stroke being drawn, if the pen is down
    pub active_stroke: Option<CanvasPoint>,
}

impl PlaybackCursor {
    pub fn new(first_slide: u32) -> Self {
        Self {
            last_applied_index: 0,
            current_slide: first_slide,
            active_stroke: None,
        }
    }

    pub fn reset(&mut self, first_slide: u32) {
        *self = Self::new(first_slide);
    }
}

impl Default for PlaybackCursor {
    fn default() -> Self {
        Self::new(1)
    }
}
