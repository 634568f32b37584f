//! Capture input queue
//!
//! Pointer, navigation and tool changes arrive from the UI as plain values and
//! are queued in arrival order. One dispatch loop drains the queue into the
//! recording session, so event emission never depends on host callback timing.

use super::state::Tool;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A single UI input to the capture pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CaptureInput {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    NextSlide,
    PreviousSlide,
    GoToSlide { page: u32 },
    SelectTool { tool: Tool },
    SetColor { color: String },
    SetPenWidth { width: f64 },
    SetEraserWidth { width: f64 },
    ResizeCanvas { width: u32, height: u32 },
}

/// FIFO of pending capture inputs
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: VecDeque<CaptureInput>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, input: CaptureInput) {
        self.pending.push_back(input);
    }

    pub fn pop(&mut self) -> Option<CaptureInput> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
