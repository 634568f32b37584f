//! Recording state management
//!
//! Defines the recording state machine, per-recording configuration and the
//! tool style applied to captured strokes.

use crate::config::CaptureConfig;
use crate::events::Ink;
use crate::lesson::schema::DocumentHandle;
use serde::{Deserialize, Serialize};

/// Current state of the recording system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Currently recording
    Recording,
    /// Recording is paused
    Paused,
    /// Recording finalized (or discarded)
    Stopped,
}

/// Configuration for starting a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingConfig {
    /// Lesson title
    pub title: String,

    /// Owner the finished lesson is uploaded for
    pub owner_id: String,

    /// Pages in the slide document (1 for a blank whiteboard)
    pub page_count: u32,

    /// Page shown when recording starts
    #[serde(default = "default_initial_page")]
    pub initial_page: u32,

    /// Capture canvas size in pixels, the basis for normalized coordinates
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Slide document shown during the recording
    #[serde(default)]
    pub slide_document: Option<DocumentHandle>,
}

fn default_initial_page() -> u32 {
    1
}

impl RecordingConfig {
    /// A blank single-page whiteboard
    pub fn whiteboard(title: impl Into<String>, canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            title: title.into(),
            owner_id: String::new(),
            page_count: 1,
            initial_page: 1,
            canvas_width,
            canvas_height,
            slide_document: None,
        }
    }

    /// Page count with a floor of one page
    pub fn page_count(&self) -> u32 {
        self.page_count.max(1)
    }
}

/// Drawing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

/// Style stamped onto every captured stroke point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStyle {
    pub tool: Tool,
    pub color: String,
    pub pen_width: f64,
    pub eraser_width: f64,
}

impl From<&CaptureConfig> for ToolStyle {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            tool: Tool::Pen,
            color: config.pen_color.clone(),
            pen_width: config.pen_width,
            eraser_width: config.eraser_width,
        }
    }
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self::from(&CaptureConfig::default())
    }
}

impl ToolStyle {
    /// Ink for the active tool
    pub fn ink(&self) -> Ink {
        match self.tool {
            Tool::Pen => Ink::Color(self.color.clone()),
            Tool::Eraser => Ink::Eraser,
        }
    }

    /// Width for the active tool; the eraser is floored at twice the pen width
    pub fn stroke_width(&self) -> f64 {
        match self.tool {
            Tool::Pen => self.pen_width,
            Tool::Eraser => self.eraser_width.max(self.pen_width * 2.0),
        }
    }
}
