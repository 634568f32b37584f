//! Annotation event definitions
//!
//! These types define the wire format of one event log line.

use serde::{Deserialize, Deserializer, Serialize};

/// Color string that marks a stroke point as an eraser cut-out
pub const ERASER_SENTINEL: &str = "eraser";

/// A single timestamped annotation action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Milliseconds since recording start, excluding paused time
    #[serde(deserialize_with = "deserialize_millis")]
    pub t: u64,

    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    /// Active slide changed
    Slide { page: u32 },

    /// Pen down. No ink is laid until the first point arrives.
    StrokeStart {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nx: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ny: Option<f64>,
    },

    /// Segment from the previous point of the active stroke to this one
    StrokePoint {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nx: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ny: Option<f64>,
        color: Ink,
        width: f64,
    },

    /// Pen up
    StrokeEnd,
}

/// Stroke paint: a CSS-style color string or the eraser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Ink {
    Color(String),
    Eraser,
}

impl Ink {
    pub fn is_eraser(&self) -> bool {
        matches!(self, Ink::Eraser)
    }
}

impl From<String> for Ink {
    fn from(value: String) -> Self {
        if value == ERASER_SENTINEL {
            Ink::Eraser
        } else {
            Ink::Color(value)
        }
    }
}

impl From<Ink> for String {
    fn from(ink: Ink) -> Self {
        match ink {
            Ink::Color(color) => color,
            Ink::Eraser => ERASER_SENTINEL.to_string(),
        }
    }
}

/// Position of a pointer sample, normalized to the canvas it was captured on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPoint {
    /// Raw canvas pixels at record time
    pub x: f64,
    pub y: f64,
    /// Fraction of canvas width/height, `None` for logs that predate normalization
    pub nx: Option<f64>,
    pub ny: Option<f64>,
}

impl CanvasPoint {
    /// Build a point from raw pixels, normalizing against the capture canvas size
    pub fn capture(x: f64, y: f64, canvas_width: u32, canvas_height: u32) -> Self {
        let nx = if canvas_width > 0 {
            (x / canvas_width as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let ny = if canvas_height > 0 {
            (y / canvas_height as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            x,
            y,
            nx: Some(nx),
            ny: Some(ny),
        }
    }

    /// Pixel position on a surface of the given size.
    ///
    /// Normalized coordinates are canonical; raw coordinates are only used when
    /// the normalized pair is missing.
    pub fn to_pixels(&self, width: u32, height: u32) -> (f64, f64) {
        match (self.nx, self.ny) {
            (Some(nx), Some(ny)) => (nx * width as f64, ny * height as f64),
            _ => (self.x, self.y),
        }
    }
}

impl Event {
    pub fn slide(t: u64, page: u32) -> Self {
        Self {
            t,
            kind: EventKind::Slide { page },
        }
    }

    pub fn stroke_start(t: u64, at: CanvasPoint) -> Self {
        Self {
            t,
            kind: EventKind::StrokeStart {
                x: at.x,
                y: at.y,
                nx: at.nx,
                ny: at.ny,
            },
        }
    }

    pub fn stroke_point(t: u64, at: CanvasPoint, color: Ink, width: f64) -> Self {
        Self {
            t,
            kind: EventKind::StrokePoint {
                x: at.x,
                y: at.y,
                nx: at.nx,
                ny: at.ny,
                color,
                width,
            },
        }
    }

    pub fn stroke_end(t: u64) -> Self {
        Self {
            t,
            kind: EventKind::StrokeEnd,
        }
    }

    /// Pointer position carried by stroke start/point events
    pub fn point(&self) -> Option<CanvasPoint> {
        match self.kind {
            EventKind::StrokeStart { x, y, nx, ny } | EventKind::StrokePoint { x, y, nx, ny, .. } => {
                Some(CanvasPoint { x, y, nx, ny })
            }
            _ => None,
        }
    }

    /// Check the value constraints serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        match &self.kind {
            EventKind::Slide { page } if *page == 0 => Err("slide page must be positive".to_string()),
            EventKind::StrokePoint { width, .. } if !(width.is_finite() && *width > 0.0) => {
                Err(format!("stroke width must be a positive number, got {width}"))
            }
            EventKind::StrokeStart { x, y, nx, ny } | EventKind::StrokePoint { x, y, nx, ny, .. } => {
                let coords = [Some(*x), Some(*y), *nx, *ny];
                if coords.iter().flatten().all(|c| c.is_finite()) {
                    Ok(())
                } else {
                    Err("stroke coordinates must be finite".to_string())
                }
            }
            _ => Ok(()),
        }
    }
}

/// Accept integral or fractional millisecond values; fractions are rounded.
fn deserialize_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Whole(u64),
        Fraction(f64),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Whole(ms) => Ok(ms),
        Millis::Fraction(ms) if ms.is_finite() && ms >= 0.0 => Ok(ms.round() as u64),
        Millis::Fraction(ms) => Err(serde::de::Error::custom(format!(
            "timestamp must be a non-negative number, got {ms}"
        ))),
    }
}
