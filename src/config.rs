//! Engine configuration
//!
//! Defaults are tuned for a browser-sized whiteboard. A JSON file can override
//! any subset of fields; missing fields keep their defaults.

use crate::events::ParsePolicy;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Capture
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureConfig {
    /// Initial pen color
    pub pen_color: String,
    /// Initial pen width in canvas pixels
    pub pen_width: f64,
    /// Requested eraser width; never narrower than twice the pen
    pub eraser_width: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            pen_color: "#000000".to_string(),
            pen_width: 3.0,
            eraser_width: 20.0,
        }
    }
}

// =============================================================================
// Playback
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackConfig {
    /// Expected spacing of audio time-update ticks
    pub tick_interval_ms: u64,
    /// Canvas width used before the first slide raster arrives
    pub canvas_width: u32,
    /// Width / height ratio used when no slide document is available
    pub default_aspect_ratio: f64,
    /// Base layer color when there is no slide raster
    pub placeholder_color: String,
    /// How to treat malformed event log lines
    pub parse_policy: ParsePolicy,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            canvas_width: 960,
            default_aspect_ratio: 4.0 / 3.0,
            placeholder_color: "#ffffff".to_string(),
            parse_policy: ParsePolicy::default(),
        }
    }
}

impl PlaybackConfig {
    /// Canvas size for a given width at the default aspect ratio
    pub fn default_canvas(&self, width: u32) -> (u32, u32) {
        canvas_size(width, self.default_aspect_ratio)
    }
}

/// Height for `width` at `aspect_ratio` (width / height), at least one pixel
pub fn canvas_size(width: u32, aspect_ratio: f64) -> (u32, u32) {
    let width = width.max(1);
    let ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        4.0 / 3.0
    };
    let height = (width as f64 / ratio).round().max(1.0) as u32;
    (width, height)
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub capture: CaptureConfig,
    pub playback: PlaybackConfig,
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        tracing::debug!("Loaded engine config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"capture":{"penWidth":5},"playback":{"parsePolicy":"strict"}}"#)
            .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.capture.pen_width, 5.0);
        assert_eq!(config.capture.pen_color, "#000000");
        assert_eq!(config.playback.parse_policy, ParsePolicy::Strict);
        assert_eq!(config.playback.tick_interval_ms, 200);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = EngineConfig::load(Path::new("/nonexistent/engine.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_canvas_size() {
        assert_eq!(canvas_size(800, 4.0 / 3.0), (800, 600));
        assert_eq!(canvas_size(800, 0.0), (800, 600));
        assert_eq!(canvas_size(0, 2.0), (1, 1));
    }
}
