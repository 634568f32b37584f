//! Lesson player
//!
//! Owns the sync engine, the stroke overlay and the slide renderer for one
//! opened lesson. All mutation happens in the `on_*` handlers, which the
//! dispatch loop calls one at a time.

use super::sync::{SyncEngine, SyncOutcome};
use super::PlayerError;
use crate::config::{canvas_size, PlaybackConfig};
use crate::lesson::LessonArtifact;
use crate::render::{
    compose, parse_color, RasterImage, RenderError, RenderedSlide, SlideRasterizer, SlideRenderer,
    StrokeSurface,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// State of the narration media element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "reason")]
pub enum AudioStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Aspect ratio to use until a slide raster says otherwise
pub(crate) fn fallback_aspect(artifact: &LessonArtifact, config: &PlaybackConfig) -> f64 {
    artifact
        .canvas
        .and_then(|c| c.aspect_ratio())
        .unwrap_or(config.default_aspect_ratio)
}

pub struct LessonPlayer {
    artifact: Arc<LessonArtifact>,
    engine: SyncEngine,
    overlay: StrokeSurface,
    renderer: Option<SlideRenderer>,
    /// Raster of `raster_page`, when one has arrived
    slide_raster: Option<RasterImage>,
    raster_page: Option<u32>,
    canvas_width: u32,
    aspect_ratio: f64,
    placeholder: [u8; 4],
    tick_interval_ms: u64,
    audio: AudioStatus,
    closed: bool,
}

impl LessonPlayer {
    /// Player for `artifact`. Without a rasterizer or slide document the
    /// lesson plays on a plain placeholder.
    pub fn new(
        artifact: Arc<LessonArtifact>,
        config: &PlaybackConfig,
        rasterizer: Option<Arc<dyn SlideRasterizer>>,
    ) -> Self {
        let aspect_ratio = fallback_aspect(&artifact, config);
        let (width, height) = canvas_size(config.canvas_width, aspect_ratio);

        let renderer = match (rasterizer, artifact.slide_document.clone()) {
            (Some(rasterizer), Some(document)) => Some(SlideRenderer::new(rasterizer, document)),
            (None, Some(_)) => {
                tracing::warn!("No rasterizer available, lesson '{}' plays without slides", artifact.title);
                None
            }
            _ => None,
        };

        let placeholder = parse_color(&config.placeholder_color).unwrap_or([255, 255, 255, 255]);

        Self {
            engine: SyncEngine::new(Arc::clone(&artifact.events)),
            artifact,
            overlay: StrokeSurface::new(width, height),
            renderer,
            slide_raster: None,
            raster_page: None,
            canvas_width: width,
            aspect_ratio,
            placeholder,
            tick_interval_ms: config.tick_interval_ms,
            audio: AudioStatus::Loading,
            closed: false,
        }
    }

    /// Apply the events at t = 0 and render the first slide.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> SyncOutcome {
        let outcome = self.engine.advance_to(0, &mut self.overlay);
        self.request_render();
        tracing::info!(
            "Playing lesson '{}' from slide {}",
            self.artifact.title,
            self.engine.current_slide()
        );
        outcome
    }

    pub fn artifact(&self) -> &Arc<LessonArtifact> {
        &self.artifact
    }

    pub fn current_slide(&self) -> u32 {
        self.engine.current_slide()
    }

    pub fn position_ms(&self) -> u64 {
        self.engine.position_ms()
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.overlay.image().width, self.overlay.image().height)
    }

    pub fn overlay(&self) -> &StrokeSurface {
        &self.overlay
    }

    /// Raster of the current slide, once rendered
    pub fn slide_raster(&self) -> Option<&RasterImage> {
        match self.raster_page {
            Some(page) if page == self.engine.current_slide() => self.slide_raster.as_ref(),
            _ => None,
        }
    }

    /// Page whose render is in flight
    pub fn pending_render(&self) -> Option<u32> {
        self.renderer.as_ref().and_then(|r| r.pending_page())
    }

    pub fn audio_status(&self) -> &AudioStatus {
        &self.audio
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), PlayerError> {
        if self.closed {
            Err(PlayerError::Closed)
        } else {
            Ok(())
        }
    }

    /// Audio clock tick
    pub fn on_time_update(&mut self, position_ms: u64) -> Result<SyncOutcome, PlayerError> {
        self.ensure_open()?;
        if let AudioStatus::Failed(reason) = &self.audio {
            tracing::debug!("Ignoring tick at {} ms, audio unavailable: {}", position_ms, reason);
            return Ok(SyncOutcome::default());
        }

        let previous = self.engine.position_ms();
        if position_ms > previous.saturating_add(self.tick_interval_ms.saturating_mul(4)) {
            tracing::debug!("Tick jumped {} ms, catching up", position_ms - previous);
        }

        let outcome = self.engine.advance_to(position_ms, &mut self.overlay);
        if outcome.slide_changed.is_some() {
            self.request_render();
        }
        Ok(outcome)
    }

    /// Jump to a position. Cancels any in-flight render before resetting.
    pub fn seek(&mut self, position_ms: u64) -> Result<SyncOutcome, PlayerError> {
        self.ensure_open()?;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.cancel();
        }

        let outcome = self.engine.advance_to(position_ms, &mut self.overlay);
        tracing::debug!(
            "Seek to {} ms: slide {}, {} events applied, rewound: {}",
            position_ms,
            self.engine.current_slide(),
            outcome.applied,
            outcome.rewound
        );

        if self.raster_page != Some(self.engine.current_slide()) || outcome.slide_changed.is_some() {
            self.request_render();
        }
        Ok(outcome)
    }

    /// New display width; height follows the slide's aspect ratio
    pub fn resize(&mut self, width: u32) -> Result<(), PlayerError> {
        self.ensure_open()?;
        let (width, height) = canvas_size(width, self.aspect_ratio);
        if (width, height) == self.canvas_size() {
            return Ok(());
        }

        self.canvas_width = width;
        self.overlay.resize(width, height);
        self.engine.replay(&mut self.overlay);
        self.request_render();
        Ok(())
    }

    /// The media element can play
    pub fn on_audio_ready(&mut self) {
        if self.audio != AudioStatus::Ready {
            tracing::info!("Audio ready for lesson '{}'", self.artifact.title);
        }
        self.audio = AudioStatus::Ready;
    }

    /// The media element failed to load. Ticks are ignored until it recovers.
    pub fn on_audio_failed(&mut self, reason: impl Into<String>) -> PlayerError {
        let reason = reason.into();
        tracing::warn!("Audio unavailable for lesson '{}': {}", self.artifact.title, reason);
        self.audio = AudioStatus::Failed(reason.clone());
        PlayerError::AudioUnavailable(reason)
    }

    /// Apply completions that have already arrived. Returns how many were applied.
    pub fn poll_renders(&mut self) -> usize {
        let mut applied = 0;
        while let Some(done) = self.renderer.as_mut().and_then(|r| r.try_next()) {
            if self.apply_render(done) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next render completion. Never resolves without slides.
    pub async fn next_render(&mut self) -> Option<RenderedSlide> {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.next().await,
            None => std::future::pending().await,
        }
    }

    /// Install a completed render. Returns whether the frame changed.
    pub fn apply_render(&mut self, done: RenderedSlide) -> bool {
        if done.page != self.engine.current_slide() {
            return false;
        }

        let image = match done.result {
            Ok(image) => image,
            Err(RenderError::Cancelled) => return false,
            Err(e) => {
                tracing::warn!("Slide {} failed to render: {}", done.page, e);
                self.slide_raster = None;
                self.raster_page = Some(done.page);
                return false;
            }
        };

        if let Some(ratio) = image.aspect_ratio() {
            self.aspect_ratio = ratio;
        }
        if (image.width, image.height) != self.canvas_size() {
            // Keep normalized coordinates valid: overlay follows the raster
            self.canvas_width = image.width;
            self.overlay.resize(image.width, image.height);
            self.engine.replay(&mut self.overlay);
        }

        self.slide_raster = Some(image);
        self.raster_page = Some(done.page);
        true
    }

    /// Composed frame: slide (or placeholder) with strokes on top
    pub fn frame(&self) -> RasterImage {
        compose(self.slide_raster(), self.overlay.image(), self.placeholder)
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.cancel();
        }
        self.closed = true;
        tracing::info!("Closed lesson '{}'", self.artifact.title);
    }

    fn request_render(&mut self) {
        let page = self.engine.current_slide();
        let width = self.canvas_width;
        if let Some(renderer) = self.renderer.as_mut() {
            self.slide_raster = None;
            self.raster_page = None;
            renderer.request(page, width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CanvasPoint, Event, Ink};
    use crate::lesson::{AudioHandle, CanvasSize, DocumentHandle};
    use crate::render::{CancelToken, RasterRequest};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;

    struct SolidRasterizer;

    #[async_trait]
    impl SlideRasterizer for SolidRasterizer {
        async fn rasterize(
            &self,
            request: &RasterRequest,
            cancel: &CancelToken,
        ) -> Result<RasterImage, RenderError> {
            cancel.check()?;
            Ok(RasterImage::filled(
                request.width,
                request.width * 9 / 16,
                [0, 0, request.page as u8 * 10, 255],
            ))
        }
    }

    fn artifact(with_slides: bool) -> Arc<LessonArtifact> {
        let at = |x, y| CanvasPoint::capture(x, y, 400, 300);
        Arc::new(LessonArtifact {
            id: "lesson".to_string(),
            title: "Triangles".to_string(),
            duration_ms: 3000,
            audio: AudioHandle::Remote {
                url: "file:///tmp/audio.webm".to_string(),
            },
            events: vec![
                Event::slide(0, 1),
                Event::stroke_start(100, at(100.0, 100.0)),
                Event::stroke_point(150, at(200.0, 100.0), Ink::Color("#000".into()), 4.0),
                Event::stroke_end(200),
                Event::slide(2000, 2),
            ]
            .into(),
            slide_document: with_slides.then(|| DocumentHandle::new("mem://deck")),
            created_at: Utc::now(),
            canvas: Some(CanvasSize {
                width: 400,
                height: 300,
            }),
        })
    }

    fn config() -> PlaybackConfig {
        PlaybackConfig {
            canvas_width: 400,
            ..PlaybackConfig::default()
        }
    }

    #[test]
    fn test_stroke_only_playback() {
        let mut player = LessonPlayer::new(artifact(false), &config(), None);
        player.start();
        assert_eq!(player.canvas_size(), (400, 300));

        player.on_time_update(250).unwrap();
        assert!(!player.overlay().is_blank());
        assert_eq!(player.frame().pixel(150, 100), Some([0, 0, 0, 255]));
        assert_eq!(player.frame().pixel(10, 10), Some([255, 255, 255, 255]));

        let outcome = player.on_time_update(2100).unwrap();
        assert_eq!(outcome.slide_changed, Some(2));
        assert!(player.overlay().is_blank());
        assert_eq!(player.pending_render(), None);
    }

    #[test]
    fn test_ticks_ignored_while_audio_failed() {
        let mut player = LessonPlayer::new(artifact(false), &config(), None);
        player.start();

        let err = player.on_audio_failed("network error");
        assert!(err.is_retryable());
        let outcome = player.on_time_update(2500).unwrap();
        assert_eq!(outcome.applied, 0);
        assert_eq!(player.current_slide(), 1);

        player.on_audio_ready();
        player.on_time_update(2500).unwrap();
        assert_eq!(player.current_slide(), 2);
    }

    #[test]
    fn test_closed_player_rejects_input() {
        let mut player = LessonPlayer::new(artifact(false), &config(), None);
        player.close();
        assert!(matches!(player.on_time_update(10), Err(PlayerError::Closed)));
        assert!(matches!(player.seek(10), Err(PlayerError::Closed)));
    }

    #[tokio::test]
    async fn test_raster_resizes_overlay_and_replays() {
        let mut player = LessonPlayer::new(artifact(true), &config(), Some(Arc::new(SolidRasterizer)));
        player.start();
        player.on_time_update(250).unwrap();

        let done = tokio::time::timeout(Duration::from_secs(1), player.next_render())
            .await
            .unwrap()
            .unwrap();
        assert!(player.apply_render(done));

        // 16:9 raster replaces the 4:3 guess
        assert_eq!(player.canvas_size(), (400, 225));
        assert!(!player.overlay().is_blank());
        assert_eq!(player.frame().pixel(10, 10), Some([0, 0, 10, 255]));
        assert_eq!(player.frame().pixel(150, 75), Some([0, 0, 0, 255]));
    }

    #[tokio::test]
    async fn test_seek_back_cancels_and_rerenders() {
        let mut player = LessonPlayer::new(artifact(true), &config(), Some(Arc::new(SolidRasterizer)));
        player.start();
        player.on_time_update(2100).unwrap();
        assert_eq!(player.pending_render(), Some(2));

        let outcome = player.seek(120).unwrap();
        assert!(outcome.rewound);
        assert_eq!(outcome.slide_changed, Some(1));
        assert_eq!(player.pending_render(), Some(1));

        let done = tokio::time::timeout(Duration::from_secs(1), player.next_render())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.page, 1);
        assert!(player.apply_render(done));
        assert_eq!(player.slide_raster().map(|r| r.pixel(0, 0)), Some(Some([0, 0, 10, 255])));
    }
}
