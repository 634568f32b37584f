//! Still-frame export

use super::player::fallback_aspect;
use super::sync::SyncEngine;
use super::PlayerError;
use crate::config::{canvas_size, PlaybackConfig};
use crate::lesson::LessonArtifact;
use crate::render::{
    compose, encode_png, parse_color, CancelToken, RasterImage, RasterRequest, SlideRasterizer,
    StrokeSurface,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

/// Compose the frame a viewer would see at `at_ms`
pub async fn render_frame_at(
    artifact: &LessonArtifact,
    config: &PlaybackConfig,
    rasterizer: Option<&dyn SlideRasterizer>,
    at_ms: u64,
    width: u32,
) -> Result<RasterImage, PlayerError> {
    let (w, h) = canvas_size(width, fallback_aspect(artifact, config));
    let mut overlay = StrokeSurface::new(w, h);
    let mut engine = SyncEngine::new(Arc::clone(&artifact.events));
    engine.advance_to(at_ms, &mut overlay);

    let mut slide = None;
    if let (Some(rasterizer), Some(document)) = (rasterizer, artifact.slide_document.as_ref()) {
        let request = RasterRequest {
            document: document.clone(),
            page: engine.current_slide(),
            width: w,
        };
        match rasterizer.rasterize(&request, &CancelToken::new()).await {
            Ok(image) => {
                if (image.width, image.height) != (w, h) {
                    overlay.resize(image.width, image.height);
                    engine.replay(&mut overlay);
                }
                slide = Some(image);
            }
            Err(e) => tracing::warn!("Exporting without slide {}: {}", request.page, e),
        }
    }

    let placeholder = parse_color(&config.placeholder_color).unwrap_or([255, 255, 255, 255]);
    Ok(compose(slide.as_ref(), overlay.image(), placeholder))
}

/// Render the frame at `at_ms` and write it as a PNG
pub async fn export_frame_png(
    artifact: &LessonArtifact,
    config: &PlaybackConfig,
    rasterizer: Option<&dyn SlideRasterizer>,
    at_ms: u64,
    width: u32,
    output: &Path,
) -> Result<RasterImage, PlayerError> {
    let frame = render_frame_at(artifact, config, rasterizer, at_ms, width).await?;

    let file = File::create(output)?;
    encode_png(&frame, BufWriter::new(file))?;

    tracing::info!(
        "Exported frame at {} ms ({}x{}) to {:?}",
        at_ms,
        frame.width,
        frame.height,
        output
    );
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CanvasPoint, Event, Ink};
    use crate::lesson::{AudioHandle, CanvasSize};
    use crate::render::decode_png;
    use chrono::Utc;
    use tempfile::tempdir;

    fn artifact() -> LessonArtifact {
        let at = |x, y| CanvasPoint::capture(x, y, 100, 100);
        LessonArtifact {
            id: "l".to_string(),
            title: "Export".to_string(),
            duration_ms: 1000,
            audio: AudioHandle::Remote {
                url: "file:///tmp/a.webm".to_string(),
            },
            events: vec![
                Event::slide(0, 1),
                Event::stroke_start(10, at(10.0, 50.0)),
                Event::stroke_point(20, at(90.0, 50.0), Ink::Color("#00f".into()), 6.0),
                Event::stroke_end(30),
            ]
            .into(),
            slide_document: None,
            created_at: Utc::now(),
            canvas: Some(CanvasSize {
                width: 100,
                height: 100,
            }),
        }
    }

    #[tokio::test]
    async fn test_export_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let frame = export_frame_png(&artifact(), &PlaybackConfig::default(), None, 500, 200, &path)
            .await
            .unwrap();
        assert_eq!((frame.width, frame.height), (200, 200));

        let decoded = decode_png(File::open(&path).unwrap()).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.pixel(100, 100), Some([0, 0, 255, 255]));
        assert_eq!(decoded.pixel(100, 10), Some([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn test_frame_before_first_stroke_is_blank() {
        let frame = render_frame_at(&artifact(), &PlaybackConfig::default(), None, 5, 50)
            .await
            .unwrap();
        assert!(frame.data.chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
    }
}
