//! Stroke overlay surface

use super::color::parse_color;
use super::compositor::blend_over;
use super::raster::RasterImage;
use crate::events::Ink;

const FALLBACK_INK: [u8; 4] = [0, 0, 0, 255];

/// What the sync engine draws on
pub trait DrawingSurface {
    /// Size in pixels
    fn size(&self) -> (u32, u32);

    /// Remove every stroke
    fn clear(&mut self);

    /// Draw one round-capped segment in pixel coordinates
    fn stroke_segment(&mut self, from: (f64, f64), to: (f64, f64), ink: &Ink, width: f64);
}

/// RGBA overlay holding only strokes; transparent where nothing is drawn
#[derive(Debug, Clone)]
pub struct StrokeSurface {
    image: RasterImage,
}

impl StrokeSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RasterImage::new(width, height),
        }
    }

    /// Change size. Content is dropped; callers replay strokes.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = RasterImage::new(width, height);
    }

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.pixel(x, y)
    }

    pub fn is_blank(&self) -> bool {
        self.image.data.chunks_exact(4).all(|p| p[3] == 0)
    }

    /// Source-over ink segment
    pub fn draw_segment(&mut self, from: (f64, f64), to: (f64, f64), color: [u8; 4], width: f64) {
        self.stamp(from, to, width, |px| blend_over(px, color));
    }

    /// Destination-out segment
    pub fn erase_segment(&mut self, from: (f64, f64), to: (f64, f64), width: f64) {
        self.stamp(from, to, width, |px| px.copy_from_slice(&[0, 0, 0, 0]));
    }

    /// Apply `paint` to every pixel whose center lies within `width / 2` of the segment
    fn stamp<F: FnMut(&mut [u8])>(&mut self, from: (f64, f64), to: (f64, f64), width: f64, mut paint: F) {
        let (w, h) = (self.image.width as i64, self.image.height as i64);
        if w == 0 || h == 0 || !width.is_finite() {
            return;
        }
        let radius = (width / 2.0).max(0.5);
        let radius_sq = radius * radius;

        let min_x = ((from.0.min(to.0) - radius).floor() as i64).max(0);
        let max_x = ((from.0.max(to.0) + radius).ceil() as i64).min(w - 1);
        let min_y = ((from.1.min(to.1) - radius).floor() as i64).max(0);
        let max_y = ((from.1.max(to.1) + radius).ceil() as i64).min(h - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len_sq = dx * dx + dy * dy;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let (cx, cy) = (px as f64 + 0.5, py as f64 + 0.5);
                let t = if len_sq > 0.0 {
                    (((cx - from.0) * dx + (cy - from.1) * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (ex, ey) = (from.0 + t * dx - cx, from.1 + t * dy - cy);
                if ex * ex + ey * ey <= radius_sq {
                    let idx = ((py * w + px) * 4) as usize;
                    paint(&mut self.image.data[idx..idx + 4]);
                }
            }
        }
    }
}

impl DrawingSurface for StrokeSurface {
    fn size(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }

    fn clear(&mut self) {
        self.image.data.fill(0);
    }

    fn stroke_segment(&mut self, from: (f64, f64), to: (f64, f64), ink: &Ink, width: f64) {
        match ink {
            Ink::Eraser => self.erase_segment(from, to, width),
            Ink::Color(value) => {
                let color = parse_color(value).unwrap_or_else(|| {
                    tracing::debug!("Unknown stroke color '{}', drawing in black", value);
                    FALLBACK_INK
                });
                self.draw_segment(from, to, color, width);
            }
        }
    }
}
