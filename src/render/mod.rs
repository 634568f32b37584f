//! Frame rendering
//!
//! A frame is the slide raster (or a placeholder) with the stroke overlay
//! composited on top. Slides are rasterized off the dispatch loop and can be
//! cancelled at any time.

pub mod color;
pub mod compositor;
pub mod pages;
pub mod raster;
pub mod slides;
pub mod surface;

pub use color::parse_color;
pub use compositor::compose;
pub use pages::PngPageRasterizer;
pub use raster::{decode_png, encode_png, RasterImage};
pub use slides::{CancelToken, RasterRequest, RenderedSlide, SlideRasterizer, SlideRenderer};
pub use surface::{DrawingSurface, StrokeSurface};

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG error: {0}")]
    Png(String),

    #[error("Render cancelled")]
    Cancelled,

    #[error("Unsupported slide document: {0}")]
    UnsupportedDocument(String),

    #[error("Slide page {0} not found")]
    MissingPage(u32),

    #[error("Render task failed: {0}")]
    Task(String),
}
