//! Rasterizer over pre-rendered page images
//!
//! Serves slide decks exported as a directory of `page-N.png` files. The
//! document URL names the directory, either as a `file://` URL or a path.

use super::raster::{decode_png, RasterImage};
use super::slides::{CancelToken, RasterRequest, SlideRasterizer};
use super::RenderError;
use crate::utils::urls::local_path;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct PngPageRasterizer;

impl PngPageRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Location of a page image within a deck directory
    pub fn page_path(deck: &Path, page: u32) -> PathBuf {
        deck.join(format!("page-{}.png", page))
    }

    /// Number of consecutive `page-N.png` files starting at 1
    pub fn page_count(deck: &Path) -> u32 {
        let mut count = 0;
        while Self::page_path(deck, count + 1).is_file() {
            count += 1;
        }
        count
    }
}

#[async_trait]
impl SlideRasterizer for PngPageRasterizer {
    async fn rasterize(
        &self,
        request: &RasterRequest,
        cancel: &CancelToken,
    ) -> Result<RasterImage, RenderError> {
        let deck = local_path(&request.document.url)
            .ok_or_else(|| RenderError::UnsupportedDocument(request.document.url.clone()))?;
        if !deck.is_dir() {
            return Err(RenderError::UnsupportedDocument(format!(
                "{} is not a directory of page images",
                deck.display()
            )));
        }

        let path = Self::page_path(&deck, request.page);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderError::MissingPage(request.page));
            }
            Err(e) => return Err(e.into()),
        };
        cancel.check()?;

        let width = request.width;
        let image = tokio::task::spawn_blocking(move || {
            decode_png(bytes.as_slice()).map(|image| image.scaled_to_width(width))
        })
        .await
        .map_err(|e| RenderError::Task(e.to_string()))??;
        cancel.check()?;

        Ok(image)
    }
}
