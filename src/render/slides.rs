//! Asynchronous, cancellable slide rasterization
//!
//! At most one render is in flight. Requesting a new page cancels the previous
//! task, and every completion carries the generation it was requested under so
//! a late result for a stale page is discarded instead of painted.

use super::raster::RasterImage;
use super::RenderError;
use crate::lesson::DocumentHandle;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Cooperative cancellation flag shared with a rasterizer
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancelled, for use with `?`
    pub fn check(&self) -> Result<(), RenderError> {
        if self.is_cancelled() {
            Err(RenderError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterRequest {
    pub document: DocumentHandle,
    /// 1-based page number
    pub page: u32,
    /// Target width in pixels; height follows the page's aspect ratio
    pub width: u32,
}

/// Turns one page of a slide document into pixels
#[async_trait]
pub trait SlideRasterizer: Send + Sync {
    async fn rasterize(
        &self,
        request: &RasterRequest,
        cancel: &CancelToken,
    ) -> Result<RasterImage, RenderError>;
}

/// Completed render
#[derive(Debug)]
pub struct RenderedSlide {
    pub page: u32,
    pub generation: u64,
    pub result: Result<RasterImage, RenderError>,
}

struct InFlight {
    page: u32,
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

/// Owner of the single in-flight slide render
pub struct SlideRenderer {
    rasterizer: Arc<dyn SlideRasterizer>,
    document: DocumentHandle,
    generation: u64,
    in_flight: Option<InFlight>,
    done_tx: mpsc::UnboundedSender<RenderedSlide>,
    done_rx: mpsc::UnboundedReceiver<RenderedSlide>,
}

impl SlideRenderer {
    pub fn new(rasterizer: Arc<dyn SlideRasterizer>, document: DocumentHandle) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            rasterizer,
            document,
            generation: 0,
            in_flight: None,
            done_tx,
            done_rx,
        }
    }

    pub fn document(&self) -> &DocumentHandle {
        &self.document
    }

    /// Generation of the most recent request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Page currently being rendered, if any
    pub fn pending_page(&self) -> Option<u32> {
        self.in_flight.as_ref().map(|f| f.page)
    }

    /// Start rendering `page`, cancelling whatever was in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&mut self, page: u32, width: u32) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        let cancel = CancelToken::new();
        let request = RasterRequest {
            document: self.document.clone(),
            page,
            width,
        };
        let rasterizer = Arc::clone(&self.rasterizer);
        let task_cancel = cancel.clone();
        let tx = self.done_tx.clone();

        tracing::debug!("Rendering slide {} at {}px (generation {})", page, width, generation);

        let handle = tokio::spawn(async move {
            let result = rasterizer.rasterize(&request, &task_cancel).await;
            if task_cancel.is_cancelled() {
                return;
            }
            let _ = tx.send(RenderedSlide {
                page,
                generation,
                result,
            });
        });

        self.in_flight = Some(InFlight {
            page,
            cancel,
            handle,
        });
        generation
    }

    /// Cancel the in-flight render, if any
    pub fn cancel(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            tracing::debug!("Cancelling render of slide {}", flight.page);
            flight.cancel.cancel();
            flight.handle.abort();
        }
    }

    fn accept(&mut self, done: RenderedSlide) -> Option<RenderedSlide> {
        if done.generation != self.generation {
            tracing::debug!(
                "Discarding stale render of slide {} (generation {} < {})",
                done.page,
                done.generation,
                self.generation
            );
            return None;
        }
        self.in_flight = None;
        Some(done)
    }

    /// Next current-generation completion that has already arrived
    pub fn try_next(&mut self) -> Option<RenderedSlide> {
        while let Ok(done) = self.done_rx.try_recv() {
            if let Some(done) = self.accept(done) {
                return Some(done);
            }
        }
        None
    }

    /// Wait for the next current-generation completion. Cancel-safe.
    pub async fn next(&mut self) -> Option<RenderedSlide> {
        loop {
            let done = self.done_rx.recv().await?;
            if let Some(done) = self.accept(done) {
                return Some(done);
            }
        }
    }
}

impl Drop for SlideRenderer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Renders a solid page whose red channel is the page number
    struct GatedRasterizer {
        gate: Arc<Notify>,
        blocked_page: u32,
    }

    #[async_trait]
    impl SlideRasterizer for GatedRasterizer {
        async fn rasterize(
            &self,
            request: &RasterRequest,
            cancel: &CancelToken,
        ) -> Result<RasterImage, RenderError> {
            if request.page == self.blocked_page {
                self.gate.notified().await;
            }
            cancel.check()?;
            Ok(RasterImage::filled(
                request.width,
                request.width / 2,
                [request.page as u8, 0, 0, 255],
            ))
        }
    }

    fn renderer(blocked_page: u32) -> (SlideRenderer, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let rasterizer = GatedRasterizer {
            gate: Arc::clone(&gate),
            blocked_page,
        };
        (
            SlideRenderer::new(Arc::new(rasterizer), DocumentHandle::new("mem://deck")),
            gate,
        )
    }

    #[tokio::test]
    async fn test_render_completes() {
        let (mut renderer, _gate) = renderer(0);
        let generation = renderer.request(3, 100);

        let done = tokio::time::timeout(Duration::from_secs(1), renderer.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.page, 3);
        assert_eq!(done.generation, generation);
        let image = done.result.unwrap();
        assert_eq!((image.width, image.height), (100, 50));
        assert_eq!(renderer.pending_page(), None);
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_stale_page() {
        let (mut renderer, gate) = renderer(1);

        renderer.request(1, 100);
        assert_eq!(renderer.pending_page(), Some(1));
        renderer.request(2, 100);
        gate.notify_waiters();

        let done = tokio::time::timeout(Duration::from_secs(1), renderer.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.page, 2);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(renderer.try_next().is_none(), "page 1 must never be delivered");
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(token.check().is_ok());
        shared.cancel();
        assert!(matches!(token.check(), Err(RenderError::Cancelled)));
    }
}
