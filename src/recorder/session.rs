//! Live recording session
//!
//! Owns the pause-aware clock, the stroke/slide bookkeeping and the event log
//! for one recording. Input that cannot produce a valid event (a pointer-up
//! with no open stroke, a move while paused) is dropped silently; capture
//! never fails.

use super::clock::{RecordingClock, TimeSource};
use super::input::CaptureInput;
use super::state::{RecordingConfig, RecordingState, ToolStyle};
use crate::events::{CanvasPoint, Event, EventLog};
use std::sync::Arc;

/// Stroke currently under the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveStroke {
    pub started_at: u64,
    pub points: usize,
}

/// Recorder-side state for one recording
#[derive(Debug)]
pub struct RecordingSession {
    status: RecordingState,
    clock: RecordingClock,
    page_count: u32,
    current_slide: u32,
    last_emitted_slide: u32,
    current_stroke: Option<ActiveStroke>,
    canvas_width: u32,
    canvas_height: u32,
    style: ToolStyle,
    log: EventLog,
}

impl RecordingSession {
    /// Start a session; the initial slide is logged at `t = 0`
    pub fn start(config: &RecordingConfig, style: ToolStyle, source: Arc<dyn TimeSource>) -> Self {
        let page_count = config.page_count();
        let initial_page = config.initial_page.clamp(1, page_count);

        let mut log = EventLog::new();
        log.append(Event::slide(0, initial_page));

        tracing::debug!(
            "Recording session started on page {}/{} ({}x{})",
            initial_page,
            page_count,
            config.canvas_width,
            config.canvas_height
        );

        Self {
            status: RecordingState::Recording,
            clock: RecordingClock::start(source),
            page_count,
            current_slide: initial_page,
            last_emitted_slide: initial_page,
            current_stroke: None,
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            style,
            log,
        }
    }

    pub fn status(&self) -> RecordingState {
        self.status
    }

    pub fn current_slide(&self) -> u32 {
        self.current_slide
    }

    pub fn active_stroke(&self) -> Option<ActiveStroke> {
        self.current_stroke
    }

    pub fn style(&self) -> &ToolStyle {
        &self.style
    }

    pub fn events(&self) -> &[Event] {
        self.log.events()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now()
    }

    pub fn clock(&self) -> &RecordingClock {
        &self.clock
    }

    /// Pause capture. Any open stroke is closed at the pause instant.
    ///
    /// Returns false if the session was not recording.
    pub fn pause(&mut self) -> bool {
        if self.status != RecordingState::Recording {
            return false;
        }
        self.close_stroke();
        self.clock.pause();
        self.status = RecordingState::Paused;
        true
    }

    /// Resume capture. Returns false if the session was not paused.
    pub fn resume(&mut self) -> bool {
        if self.status != RecordingState::Paused {
            return false;
        }
        self.clock.resume();
        self.status = RecordingState::Recording;

        // Navigation while paused is logged now so playback lands on the same page
        if self.current_slide != self.last_emitted_slide {
            self.emit_slide();
        }
        true
    }

    /// Apply one input. Returns the number of events emitted.
    pub fn handle(&mut self, input: CaptureInput) -> usize {
        if self.status == RecordingState::Stopped {
            return 0;
        }
        let before = self.log.len();

        match input {
            CaptureInput::PointerDown { x, y } => self.pointer_down(x, y),
            CaptureInput::PointerMove { x, y } => self.pointer_move(x, y),
            CaptureInput::PointerUp => {
                if self.is_capturing() {
                    self.close_stroke();
                }
            }
            CaptureInput::NextSlide => self.navigate(self.current_slide.saturating_add(1)),
            CaptureInput::PreviousSlide => self.navigate(self.current_slide.saturating_sub(1)),
            CaptureInput::GoToSlide { page } => self.navigate(page),
            CaptureInput::SelectTool { tool } => self.style.tool = tool,
            CaptureInput::SetColor { color } => self.style.color = color,
            CaptureInput::SetPenWidth { width } => {
                if width.is_finite() && width > 0.0 {
                    self.style.pen_width = width;
                }
            }
            CaptureInput::SetEraserWidth { width } => {
                if width.is_finite() && width > 0.0 {
                    self.style.eraser_width = width;
                }
            }
            CaptureInput::ResizeCanvas { width, height } => {
                if width > 0 && height > 0 {
                    self.canvas_width = width;
                    self.canvas_height = height;
                }
            }
        }

        self.log.len() - before
    }

    /// Finalize the session, closing any open stroke.
    ///
    /// Returns the event log and the recorded duration.
    pub fn finish(mut self) -> (EventLog, u64) {
        if self.status == RecordingState::Recording {
            self.close_stroke();
        }
        self.status = RecordingState::Stopped;
        let duration_ms = self.clock.now().max(self.log.last_t().unwrap_or(0));
        (self.log, duration_ms)
    }

    fn is_capturing(&self) -> bool {
        self.status == RecordingState::Recording
    }

    fn point(&self, x: f64, y: f64) -> Option<CanvasPoint> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        Some(CanvasPoint::capture(x, y, self.canvas_width, self.canvas_height))
    }

    fn pointer_down(&mut self, x: f64, y: f64) {
        if !self.is_capturing() {
            return;
        }
        let Some(at) = self.point(x, y) else {
            return;
        };
        self.close_stroke();

        let t = self.clock.now();
        self.log.append(Event::stroke_start(t, at));
        self.current_stroke = Some(ActiveStroke {
            started_at: t,
            points: 0,
        });
    }

    fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.is_capturing() {
            return;
        }
        let Some(at) = self.point(x, y) else {
            return;
        };
        let Some(stroke) = self.current_stroke.as_mut() else {
            return;
        };
        stroke.points += 1;

        let t = self.clock.now();
        self.log
            .append(Event::stroke_point(t, at, self.style.ink(), self.style.stroke_width()));
    }

    fn close_stroke(&mut self) {
        if self.current_stroke.take().is_some() {
            let t = self.clock.now();
            self.log.append(Event::stroke_end(t));
        }
    }

    fn navigate(&mut self, page: u32) {
        let page = page.clamp(1, self.page_count);
        if page == self.current_slide {
            return;
        }
        self.current_slide = page;

        if self.is_capturing() {
            self.close_stroke();
            self.emit_slide();
        }
    }

    fn emit_slide(&mut self) {
        let t = self.clock.now();
        self.log.append(Event::slide(t, self.current_slide));
        self.last_emitted_slide = self.current_slide;
    }
}
