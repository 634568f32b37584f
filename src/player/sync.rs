//! Sync engine
//!
//! Reconstructs the drawing state at an arbitrary audio position. Moving
//! forward applies the events in `(previous, target]`; moving backward clears
//! the surface and replays from the start, so the result never depends on the
//! path taken to reach a position.

use super::cursor::PlaybackCursor;
use crate::events::{first_slide_page, Event, EventKind};
use crate::render::DrawingSurface;
use std::sync::Arc;

/// What one `advance_to` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOutcome {
    /// Events applied during this call
    pub applied: usize,
    /// Whether the cursor was reset before applying
    pub rewound: bool,
    /// New page, if the net slide changed during this call
    pub slide_changed: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SyncEngine {
    events: Arc<[Event]>,
    first_slide: u32,
    cursor: PlaybackCursor,
    position_ms: u64,
}

impl SyncEngine {
    /// Engine over a time-ordered event log
    pub fn new(events: Arc<[Event]>) -> Self {
        let first_slide = first_slide_page(&events);
        Self {
            events,
            first_slide,
            cursor: PlaybackCursor::new(first_slide),
            position_ms: 0,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn current_slide(&self) -> u32 {
        self.cursor.current_slide
    }

    /// Target of the last `advance_to`
    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    /// Whether every event has been applied
    pub fn is_finished(&self) -> bool {
        self.cursor.last_applied_index >= self.events.len()
    }

    /// Back to the state before any event
    pub fn reset(&mut self, surface: &mut dyn DrawingSurface) {
        surface.clear();
        self.cursor.reset(self.first_slide);
    }

    /// Bring the surface to the state at `target_ms`
    pub fn advance_to(&mut self, target_ms: u64, surface: &mut dyn DrawingSurface) -> SyncOutcome {
        let slide_before = self.cursor.current_slide;
        let mut outcome = SyncOutcome::default();

        let index = self.cursor.last_applied_index;
        if index > 0 && self.events[index - 1].t > target_ms {
            tracing::debug!("Rewinding from event {} to {} ms", index, target_ms);
            self.reset(surface);
            outcome.rewound = true;
        }

        while let Some(event) = self.events.get(self.cursor.last_applied_index) {
            if event.t > target_ms {
                break;
            }
            apply(&mut self.cursor, event, surface);
            self.cursor.last_applied_index += 1;
            outcome.applied += 1;
        }

        self.position_ms = target_ms;
        if self.cursor.current_slide != slide_before {
            outcome.slide_changed = Some(self.cursor.current_slide);
        }
        outcome
    }

    /// Redraw from scratch at the current position, e.g. after a resize
    pub fn replay(&mut self, surface: &mut dyn DrawingSurface) -> SyncOutcome {
        let slide_before = self.cursor.current_slide;
        self.reset(surface);
        let mut outcome = self.advance_to(self.position_ms, surface);
        outcome.rewound = true;
        outcome.slide_changed = (self.cursor.current_slide != slide_before)
            .then_some(self.cursor.current_slide);
        outcome
    }
}

fn apply(cursor: &mut PlaybackCursor, event: &Event, surface: &mut dyn DrawingSurface) {
    let (width, height) = surface.size();

    match &event.kind {
        EventKind::Slide { page } => {
            // A new slide starts with an empty overlay, even if the page repeats
            cursor.current_slide = *page;
            cursor.active_stroke = None;
            surface.clear();
        }
        EventKind::StrokeStart { .. } => {
            cursor.active_stroke = event.point();
        }
        EventKind::StrokePoint {
            color, width: pen, ..
        } => {
            // Points outside a stroke carry no segment to draw
            let (Some(from), Some(point)) = (cursor.active_stroke, event.point()) else {
                return;
            };
            surface.stroke_segment(
                from.to_pixels(width, height),
                point.to_pixels(width, height),
                color,
                *pen,
            );
            cursor.active_stroke = Some(point);
        }
        EventKind::StrokeEnd => {
            cursor.active_stroke = None;
        }
    }
}
