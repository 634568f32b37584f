//! Shared helpers for integration tests

#![allow(dead_code)]

use chrono::Utc;
use lesson_studio::events::{CanvasPoint, Event, Ink};
use lesson_studio::lesson::{AudioHandle, CanvasSize, DocumentHandle, LessonArtifact};
use lesson_studio::render::{encode_png, PngPageRasterizer, RasterImage};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Point given only in raw canvas pixels
pub fn raw(x: f64, y: f64) -> CanvasPoint {
    CanvasPoint {
        x,
        y,
        nx: None,
        ny: None,
    }
}

/// Five-event log: slide 1, one short red stroke, then slide 2 at 1000 ms
pub fn example_events() -> Vec<Event> {
    vec![
        Event::slide(0, 1),
        Event::stroke_start(500, raw(10.0, 10.0)),
        Event::stroke_point(520, raw(20.0, 20.0), Ink::Color("#f00".to_string()), 3.0),
        Event::stroke_end(540),
        Event::slide(1000, 2),
    ]
}

pub fn artifact(events: Vec<Event>, slides: Option<DocumentHandle>) -> Arc<LessonArtifact> {
    Arc::new(LessonArtifact {
        id: "test-lesson".to_string(),
        title: "Test lesson".to_string(),
        duration_ms: events.last().map(|e| e.t).unwrap_or(0),
        audio: AudioHandle::Remote {
            url: "file:///dev/null".to_string(),
        },
        events: events.into(),
        slide_document: slides,
        created_at: Utc::now(),
        canvas: Some(CanvasSize {
            width: 800,
            height: 600,
        }),
    })
}

/// Write a deck of solid-colored `page-N.png` files; page N is `colors[N - 1]`
pub fn write_deck(dir: &Path, width: u32, height: u32, colors: &[[u8; 4]]) {
    std::fs::create_dir_all(dir).unwrap();
    for (index, color) in colors.iter().enumerate() {
        let image = RasterImage::filled(width, height, *color);
        let path = PngPageRasterizer::page_path(dir, index as u32 + 1);
        encode_png(&image, File::create(path).unwrap()).unwrap();
    }
}
