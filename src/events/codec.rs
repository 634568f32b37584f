//! Newline-delimited JSON encoding of event logs
//!
//! One event per line, already in timestamp order. Parsing is line-by-line so
//! a single bad line never costs the rest of the lesson unless the caller asks
//! for strict loading.

use super::event::Event;
use super::log::EventLog;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

/// Event log codec errors
#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid event on line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
}

/// What to do with a line that does not parse as an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParsePolicy {
    /// Drop the line, warn, and record it in [`ParsedLog::dropped`]
    #[default]
    SkipInvalid,
    /// Reject the whole log on the first bad line
    Strict,
}

/// A line that was dropped while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedLine {
    /// 1-based line number in the source text
    pub line: usize,
    pub reason: String,
}

/// Result of parsing an NDJSON event log
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub log: EventLog,
    pub dropped: Vec<DroppedLine>,
}

impl ParsedLog {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Write events as NDJSON
pub fn write_ndjson<W: Write>(events: &[Event], mut writer: W) -> Result<(), LogError> {
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Serialize events to an NDJSON string
pub fn to_ndjson(events: &[Event]) -> Result<String, LogError> {
    let mut out = String::new();
    for event in events {
        out.push_str(&serde_json::to_string(event)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parse NDJSON text into an ordered event log
pub fn parse_ndjson(text: &str, policy: ParsePolicy) -> Result<ParsedLog, LogError> {
    let mut events = Vec::new();
    let mut dropped = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let parsed = serde_json::from_str::<Event>(line)
            .map_err(|e| e.to_string())
            .and_then(|event| event.validate().map(|_| event));

        match parsed {
            Ok(event) => events.push(event),
            Err(reason) => {
                let line_no = index + 1;
                if policy == ParsePolicy::Strict {
                    return Err(LogError::InvalidLine {
                        line: line_no,
                        reason,
                    });
                }
                tracing::warn!("Dropping event log line {}: {}", line_no, reason);
                dropped.push(DroppedLine {
                    line: line_no,
                    reason,
                });
            }
        }
    }

    if !dropped.is_empty() {
        tracing::warn!(
            "Loaded {} events, dropped {} malformed lines",
            events.len(),
            dropped.len()
        );
    }

    Ok(ParsedLog {
        log: EventLog::from_events(events),
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event::{CanvasPoint, Ink};

    fn sample() -> Vec<Event> {
        vec![
            Event::slide(0, 1),
            Event::stroke_start(500, CanvasPoint::capture(10.0, 10.0, 100, 100)),
            Event::stroke_point(
                520,
                CanvasPoint::capture(20.0, 20.0, 100, 100),
                Ink::Color("#f00".to_string()),
                3.0,
            ),
            Event::stroke_end(540),
        ]
    }

    #[test]
    fn test_one_event_per_line() {
        let text = to_ndjson(&sample()).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_captured_coordinates_survive_round_trip() {
        let mut events = vec![Event::slide(0, 1)];
        for (i, (width, height)) in [(1366, 768), (833, 611), (997, 541), (1920, 1080)]
            .into_iter()
            .enumerate()
        {
            for step in 1..40u32 {
                let point = CanvasPoint::capture(
                    step as f64 * 5.37,
                    step as f64 * 3.11,
                    width,
                    height,
                );
                events.push(Event::stroke_point(
                    (i * 100 + step as usize) as u64,
                    point,
                    Ink::Color("#000".to_string()),
                    2.0,
                ));
            }
        }

        let text = to_ndjson(&events).unwrap();
        let parsed = parse_ndjson(&text, ParsePolicy::Strict).unwrap();
        assert_eq!(parsed.log.events(), events.as_slice());
    }

    #[test]
    fn test_write_matches_to_string() {
        let mut buf = Vec::new();
        write_ndjson(&sample(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), to_ndjson(&sample()).unwrap());
    }

    #[test]
    fn test_skip_invalid_keeps_remainder() {
        let text = concat!(
            "{\"t\":0,\"type\":\"slide\",\"page\":1}\n",
            "\n",
            "not json at all\n",
            "{\"t\":5,\"type\":\"slide\",\"page\":0}\n",
            "{\"t\":10,\"type\":\"strokeEnd\"}\n",
        );

        let parsed = parse_ndjson(text, ParsePolicy::SkipInvalid).unwrap();
        assert_eq!(parsed.log.len(), 2);
        assert_eq!(parsed.dropped_count(), 2);
        assert_eq!(parsed.dropped[0].line, 3);
        assert_eq!(parsed.dropped[1].line, 4);
    }

    #[test]
    fn test_strict_rejects() {
        let text = "{\"t\":0,\"type\":\"slide\",\"page\":1}\n{\"t\":\"soon\"}\n";
        match parse_ndjson(text, ParsePolicy::Strict) {
            Err(LogError::InvalidLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected InvalidLine, got {:?}", other),
        }
    }

    #[test]
    fn test_handles_crlf() {
        let text = "{\"t\":0,\"type\":\"slide\",\"page\":1}\r\n{\"t\":3,\"type\":\"strokeEnd\"}\r\n";
        let parsed = parse_ndjson(text, ParsePolicy::Strict).unwrap();
        assert_eq!(parsed.log.len(), 2);
    }
}
