//! Append-only, time-ordered event storage.

use super::event::{Event, EventKind};

/// Append-only sequence of annotation events, ordered by `t`.
///
/// Ties keep emission order. The recorder owns one of these while a session
/// is live; once finalized it is frozen into the lesson artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from events of unknown order.
    ///
    /// The sort is stable so equal timestamps keep their original order.
    pub fn from_events(mut events: Vec<Event>) -> Self {
        if !events.windows(2).all(|w| w[0].t <= w[1].t) {
            tracing::warn!("Event log out of order; sorting {} events by timestamp", events.len());
            events.sort_by_key(|e| e.t);
        }
        Self { events }
    }

    /// Append an event.
    ///
    /// A timestamp earlier than the last appended one is raised to it so the
    /// log never goes backwards.
    pub fn append(&mut self, mut event: Event) {
        if let Some(last_t) = self.last_t() {
            if event.t < last_t {
                tracing::warn!(
                    "Clamping event timestamp {}ms to preserve ordering (last {}ms)",
                    event.t,
                    last_t
                );
                event.t = last_t;
            }
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_t(&self) -> Option<u64> {
        self.events.last().map(|e| e.t)
    }

    /// Page of the last `Slide` event, if any
    pub fn last_slide_page(&self) -> Option<u32> {
        self.events.iter().rev().find_map(|e| match e.kind {
            EventKind::Slide { page } => Some(page),
            _ => None,
        })
    }
}

/// Page the player starts on: the first `Slide` event's page, or 1.
pub fn first_slide_page(events: &[Event]) -> u32 {
    events
        .iter()
        .find_map(|e| match e.kind {
            EventKind::Slide { page } => Some(page),
            _ => None,
        })
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_clamps_regressing_timestamp() {
        let mut log = EventLog::new();
        log.append(Event::slide(100, 1));
        log.append(Event::stroke_end(40));

        assert_eq!(log.events()[1].t, 100);
    }

    #[test]
    fn test_from_events_is_stable() {
        let log = EventLog::from_events(vec![
            Event::slide(50, 2),
            Event::slide(10, 1),
            Event::slide(50, 3),
        ]);

        let pages: Vec<u32> = log
            .events()
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::Slide { page } => Some(page),
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[test]
    fn test_first_slide_page_defaults_to_one() {
        assert_eq!(first_slide_page(&[Event::stroke_end(0)]), 1);
        assert_eq!(first_slide_page(&[Event::stroke_end(0), Event::slide(5, 4)]), 4);
    }
}
