//! Pause-aware recording clock
//!
//! Maps wall-clock time onto the recording timeline. Paused intervals are
//! excluded so event timestamps line up with the audio, which also stops
//! while paused.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Source of monotonic wall-clock milliseconds
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Monotonic time since the source was created
#[derive(Debug, Clone)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Explicitly advanced time, shared between clones
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Recording-relative clock that excludes paused time
pub struct RecordingClock {
    source: Arc<dyn TimeSource>,
    start_wall_ms: u64,
    total_paused_ms: u64,
    pause_started_ms: Option<u64>,
}

impl std::fmt::Debug for RecordingClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingClock")
            .field("start_wall_ms", &self.start_wall_ms)
            .field("total_paused_ms", &self.total_paused_ms)
            .field("pause_started_ms", &self.pause_started_ms)
            .finish()
    }
}

impl RecordingClock {
    /// Start a clock at the source's current time
    pub fn start(source: Arc<dyn TimeSource>) -> Self {
        let start_wall_ms = source.now_ms();
        Self {
            source,
            start_wall_ms,
            total_paused_ms: 0,
            pause_started_ms: None,
        }
    }

    /// Elapsed recording time in milliseconds.
    ///
    /// While paused this stays frozen at the pause instant.
    pub fn now(&self) -> u64 {
        let wall = self
            .pause_started_ms
            .unwrap_or_else(|| self.source.now_ms());
        wall.saturating_sub(self.start_wall_ms)
            .saturating_sub(self.total_paused_ms)
    }

    /// Freeze the clock. Returns false if it was already paused.
    pub fn pause(&mut self) -> bool {
        if self.pause_started_ms.is_some() {
            return false;
        }
        self.pause_started_ms = Some(self.source.now_ms());
        true
    }

    /// Unfreeze the clock. Returns false if it was not paused.
    pub fn resume(&mut self) -> bool {
        let Some(paused_at) = self.pause_started_ms.take() else {
            return false;
        };
        self.total_paused_ms += self.source.now_ms().saturating_sub(paused_at);
        true
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_ms.is_some()
    }

    pub fn total_paused_ms(&self) -> u64 {
        self.total_paused_ms
    }

    pub fn start_wall_ms(&self) -> u64 {
        self.start_wall_ms
    }
}
