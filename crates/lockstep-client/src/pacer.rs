//! Fixed-rate tick pacing
//!
//! The host calls `update` once per frame at whatever rate it renders.
//! The pacer converts elapsed monotonic time into a whole number of due
//! ticks so the simulation advances at a fixed interval regardless.

use log::{debug, warn};
use std::time::{Duration, Instant};

/// Most ticks run by a single `update`; older backlog is dropped
pub const MAX_TICKS_PER_UPDATE: u32 = 4;

/// Converts wall-clock time into due ticks
#[derive(Debug, Clone)]
pub struct TickPacer {
    interval: Duration,
    next_tick: Instant,
    last_update: Option<Instant>,
    quality_check: bool,
}

impl TickPacer {
    /// Create a pacer whose first tick is due one interval after `start`
    pub fn new(interval: Duration, start: Instant, quality_check: bool) -> Self {
        Self {
            interval,
            next_tick: start + interval,
            last_update: None,
            quality_check,
        }
    }

    /// Number of ticks due at `now`
    pub fn advance(&mut self, now: Instant) -> u32 {
        if self.quality_check {
            if let Some(last) = self.last_update {
                let gap = now.saturating_duration_since(last);
                if gap > self.interval * 2 {
                    warn!(
                        "update called {} ms after the previous one, tick interval is {} ms",
                        gap.as_millis(),
                        self.interval.as_millis()
                    );
                }
            }
        }
        self.last_update = Some(now);

        if now < self.next_tick {
            return 0;
        }

        let behind = now.saturating_duration_since(self.next_tick);
        let due = 1 + behind.as_nanos() / self.interval.as_nanos();

        if due > u128::from(MAX_TICKS_PER_UPDATE) {
            debug!(
                "dropping {} ticks of backlog",
                due - u128::from(MAX_TICKS_PER_UPDATE)
            );
            self.next_tick = now + self.interval;
            return MAX_TICKS_PER_UPDATE;
        }

        // due <= MAX_TICKS_PER_UPDATE here
        let due = due as u32;
        self.next_tick += self.interval * due;
        due
    }

    /// Tick interval
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
