//! Authoritative step gap health
//!
//! Turns the per-tick count of consecutive ticks without authoritative
//! steps into two sticky signals. "Gap detected" fires on short stalls,
//! "big gap" on sustained ones; both stay asserted for a full window.

use lockstep_hold_buffer::HoldPositive;
use serde::{Deserialize, Serialize};

/// Samples each detector remembers
pub const GAP_WINDOW: usize = 20;

/// Consecutive empty ticks counted as a gap
pub const GAP_MISS_THRESHOLD: u32 = 2;

/// Consecutive empty ticks counted as a big gap
pub const BIG_GAP_MISS_THRESHOLD: u32 = 5;

/// Current gap signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapHealth {
    pub gap_detected: bool,
    pub big_gap: bool,
}

/// Pair of hold-positive windows fed from the miss counter
#[derive(Debug, Clone)]
pub struct GapHealthMonitor {
    gap: HoldPositive,
    big_gap: HoldPositive,
}

impl GapHealthMonitor {
    /// Create a monitor with empty windows
    pub fn new() -> Self {
        Self {
            gap: HoldPositive::new(GAP_WINDOW),
            big_gap: HoldPositive::new(GAP_WINDOW),
        }
    }

    /// Record this tick's consecutive-miss count. Call once per tick.
    pub fn record(&mut self, consecutive_misses: u32) {
        self.gap.add(consecutive_misses >= GAP_MISS_THRESHOLD);
        self.big_gap.add(consecutive_misses >= BIG_GAP_MISS_THRESHOLD);
    }

    /// Current signals
    pub fn health(&self) -> GapHealth {
        GapHealth {
            gap_detected: self.gap.is_positive(),
            big_gap: self.big_gap.is_positive(),
        }
    }
}

impl Default for GapHealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}
