//! Per-tick controller trace
//!
//! Opt-in record of what the client decided each tick, for tuning the
//! controller against real network conditions.

use crate::lifecycle::Phase;
use lockstep_core::StepId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Ticks of history kept
pub const DEBUG_STREAM_CAPACITY: usize = 256;

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickTrace {
    /// Tick counter since the client was created
    pub tick: u64,
    /// Phase at the end of the tick
    pub phase: Phase,
    /// Drift seen by the rate controller
    pub drift: Option<i32>,
    /// Cooldown at the end of the tick
    pub cooldown: u32,
    /// Predicted steps buffered before production
    pub occupancy: usize,
    /// Predicted steps produced
    pub predicted: usize,
    /// Cursor after a skip-ahead, if one fired
    pub skipped_to: Option<StepId>,
    /// Authoritative steps drained
    pub drained: usize,
}

impl TickTrace {
    /// Empty trace for a tick
    pub fn new(tick: u64, phase: Phase) -> Self {
        Self {
            tick,
            phase,
            drift: None,
            cooldown: 0,
            occupancy: 0,
            predicted: 0,
            skipped_to: None,
            drained: 0,
        }
    }
}

/// Bounded buffer of tick traces, oldest evicted first
#[derive(Debug)]
pub struct DebugStream {
    traces: VecDeque<TickTrace>,
    capacity: usize,
}

impl DebugStream {
    /// Create an empty stream
    pub fn new(capacity: usize) -> Self {
        Self {
            traces: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a trace, evicting the oldest when full
    pub fn push(&mut self, trace: TickTrace) {
        if self.traces.len() >= self.capacity {
            self.traces.pop_front();
        }
        self.traces.push_back(trace);
    }

    /// Traces, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TickTrace> {
        self.traces.iter()
    }

    /// Number of traces kept
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Check if the stream is empty
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

impl Default for DebugStream {
    fn default() -> Self {
        Self::new(DEBUG_STREAM_CAPACITY)
    }
}
