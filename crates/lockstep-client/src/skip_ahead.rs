//! Skip-ahead correction
//!
//! When the client falls so far behind that producing two steps per tick
//! cannot close the distance in reasonable time, both the outgoing step
//! stream and the predicted step buffer jump straight to the server's
//! optimal step id. Predicted history dropped here is recreated by
//! resimulation once the next authoritative step reaches the engine.

use crate::reconcile::ReconciliationEngine;
use crate::session::NetworkSession;
use lockstep_core::StepId;

/// Ticks behind the optimal step id that trigger a skip (~256 ms at 16 ms ticks)
pub const SKIP_AHEAD_THRESHOLD: i32 = 16;

/// Settle-window length armed after a disruptive correction
pub const SETTLE_WINDOW_TICKS: u32 = 30;

/// A pending skip-ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipAhead {
    from: StepId,
    ticks_behind: i32,
}

impl SkipAhead {
    /// Check whether the cursor is far enough behind `optimal` to skip
    ///
    /// Never fires without an optimal step estimate.
    pub fn check(optimal: Option<StepId>, cursor: StepId) -> Option<SkipAhead> {
        let ticks_behind = optimal?.diff(cursor);
        (ticks_behind >= SKIP_AHEAD_THRESHOLD).then_some(SkipAhead {
            from: cursor,
            ticks_behind,
        })
    }

    /// Cursor before the skip
    pub fn from(&self) -> StepId {
        self.from
    }

    /// Distance jumped
    pub fn ticks_behind(&self) -> i32 {
        self.ticks_behind
    }

    /// Cursor after the skip
    pub fn new_base(&self) -> StepId {
        self.from.offset(self.ticks_behind)
    }

    /// Restart the outgoing stream and the predicted buffer at the new base
    pub fn apply<S, E>(&self, session: &mut S, engine: &mut E)
    where
        S: NetworkSession,
        E: ReconciliationEngine,
    {
        let base = self.new_base();
        session.reset_outgoing(base);
        engine.reset_predicted(base);
    }
}
