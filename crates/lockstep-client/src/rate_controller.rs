//! Prediction rate control
//!
//! Decides how many predicted steps to produce this tick so the outgoing
//! cursor tracks the step id the server wants next. Producing two steps
//! catches up, producing none lets the server's buffer drain.

/// Buffered predicted steps above which no more are requested
pub const PREDICTED_SOFT_CEILING: usize = 30;

/// Buffered predicted steps that are never exceeded, whatever was requested
pub const PREDICTED_HARD_CAP: usize = 40;

/// Drift at or below which production stalls
pub const STALL_DRIFT: i32 = -5;

/// Controller inputs for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateInput {
    /// `optimal_step_id - outgoing_cursor`; `None` without enough network statistics
    pub drift: Option<i32>,
    /// Remaining settle-window ticks
    pub cooldown: u32,
    /// Predicted steps currently buffered in the reconciliation engine
    pub occupancy: usize,
}

/// Number of predicted steps to produce this tick
///
/// ```
/// use lockstep_client::{predicted_step_count, RateInput};
///
/// let behind = RateInput { drift: Some(3), cooldown: 0, occupancy: 29 };
/// assert_eq!(predicted_step_count(behind), 1);
/// ```
pub fn predicted_step_count(input: RateInput) -> usize {
    let wanted = match (input.cooldown, input.drift) {
        (1.., _) => 1,
        (0, None) => 1,
        (0, Some(drift)) if drift <= STALL_DRIFT => 0,
        (0, Some(drift)) if drift < 0 => 1,
        (0, Some(_)) => 2,
    };

    let available = PREDICTED_SOFT_CEILING.saturating_sub(input.occupancy);
    wanted.min(available)
}
