//! Authoritative step drain
//!
//! Moves authoritative steps from the session's inbound queue into the
//! reconciliation engine, a bounded number per tick. A bad step is logged
//! and skipped so one malformed packet never stalls the pipeline.

use crate::gap_monitor::{GapHealth, GapHealthMonitor};
use crate::reconcile::ReconciliationEngine;
use crate::session::NetworkSession;
use crate::Error;
use log::{error, trace, warn};

/// Most authoritative steps moved in one tick
pub const AUTHORITATIVE_DRAIN_CAP: usize = 30;

/// Outcome of one drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Steps taken off the inbound queue
    pub drained: usize,
    /// Steps that could not be read and were skipped
    pub read_failures: usize,
    /// Steps the reconciliation engine refused
    pub forward_failures: usize,
}

/// Per-tick drain state: the read buffer, miss counter and gap health
#[derive(Debug)]
pub struct AuthoritativeDrain {
    read_buffer: Vec<u8>,
    consecutive_misses: u32,
    gap_monitor: GapHealthMonitor,
}

impl AuthoritativeDrain {
    /// Create a drain able to read steps of up to `max_step_octets`
    pub fn new(max_step_octets: usize) -> Self {
        Self {
            read_buffer: vec![0; max_step_octets],
            consecutive_misses: 0,
            gap_monitor: GapHealthMonitor::new(),
        }
    }

    /// Drain the inbound queue, update gap health, then advance the engine
    pub fn tick<S, E>(&mut self, session: &mut S, engine: &mut E) -> DrainReport
    where
        S: NetworkSession,
        E: ReconciliationEngine,
    {
        let mut report = DrainReport::default();

        for _ in 0..AUTHORITATIVE_DRAIN_CAP {
            if session.inbound_step_count() == 0 {
                break;
            }
            report.drained += 1;

            let (step_id, octet_count) = match session.read_inbound_step(&mut self.read_buffer) {
                Ok(read) => read,
                Err(err) => {
                    warn!("{}", Error::ReadFailure(Box::new(err)));
                    report.read_failures += 1;
                    continue;
                }
            };

            let Some(payload) = self.read_buffer.get(..octet_count) else {
                warn!(
                    "authoritative step {} reported {} octets, read buffer holds {}",
                    step_id,
                    octet_count,
                    self.read_buffer.len()
                );
                report.read_failures += 1;
                continue;
            };

            if let Err(err) = engine.add_authoritative_step(payload, step_id) {
                error!(
                    "{}",
                    Error::ForwardFailure {
                        step_id,
                        source: Box::new(err),
                    }
                );
                report.forward_failures += 1;
            }
        }

        if report.drained > 0 {
            self.consecutive_misses = 0;
        } else {
            self.consecutive_misses = self.consecutive_misses.saturating_add(1);
        }
        self.gap_monitor.record(self.consecutive_misses);

        trace!(
            "added {} authoritative steps in one tick ({} unreadable, {} rejected)",
            report.drained,
            report.read_failures,
            report.forward_failures
        );

        engine.update();
        report
    }

    /// Consecutive ticks without any authoritative step
    pub fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }

    /// Forget the miss streak
    pub fn reset_misses(&mut self) {
        self.consecutive_misses = 0;
    }

    /// Current gap signals
    pub fn gap_health(&self) -> GapHealth {
        self.gap_monitor.health()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_latch::InputSnapshot;
    use crate::reconcile::GameStateView;
    use crate::session::{JoinRequest, JoinedGameState, NetworkStats, SessionState};
    use lockstep_core::StepId;
    use std::collections::VecDeque;
    use std::time::Instant;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct TestError(&'static str);

    /// Inbound queue only; `None` entries fail to read
    #[derive(Default)]
    struct Inbound {
        steps: VecDeque<Option<(StepId, Vec<u8>)>>,
    }

    impl Inbound {
        fn queue(&mut self, first: u32, count: u32) {
            for id in first..first + count {
                self.steps.push_back(Some((StepId::new(id), vec![1, 1, 0, 0])));
            }
        }
    }

    impl NetworkSession for Inbound {
        type Error = TestError;

        fn update(&mut self, _now: Instant) {}
        fn state(&self) -> SessionState {
            SessionState::Synced
        }
        fn joined_game_state(&self) -> Option<JoinedGameState<'_>> {
            None
        }
        fn request_join(&mut self, _request: JoinRequest) {}
        fn request_disconnect(&mut self) {}
        fn outgoing_initialized(&self) -> bool {
            true
        }
        fn inbound_initialized(&self) -> bool {
            true
        }
        fn optimal_step_id(&self) -> Option<StepId> {
            None
        }
        fn outgoing_cursor(&self) -> StepId {
            StepId::new(0)
        }
        fn reset_outgoing(&mut self, _base: StepId) {}
        fn push_outgoing(&mut self, _step_id: StepId, _payload: &[u8]) -> Result<(), TestError> {
            Ok(())
        }
        fn inbound_step_count(&self) -> usize {
            self.steps.len()
        }
        fn read_inbound_step(&mut self, buf: &mut [u8]) -> Result<(StepId, usize), TestError> {
            match self.steps.pop_front().flatten() {
                Some((step_id, payload)) => {
                    buf[..payload.len()].copy_from_slice(&payload);
                    Ok((step_id, payload.len()))
                }
                None => Err(TestError("unreadable")),
            }
        }
        fn stats(&self) -> NetworkStats {
            NetworkStats::default()
        }
    }

    #[derive(Default)]
    struct Engine {
        received: Vec<StepId>,
        updates: usize,
        reject: bool,
    }

    impl ReconciliationEngine for Engine {
        type Error = TestError;

        fn add_authoritative_step(&mut self, _payload: &[u8], step_id: StepId) -> Result<(), TestError> {
            if self.reject {
                return Err(TestError("rejected"));
            }
            self.received.push(step_id);
            Ok(())
        }
        fn add_predicted_step(
            &mut self,
            _snapshot: &InputSnapshot<'_>,
            _step_id: StepId,
        ) -> Result<(), TestError> {
            Ok(())
        }
        fn update(&mut self) {
            self.updates += 1;
        }
        fn predicted_step_count(&self) -> usize {
            0
        }
        fn reset_predicted(&mut self, _base: StepId) {}
        fn authoritative_state(&self) -> GameStateView<'_> {
            GameStateView {
                state: &[],
                step_id: StepId::new(0),
            }
        }
        fn predicted_state(&self) -> GameStateView<'_> {
            self.authoritative_state()
        }
    }

    #[test]
    fn test_drains_at_most_cap() {
        let mut drain = AuthoritativeDrain::new(16);
        let mut session = Inbound::default();
        let mut engine = Engine::default();
        session.queue(100, 45);

        let report = drain.tick(&mut session, &mut engine);

        assert_eq!(report.drained, AUTHORITATIVE_DRAIN_CAP);
        assert_eq!(session.steps.len(), 15);
        assert_eq!(engine.received.len(), 30);
        assert_eq!(engine.received[29], StepId::new(129));
        assert_eq!(engine.updates, 1);
        assert_eq!(drain.consecutive_misses(), 0);
    }

    #[test]
    fn test_misses_reset_after_drain() {
        let mut drain = AuthoritativeDrain::new(16);
        let mut session = Inbound::default();
        let mut engine = Engine::default();

        drain.tick(&mut session, &mut engine);
        assert_eq!(drain.consecutive_misses(), 1);
        drain.tick(&mut session, &mut engine);
        assert_eq!(drain.consecutive_misses(), 2);
        assert!(drain.gap_health().gap_detected);

        session.queue(7, 2);
        let report = drain.tick(&mut session, &mut engine);
        assert_eq!(report.drained, 2);
        assert_eq!(drain.consecutive_misses(), 0);

        drain.tick(&mut session, &mut engine);
        assert_eq!(drain.consecutive_misses(), 1);
        assert_eq!(engine.updates, 4);
    }

    #[test]
    fn test_failures_are_counted_and_skipped() {
        let mut drain = AuthoritativeDrain::new(16);
        let mut session = Inbound::default();
        let mut engine = Engine::default();
        session.queue(1, 1);
        session.steps.push_back(None);
        session.queue(2, 1);

        let report = drain.tick(&mut session, &mut engine);
        assert_eq!(
            report,
            DrainReport {
                drained: 3,
                read_failures: 1,
                forward_failures: 0,
            }
        );
        assert_eq!(engine.received, vec![StepId::new(1), StepId::new(2)]);

        engine.reject = true;
        session.queue(3, 2);
        let report = drain.tick(&mut session, &mut engine);
        assert_eq!(report.forward_failures, 2);
        assert!(session.steps.is_empty());
        // Rejected steps were still taken off the queue
        assert_eq!(drain.consecutive_misses(), 0);
    }

    #[test]
    fn test_reset_misses() {
        let mut drain = AuthoritativeDrain::new(16);
        let mut session = Inbound::default();
        let mut engine = Engine::default();
        drain.tick(&mut session, &mut engine);
        drain.reset_misses();
        assert_eq!(drain.consecutive_misses(), 0);
    }
}
