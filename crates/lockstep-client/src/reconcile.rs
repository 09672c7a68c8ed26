//! Reconciliation engine interface
//!
//! The reconciliation engine holds the authoritative and predicted
//! simulation instances and resimulates the predicted side whenever an
//! authoritative step disagrees with what was predicted. The client only
//! feeds it steps; it is built once the session hands over the joined
//! game state.

use crate::input_latch::InputSnapshot;
use lockstep_core::StepId;

/// Everything needed to build a reconciliation engine on join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSetup<'a> {
    /// Serialized game state received on join
    pub initial_state: &'a [u8],
    /// Step the initial state was captured at
    pub step_id: StepId,
    /// Maximum participants in one step
    pub max_participants: usize,
    /// Maximum payload octets for one participant
    pub max_payload_size: usize,
    /// How far prediction may run ahead of the authoritative simulation
    pub max_ticks_behind_authoritative: usize,
}

/// Serialized state of one simulation instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStateView<'a> {
    pub state: &'a [u8],
    pub step_id: StepId,
}

/// Authoritative and predicted states side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStates<'a> {
    pub authoritative: GameStateView<'a>,
    pub predicted: GameStateView<'a>,
}

/// Rollback/reconciliation engine fed by the client
pub trait ReconciliationEngine {
    /// Error type for rejected steps
    type Error: std::error::Error + Send + Sync + 'static;

    /// Add a serialized authoritative step as received from the server
    fn add_authoritative_step(&mut self, payload: &[u8], step_id: StepId) -> Result<(), Self::Error>;

    /// Add a locally predicted step
    fn add_predicted_step(
        &mut self,
        snapshot: &InputSnapshot<'_>,
        step_id: StepId,
    ) -> Result<(), Self::Error>;

    /// Advance both simulations as far as the buffered steps allow
    fn update(&mut self);

    /// Predicted steps buffered and not yet confirmed
    fn predicted_step_count(&self) -> usize;

    /// Discard buffered predicted steps and restart at `base`
    fn reset_predicted(&mut self, base: StepId);

    /// Current authoritative state
    fn authoritative_state(&self) -> GameStateView<'_>;

    /// Current predicted state
    fn predicted_state(&self) -> GameStateView<'_>;
}

/// Builds the reconciliation engine when the client becomes synced
///
/// Implemented for every `FnMut(ReconcilerSetup<'_>) -> E`.
pub trait ReconcilerFactory {
    /// Engine type produced
    type Engine: ReconciliationEngine;

    /// Build an engine seeded with the joined game state
    fn create(&mut self, setup: ReconcilerSetup<'_>) -> Self::Engine;
}

impl<F, E> ReconcilerFactory for F
where
    F: FnMut(ReconcilerSetup<'_>) -> E,
    E: ReconciliationEngine,
{
    type Engine = E;

    fn create(&mut self, setup: ReconcilerSetup<'_>) -> E {
        self(setup)
    }
}
