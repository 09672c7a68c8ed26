//! Client lifecycle
//!
//! The client waits for the session to hand over a full game state, then
//! stays synced for the rest of the session. Every combination of client
//! phase and reported session state is listed in [`transition`].

use crate::session::SessionState;
use serde::{Deserialize, Serialize};

/// Client phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Joined or joining; no game state yet
    #[default]
    WaitingForInitialGameState,
    /// Reconciliation engine running
    Synced,
}

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do
    Stay,
    /// Build the reconciliation engine from the joined game state
    EnterSynced,
}

/// Next phase and the effect to run for `(phase, session state)`
pub fn transition(phase: Phase, state: SessionState) -> (Phase, Transition) {
    use Phase::*;
    use SessionState as S;

    match (phase, state) {
        (WaitingForInitialGameState, S::Synced) => (Synced, Transition::EnterSynced),
        (WaitingForInitialGameState, S::Init | S::ReInit | S::Cleared | S::Disconnected) => {
            (WaitingForInitialGameState, Transition::Stay)
        }
        // Reconnection needs a new session
        (Synced, S::Init | S::ReInit | S::Cleared | S::Disconnected | S::Synced) => {
            (Synced, Transition::Stay)
        }
    }
}
