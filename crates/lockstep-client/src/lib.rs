//! Lockstep Client - Client-side orchestration of deterministic lockstep
//!
//! This crate glues a network session layer to a rollback/reconciliation
//! engine and decides, tick by tick, how many predicted steps to produce:
//!
//! - **Input Latch**: Keep the host's latest sampled input for replay
//! - **Prediction Rate Controller**: Produce 0, 1 or 2 steps per tick to track the server
//! - **Skip-Ahead**: Jump forward when too far behind to catch up incrementally
//! - **Authoritative Drain**: Feed server steps to the reconciliation engine
//! - **Gap Health**: Sticky signals for missing authoritative steps
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        EngineClient                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────────┐   │
//! │  │ Input Latch  │─▶│ Rate Control │─▶│  Predicted Steps  │───┼─▶ outgoing
//! │  └──────────────┘  └──────────────┘  └───────────────────┘   │
//! │                          ▲  ▲                  │             │
//! │                          │  └──── Skip-Ahead   ▼             │
//! │  ┌──────────────┐        │         ┌───────────────────┐     │
//! │  │ Gap Health   │◀── Authoritative │  Reconciliation   │     │
//! │  └──────────────┘      Drain ─────▶│      Engine       │     │
//! │                          ▲         └───────────────────┘     │
//! └──────────────────────────┼───────────────────────────────────┘
//!                        inbound
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use lockstep_client::{ClientConfig, EngineClient, GameJoinOptions};
//! use lockstep_core::ParticipantInput;
//!
//! let mut client = EngineClient::new(ClientConfig::default(), session, |setup| {
//!     MyEngine::new(setup.initial_state, setup.step_id)
//! })?;
//! client.request_join(GameJoinOptions::with_local_players([0]))?;
//!
//! // Host loop
//! loop {
//!     if client.must_submit_input() {
//!         client.submit_input(&[ParticipantInput::new(1, &sample_input())])?;
//!     }
//!     client.update();
//!
//!     if let Some(states) = client.game_states() {
//!         render(states.predicted.state);
//!     }
//! }
//! ```

mod client;
mod codec;
mod config;
mod debug_stream;
mod drain;
mod error;
mod gap_monitor;
mod input_latch;
mod lifecycle;
mod pacer;
mod rate_controller;
mod reconcile;
mod session;
mod skip_ahead;

pub use client::{ClientStats, EngineClient};
pub use codec::{CodecError, CombinedStepCodec, StepCodec};
pub use config::{ClientConfig, MAX_PAYLOAD_SIZE, MAX_PREDICTED_PARTICIPANTS};
pub use debug_stream::{DebugStream, TickTrace, DEBUG_STREAM_CAPACITY};
pub use drain::{AuthoritativeDrain, DrainReport, AUTHORITATIVE_DRAIN_CAP};
pub use error::{BoxError, Error, Result};
pub use gap_monitor::{
    GapHealth, GapHealthMonitor, BIG_GAP_MISS_THRESHOLD, GAP_MISS_THRESHOLD, GAP_WINDOW,
};
pub use input_latch::{InputLatch, InputSnapshot, LatchedParticipant};
pub use lifecycle::{transition, Phase, Transition};
pub use pacer::{TickPacer, MAX_TICKS_PER_UPDATE};
pub use rate_controller::{
    predicted_step_count, RateInput, PREDICTED_HARD_CAP, PREDICTED_SOFT_CEILING, STALL_DRIFT,
};
pub use reconcile::{
    GameStateView, GameStates, ReconcilerFactory, ReconcilerSetup, ReconciliationEngine,
};
pub use session::{
    GameJoinOptions, JoinRequest, JoinType, JoinedGameState, LocalPlayer, NetworkSession,
    NetworkStats, SessionState, MAX_LOCAL_PLAYERS,
};
pub use skip_ahead::{SkipAhead, SETTLE_WINDOW_TICKS, SKIP_AHEAD_THRESHOLD};

// Re-export core types for convenience
pub use lockstep_core::{ParticipantId, ParticipantInput, StepId, StepType, Version};
