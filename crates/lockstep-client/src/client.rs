//! Engine client
//!
//! Owns the session, the reconciliation engine and the control state, and
//! runs the fixed-rate tick that ties them together.

use crate::codec::{CombinedStepCodec, StepCodec};
use crate::config::ClientConfig;
use crate::debug_stream::{DebugStream, TickTrace};
use crate::drain::AuthoritativeDrain;
use crate::gap_monitor::GapHealth;
use crate::input_latch::InputLatch;
use crate::lifecycle::{transition, Phase, Transition};
use crate::pacer::TickPacer;
use crate::rate_controller::{predicted_step_count, RateInput, PREDICTED_HARD_CAP};
use crate::reconcile::{GameStates, ReconcilerFactory, ReconcilerSetup, ReconciliationEngine};
use crate::session::{GameJoinOptions, JoinRequest, NetworkSession, MAX_LOCAL_PLAYERS};
use crate::skip_ahead::{SkipAhead, SETTLE_WINDOW_TICKS};
use crate::{Error, Result};
use log::{debug, error, info, trace, warn};
use lockstep_core::ParticipantInput;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Statistics exposed to the host; `None` means not enough samples yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStats {
    pub authoritative_buffer_delta_average: Option<i32>,
    pub server_inbound_buffer_step_count_average: Option<i32>,
    pub gap: GapHealth,
}

/// Client side of a deterministic lockstep session
///
/// Generic over the session layer `S`, the factory `F` building the
/// reconciliation engine on join, and the outgoing step codec `C`.
///
/// Single-threaded: the host calls [`update`](Self::update) every frame and
/// submits input from the same thread between ticks.
pub struct EngineClient<S, F, C = CombinedStepCodec>
where
    S: NetworkSession,
    F: ReconcilerFactory,
    C: StepCodec,
{
    config: ClientConfig,
    session: S,
    factory: F,
    codec: C,
    /// Exists iff `phase == Phase::Synced`
    engine: Option<F::Engine>,
    phase: Phase,
    cooldown: u32,
    latch: InputLatch,
    write_buffer: Vec<u8>,
    drain: AuthoritativeDrain,
    pacer: TickPacer,
    debug_stream: Option<DebugStream>,
    tick_count: u64,
}

impl<S, F> EngineClient<S, F, CombinedStepCodec>
where
    S: NetworkSession,
    F: ReconcilerFactory,
{
    /// Create a client using the combined step wire format
    pub fn new(config: ClientConfig, session: S, factory: F) -> Result<Self> {
        let codec = CombinedStepCodec::new(config.max_step_octets());
        Self::with_codec(config, session, factory, codec)
    }
}

impl<S, F, C> EngineClient<S, F, C>
where
    S: NetworkSession,
    F: ReconcilerFactory,
    C: StepCodec,
{
    /// Create a client with a custom outgoing step codec
    pub fn with_codec(config: ClientConfig, session: S, factory: F, codec: C) -> Result<Self> {
        config.validate()?;

        if !config.versions_match() {
            error!(
                "{}",
                Error::ConfigMismatch {
                    authoritative: config.authoritative_version,
                    predicted: config.predicted_version,
                }
            );
        }

        let max_step_octets = config.max_step_octets();
        Ok(Self {
            latch: InputLatch::new(config.max_participants, config.max_payload_size),
            write_buffer: Vec::with_capacity(max_step_octets),
            drain: AuthoritativeDrain::new(max_step_octets),
            pacer: TickPacer::new(
                config.tick_interval(),
                Instant::now(),
                config.tick_quality_check,
            ),
            debug_stream: config.debug_stream.then(DebugStream::default),
            engine: None,
            phase: Phase::WaitingForInitialGameState,
            cooldown: 0,
            tick_count: 0,
            config,
            session,
            factory,
            codec,
        })
    }

    /// Ask to join the game with local players
    ///
    /// The outcome is observed later as a phase change.
    pub fn request_join(&mut self, options: GameJoinOptions) -> Result<()> {
        if options.players.len() > MAX_LOCAL_PLAYERS {
            return Err(Error::TooManyLocalPlayers {
                count: options.players.len(),
                max: MAX_LOCAL_PLAYERS,
            });
        }

        info!("requesting join for {} local players", options.players.len());
        self.session.request_join(JoinRequest {
            options,
            application_version: self.config.application_version,
        });
        Ok(())
    }

    /// Ask the server to let the local participants leave
    pub fn request_disconnect(&mut self) {
        info!("requesting disconnect");
        self.session.request_disconnect();
    }

    /// Run every tick that is due by now; returns how many ran
    pub fn update(&mut self) -> u32 {
        self.update_at(Instant::now())
    }

    /// Run every tick that is due by `now`; returns how many ran
    pub fn update_at(&mut self, now: Instant) -> u32 {
        let due = self.pacer.advance(now);
        for _ in 0..due {
            self.tick(now);
        }
        due
    }

    /// Run exactly one tick, bypassing the pacer
    pub fn tick(&mut self, now: Instant) {
        self.tick_count += 1;
        self.session.update(now);

        let mut tick_trace = TickTrace::new(self.tick_count, self.phase);

        if self.session.outgoing_initialized() && self.session.inbound_initialized() {
            self.produce_predicted_steps(&mut tick_trace);
        }

        self.cooldown = self.cooldown.saturating_sub(1);

        match self.phase {
            Phase::WaitingForInitialGameState => self.poll_session_state(),
            Phase::Synced => {
                if let Some(engine) = self.engine.as_mut() {
                    tick_trace.drained = self.drain.tick(&mut self.session, engine).drained;
                }
            }
        }

        if let Some(stream) = self.debug_stream.as_mut() {
            tick_trace.phase = self.phase;
            tick_trace.cooldown = self.cooldown;
            stream.push(tick_trace);
        }
    }

    fn produce_predicted_steps(&mut self, tick_trace: &mut TickTrace) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let cursor = self.session.outgoing_cursor();
        if let Some(skip) = SkipAhead::check(self.session.optimal_step_id(), cursor) {
            info!(
                "skip ahead: {} ticks behind, moving outgoing steps from {} to {}",
                skip.ticks_behind(),
                skip.from(),
                skip.new_base()
            );
            skip.apply(&mut self.session, engine);
            self.cooldown = SETTLE_WINDOW_TICKS;
            tick_trace.skipped_to = Some(skip.new_base());
        }

        let cursor = self.session.outgoing_cursor();
        let drift = self
            .session
            .optimal_step_id()
            .map(|optimal| optimal.diff(cursor));
        let occupancy = engine.predicted_step_count();
        let count = predicted_step_count(RateInput {
            drift,
            cooldown: self.cooldown,
            occupancy,
        });

        // Only a stall arms the settle window; catching up does not
        if count == 0 && self.cooldown == 0 {
            self.cooldown = SETTLE_WINDOW_TICKS;
        }

        tick_trace.drift = drift;
        tick_trace.occupancy = occupancy;
        tick_trace.predicted = replay_latched(
            &self.latch,
            &self.codec,
            &mut self.write_buffer,
            &mut self.session,
            engine,
            count,
        );
    }

    fn poll_session_state(&mut self) {
        let (next, effect) = transition(self.phase, self.session.state());
        match effect {
            Transition::Stay => self.phase = next,
            Transition::EnterSynced => self.enter_synced(next),
        }
    }

    fn enter_synced(&mut self, next: Phase) {
        let Some(joined) = self.session.joined_game_state() else {
            warn!("session reports synced but has no joined game state");
            return;
        };

        debug!(
            "joined game state. octet count: {} step {}",
            joined.state.len(),
            joined.step_id
        );
        let step_id = joined.step_id;
        let engine = self.factory.create(ReconcilerSetup {
            initial_state: joined.state,
            step_id,
            max_participants: self.config.max_participants,
            max_payload_size: self.config.max_payload_size,
            max_ticks_behind_authoritative: self.config.max_ticks_behind_authoritative,
        });

        self.engine = Some(engine);
        self.phase = next;
        self.cooldown = 0;
        self.drain.reset_misses();
        info!("synced at step {}", step_id);
    }

    /// Returns true when the host should sample and submit input
    pub fn must_submit_input(&self) -> bool {
        self.phase == Phase::Synced
    }

    /// Latch input for the following ticks to replay
    pub fn submit_input(&mut self, inputs: &[ParticipantInput<'_>]) -> Result<()> {
        self.latch.submit(inputs)
    }

    /// Connection statistics and gap health
    pub fn stats(&self) -> ClientStats {
        let network = self.session.stats();
        ClientStats {
            authoritative_buffer_delta_average: network.authoritative_buffer_delta_average,
            server_inbound_buffer_step_count_average: network
                .server_inbound_buffer_step_count_average,
            gap: self.drain.gap_health(),
        }
    }

    /// Authoritative and predicted states, once synced
    pub fn game_states(&self) -> Option<GameStates<'_>> {
        self.engine.as_ref().map(|engine| GameStates {
            authoritative: engine.authoritative_state(),
            predicted: engine.predicted_state(),
        })
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Remaining settle-window ticks
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Current gap signals
    pub fn gap_health(&self) -> GapHealth {
        self.drain.gap_health()
    }

    /// Recorded tick traces, oldest first; empty unless enabled in the config
    pub fn debug_stream(&self) -> impl Iterator<Item = &TickTrace> {
        self.debug_stream.iter().flat_map(|stream| stream.iter())
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get access to the session layer
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Get mutable access to the session layer
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Get access to the reconciliation engine, once synced
    pub fn engine(&self) -> Option<&F::Engine> {
        self.engine.as_ref()
    }
}

/// Replay the latched input `count` times as new predicted steps
///
/// Stops early at the predicted buffer hard cap or on the first failure to
/// encode or send. Returns the number of steps produced.
fn replay_latched<S, E, C>(
    latch: &InputLatch,
    codec: &C,
    write_buffer: &mut Vec<u8>,
    session: &mut S,
    engine: &mut E,
    count: usize,
) -> usize
where
    S: NetworkSession,
    E: ReconciliationEngine,
    C: StepCodec,
{
    let Some(snapshot) = latch.snapshot() else {
        if count > 0 {
            trace!("no input latched, skipping prediction");
        }
        return 0;
    };

    let mut produced = 0;
    for _ in 0..count {
        if engine.predicted_step_count() >= PREDICTED_HARD_CAP {
            debug!("predicted step buffer full at {}", PREDICTED_HARD_CAP);
            break;
        }

        let octet_count = match codec.encode(&snapshot, write_buffer) {
            Ok(octet_count) => octet_count,
            Err(err) => {
                warn!("{}", Error::EncodeFailure(err));
                break;
            }
        };
        let Some(octets) = write_buffer.get(..octet_count) else {
            warn!(
                "codec reported {} octets but wrote {}",
                octet_count,
                write_buffer.len()
            );
            break;
        };

        let step_id = session.outgoing_cursor();
        if let Err(err) = session.push_outgoing(step_id, octets) {
            error!(
                "{}",
                Error::OutgoingFailure {
                    step_id,
                    source: Box::new(err),
                }
            );
            break;
        }

        if let Err(err) = engine.add_predicted_step(&snapshot, step_id) {
            error!(
                "{}",
                Error::ForwardFailure {
                    step_id,
                    source: Box::new(err),
                }
            );
        }
        produced += 1;
    }

    trace!("predicted {} of {} requested steps", produced, count);
    produced
}
