//! In-memory session and reconciliation engine for driving an EngineClient

#![allow(dead_code)]

use lockstep_client::{
    ClientConfig, EngineClient, GameStateView, InputSnapshot, JoinRequest, JoinedGameState,
    NetworkSession, NetworkStats, ReconcilerSetup, ReconciliationEngine, SessionState, StepId,
};
use std::collections::VecDeque;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("mock failure: {0}")]
pub struct MockError(pub &'static str);

/// One queued inbound step
#[derive(Debug, Clone)]
pub enum Inbound {
    Step(StepId, Vec<u8>),
    Malformed,
}

#[derive(Debug)]
pub struct MockSession {
    pub state: SessionState,
    pub joined: Option<(Vec<u8>, StepId)>,
    pub streams_ready: bool,
    pub optimal: Option<StepId>,
    pub cursor: StepId,
    pub outgoing: Vec<(StepId, Vec<u8>)>,
    pub outgoing_resets: Vec<StepId>,
    pub inbound: VecDeque<Inbound>,
    pub stats: NetworkStats,
    pub join_requests: Vec<JoinRequest>,
    pub disconnects: usize,
    pub updates: usize,
    pub fail_push: bool,
    /// Move the optimal step id forward by one on every update
    pub advance_optimal: bool,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Init,
            joined: None,
            streams_ready: false,
            optimal: None,
            cursor: StepId::new(0),
            outgoing: Vec::new(),
            outgoing_resets: Vec::new(),
            inbound: VecDeque::new(),
            stats: NetworkStats::default(),
            join_requests: Vec::new(),
            disconnects: 0,
            updates: 0,
            fail_push: false,
            advance_optimal: false,
        }
    }

    /// A session that has joined at `step_id` with streams ready
    pub fn joined_at(step_id: u32) -> Self {
        let mut session = Self::new();
        session.state = SessionState::Synced;
        session.joined = Some((vec![0xC0, 0xFF, 0xEE], StepId::new(step_id)));
        session.streams_ready = true;
        session.cursor = StepId::new(step_id);
        session
    }

    pub fn queue_steps(&mut self, first: u32, count: usize) {
        for i in 0..count {
            self.inbound
                .push_back(Inbound::Step(StepId::new(first + i as u32), vec![1, 1, 0, 1, i as u8]));
        }
    }
}

impl NetworkSession for MockSession {
    type Error = MockError;

    fn update(&mut self, _now: Instant) {
        self.updates += 1;
        if self.advance_optimal {
            self.optimal = self.optimal.map(StepId::next);
        }
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn joined_game_state(&self) -> Option<JoinedGameState<'_>> {
        self.joined.as_ref().map(|(state, step_id)| JoinedGameState {
            state,
            step_id: *step_id,
        })
    }

    fn request_join(&mut self, request: JoinRequest) {
        self.join_requests.push(request);
    }

    fn request_disconnect(&mut self) {
        self.disconnects += 1;
    }

    fn outgoing_initialized(&self) -> bool {
        self.streams_ready
    }

    fn inbound_initialized(&self) -> bool {
        self.streams_ready
    }

    fn optimal_step_id(&self) -> Option<StepId> {
        self.optimal
    }

    fn outgoing_cursor(&self) -> StepId {
        self.cursor
    }

    fn reset_outgoing(&mut self, base: StepId) {
        self.outgoing_resets.push(base);
        self.cursor = base;
    }

    fn push_outgoing(&mut self, step_id: StepId, payload: &[u8]) -> Result<(), MockError> {
        if self.fail_push {
            return Err(MockError("outgoing stream full"));
        }
        assert_eq!(step_id, self.cursor, "steps must be pushed at the cursor");
        self.outgoing.push((step_id, payload.to_vec()));
        self.cursor = self.cursor.next();
        Ok(())
    }

    fn inbound_step_count(&self) -> usize {
        self.inbound.len()
    }

    fn read_inbound_step(&mut self, buf: &mut [u8]) -> Result<(StepId, usize), MockError> {
        match self.inbound.pop_front() {
            Some(Inbound::Step(step_id, payload)) => {
                let target = buf
                    .get_mut(..payload.len())
                    .ok_or(MockError("step larger than read buffer"))?;
                target.copy_from_slice(&payload);
                Ok((step_id, payload.len()))
            }
            Some(Inbound::Malformed) => Err(MockError("malformed step")),
            None => Err(MockError("no step queued")),
        }
    }

    fn stats(&self) -> NetworkStats {
        self.stats
    }
}

/// A predicted step as the engine saw it: step id and `(participant, payload)` pairs
pub type PredictedStep = (StepId, Vec<(u8, Vec<u8>)>);

#[derive(Debug)]
pub struct MockEngine {
    pub initial_state: Vec<u8>,
    pub initial_step: StepId,
    pub max_participants: usize,
    pub max_payload_size: usize,
    pub max_ticks_behind_authoritative: usize,
    pub authoritative: Vec<(StepId, Vec<u8>)>,
    pub predicted: VecDeque<PredictedStep>,
    pub predicted_resets: Vec<StepId>,
    pub updates: usize,
    pub reject_authoritative: bool,
    /// Predicted steps confirmed (and dropped) by each update
    pub confirm_per_update: usize,
    /// Buffer slots each predicted step occupies in `predicted_step_count`
    pub occupancy_per_step: usize,
    predicted_state: Vec<u8>,
    predicted_step: StepId,
}

impl MockEngine {
    pub fn from_setup(setup: ReconcilerSetup<'_>) -> Self {
        Self {
            initial_state: setup.initial_state.to_vec(),
            initial_step: setup.step_id,
            max_participants: setup.max_participants,
            max_payload_size: setup.max_payload_size,
            max_ticks_behind_authoritative: setup.max_ticks_behind_authoritative,
            authoritative: Vec::new(),
            predicted: VecDeque::new(),
            predicted_resets: Vec::new(),
            updates: 0,
            reject_authoritative: false,
            confirm_per_update: 0,
            occupancy_per_step: 1,
            predicted_state: setup.initial_state.to_vec(),
            predicted_step: setup.step_id,
        }
    }

    /// Engine confirming one predicted step per tick, like a healthy connection
    pub fn confirming(setup: ReconcilerSetup<'_>) -> Self {
        let mut engine = Self::from_setup(setup);
        engine.confirm_per_update = 1;
        engine
    }

    pub fn rejecting(setup: ReconcilerSetup<'_>) -> Self {
        let mut engine = Self::from_setup(setup);
        engine.reject_authoritative = true;
        engine
    }
}

impl ReconciliationEngine for MockEngine {
    type Error = MockError;

    fn add_authoritative_step(&mut self, payload: &[u8], step_id: StepId) -> Result<(), MockError> {
        if self.reject_authoritative {
            return Err(MockError("authoritative step out of order"));
        }
        self.authoritative.push((step_id, payload.to_vec()));
        Ok(())
    }

    fn add_predicted_step(
        &mut self,
        snapshot: &InputSnapshot<'_>,
        step_id: StepId,
    ) -> Result<(), MockError> {
        let inputs = snapshot
            .iter()
            .map(|p| (p.participant_id.raw(), p.payload.to_vec()))
            .collect();
        self.predicted.push_back((step_id, inputs));
        self.predicted_step = step_id;
        Ok(())
    }

    fn update(&mut self) {
        self.updates += 1;
        for _ in 0..self.confirm_per_update {
            self.predicted.pop_front();
        }
    }

    fn predicted_step_count(&self) -> usize {
        self.predicted.len() * self.occupancy_per_step
    }

    fn reset_predicted(&mut self, base: StepId) {
        self.predicted_resets.push(base);
        self.predicted.clear();
    }

    fn authoritative_state(&self) -> GameStateView<'_> {
        GameStateView {
            state: &self.initial_state,
            step_id: self
                .authoritative
                .last()
                .map(|(step_id, _)| *step_id)
                .unwrap_or(self.initial_step),
        }
    }

    fn predicted_state(&self) -> GameStateView<'_> {
        GameStateView {
            state: &self.predicted_state,
            step_id: self.predicted_step,
        }
    }
}

pub type EngineFactory = fn(ReconcilerSetup<'_>) -> MockEngine;

pub type MockClient = EngineClient<MockSession, EngineFactory>;

pub fn client_with(config: ClientConfig, session: MockSession, factory: EngineFactory) -> MockClient {
    EngineClient::new(config, session, factory).unwrap()
}

/// A client that has already received its game state at `step_id`
pub fn synced_client(config: ClientConfig, step_id: u32, factory: EngineFactory) -> MockClient {
    let mut client = client_with(config, MockSession::joined_at(step_id), factory);
    client.tick(Instant::now());
    assert!(client.must_submit_input());
    client
}
