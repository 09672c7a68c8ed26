//! Network session interface
//!
//! The engine client does not own a transport. It drives whatever session
//! layer the host plugs in through [`NetworkSession`]: handshake, join
//! protocol, latency measurement, the outgoing and inbound step streams
//! and per-connection statistics all live behind this trait.

use lockstep_core::{StepId, Version};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Most local players a single join request can carry
pub const MAX_LOCAL_PLAYERS: usize = 8;

/// Connection state reported by the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Connecting or handshaking
    Init,
    /// Reconnecting after a lost connection
    ReInit,
    /// Session state was cleared, waiting for a new join
    Cleared,
    /// Connection closed
    Disconnected,
    /// Joined, with a full game state available
    Synced,
}

/// Full game state the server handed over on join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedGameState<'a> {
    /// Serialized simulation state
    pub state: &'a [u8],
    /// Step the state was captured at
    pub step_id: StepId,
}

/// Averaged connection statistics; `None` until enough samples arrived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    /// How far ahead (positive) or behind (negative) the server reports our steps
    pub authoritative_buffer_delta_average: Option<i32>,
    /// Steps waiting in the server's inbound buffer for this client
    pub server_inbound_buffer_step_count_average: Option<i32>,
    /// Round-trip latency in milliseconds
    pub latency_ms_average: Option<u32>,
}

/// One local player asking to join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPlayer {
    /// Index of the player on this host (controller slot, split-screen seat)
    pub local_index: u8,
}

/// How the client wants to enter the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JoinType {
    /// Join as new participants
    #[default]
    NoSecret,
    /// Reclaim participant slots held by a previous connection
    HostMigrationParticipantId(u8),
    /// Join the party identified by the secret
    WithPartySecret,
}

/// Options the host passes to `request_join`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameJoinOptions {
    /// Local players to join (at most [`MAX_LOCAL_PLAYERS`])
    pub players: Vec<LocalPlayer>,
    /// Join mode
    pub join_type: JoinType,
    /// Secret identifying the party to join
    pub party_secret: u64,
}

impl GameJoinOptions {
    /// Join the given local player indices as new participants
    pub fn with_local_players(indices: impl IntoIterator<Item = u8>) -> Self {
        Self {
            players: indices
                .into_iter()
                .map(|local_index| LocalPlayer { local_index })
                .collect(),
            ..Self::default()
        }
    }
}

/// Join request forwarded to the session layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Players, join type and secret as requested by the host
    pub options: GameJoinOptions,
    /// Version of the authoritative machine the client runs
    pub application_version: Version,
}

/// Session layer driven by the engine client
///
/// All methods are non-blocking. The client calls [`update`](Self::update)
/// once at the start of every tick before reading anything else.
pub trait NetworkSession {
    /// Error type for step stream operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Pump the connection: send, receive, update statistics
    fn update(&mut self, now: Instant);

    /// Current connection state
    fn state(&self) -> SessionState;

    /// Game state received on join, once available
    fn joined_game_state(&self) -> Option<JoinedGameState<'_>>;

    /// Ask to join the game; the outcome shows up later through [`state`](Self::state)
    fn request_join(&mut self, request: JoinRequest);

    /// Ask the server to let the local participants leave
    fn request_disconnect(&mut self);

    /// Returns true once the outgoing step stream has a base step id
    fn outgoing_initialized(&self) -> bool;

    /// Returns true once the inbound step stream has a base step id
    fn inbound_initialized(&self) -> bool;

    /// Step id the server wants this client to produce next, if known
    fn optimal_step_id(&self) -> Option<StepId>;

    /// Step id the next outgoing step will be written under
    fn outgoing_cursor(&self) -> StepId;

    /// Drop every queued outgoing step and restart the stream at `base`
    fn reset_outgoing(&mut self, base: StepId);

    /// Append a serialized step; on success the cursor moves past `step_id`
    fn push_outgoing(&mut self, step_id: StepId, payload: &[u8]) -> Result<(), Self::Error>;

    /// Number of authoritative steps waiting to be read
    fn inbound_step_count(&self) -> usize;

    /// Pop the oldest authoritative step into `buf`
    ///
    /// Returns the step id and the number of octets written. The step is
    /// consumed whether or not it could be read.
    fn read_inbound_step(&mut self, buf: &mut [u8]) -> Result<(StepId, usize), Self::Error>;

    /// Averaged connection statistics
    fn stats(&self) -> NetworkStats;
}
