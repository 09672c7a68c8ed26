//! Error types for lockstep-client
//!
//! Only construction, config loading, `submit_input` and `request_join`
//! hand errors back to the caller. Everything that fails while ticking is
//! turned into one of these values, logged, and then dropped.

use crate::codec::CodecError;
use lockstep_core::{ParticipantId, StepId, Version};
use thiserror::Error;

/// Boxed error coming from a collaborator (session or reconciliation engine)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for lockstep-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lockstep-client
#[derive(Debug, Error)]
pub enum Error {
    /// Authoritative and predicted machines were built from different versions
    #[error("not same machine version: authoritative {authoritative}, predicted {predicted}")]
    ConfigMismatch {
        authoritative: Version,
        predicted: Version,
    },

    /// A configured limit is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An inbound authoritative step could not be read
    #[error("could not read authoritative step: {0}")]
    ReadFailure(#[source] BoxError),

    /// The reconciliation engine refused a step
    #[error("reconciliation engine rejected step {step_id}: {source}")]
    ForwardFailure {
        step_id: StepId,
        #[source]
        source: BoxError,
    },

    /// The outgoing step stream refused a predicted step
    #[error("could not write predicted step {step_id}: {source}")]
    OutgoingFailure {
        step_id: StepId,
        #[source]
        source: BoxError,
    },

    /// A predicted step could not be serialized
    #[error("could not serialize predicted step: {0}")]
    EncodeFailure(#[from] CodecError),

    /// A participant id was outside `1..=64`
    #[error(transparent)]
    InvalidParticipant(#[from] lockstep_core::Error),

    /// The same participant appeared twice in one input
    #[error("{0} submitted more than once")]
    DuplicateParticipant(ParticipantId),

    /// A participant payload exceeded the configured maximum
    #[error("{participant} payload is {len} octets, maximum is {max}")]
    PayloadTooLarge {
        participant: ParticipantId,
        len: usize,
        max: usize,
    },

    /// More participants than the configured maximum
    #[error("{count} participants submitted, maximum is {max}")]
    TooManyParticipants { count: usize, max: usize },

    /// More local players than a join request can carry
    #[error("{count} local players requested, a join carries at most {max}")]
    TooManyLocalPlayers { count: usize, max: usize },

    /// Config file could not be parsed
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
