//! Participant identity and per-participant step input

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest participant id a step may carry
pub const MAX_PARTICIPANT_ID: u8 = 64;

/// Identifier of one participant in a session
///
/// Valid ids are `1..=64`. Zero is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ParticipantId(u8);

impl ParticipantId {
    /// Create a participant id, rejecting zero and ids above 64
    pub fn new(id: u8) -> Result<Self> {
        if id == 0 || id > MAX_PARTICIPANT_ID {
            return Err(Error::InvalidParticipant(id));
        }
        Ok(Self(id))
    }

    /// Get the raw id value
    pub fn raw(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ParticipantId {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        Self::new(id)
    }
}

impl From<ParticipantId> for u8 {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "participant:{}", self.0)
    }
}

/// Kind of input a participant contributed to a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum StepType {
    /// Regular input sampled from the participant
    #[default]
    Normal = 0,
    /// The server did not receive input in time and substituted its own
    NotProvidedInTime = 1,
    /// The participant is waiting to rejoin and contributes nothing
    WaitingForRejoin = 2,
}

impl StepType {
    /// Wire representation
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for StepType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(StepType::Normal),
            1 => Ok(StepType::NotProvidedInTime),
            2 => Ok(StepType::WaitingForRejoin),
            other => Err(Error::InvalidStepType(other)),
        }
    }
}

/// Input sampled for one participant, borrowed from the host
///
/// The id is kept raw so that hosts can hand over whatever they sampled;
/// validation happens where the input is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantInput<'a> {
    /// Raw participant id (valid range `1..=64`)
    pub participant_id: u8,
    /// Application-specific payload
    pub payload: &'a [u8],
}

impl<'a> ParticipantInput<'a> {
    /// Create a participant input
    pub fn new(participant_id: u8, payload: &'a [u8]) -> Self {
        Self {
            participant_id,
            payload,
        }
    }
}
