//! Latched per-participant input
//!
//! The host samples input at its own frame rate while steps are produced at
//! the tick rate. The latch keeps the most recent sample so every tick can
//! replay it zero, one or two times without going back to the host.

use crate::{Error, Result};
use log::warn;
use lockstep_core::{ParticipantId, ParticipantInput, StepType};

/// Where one participant's payload lives inside the latch buffer
#[derive(Debug, Clone, Copy)]
struct LatchEntry {
    participant_id: ParticipantId,
    step_type: StepType,
    offset: usize,
    len: usize,
}

/// Owned copy of the last accepted input
///
/// The payload buffer is sized `max_participants * max_payload_size` on
/// creation and never grows.
#[derive(Debug)]
pub struct InputLatch {
    buffer: Vec<u8>,
    entries: Vec<LatchEntry>,
    max_participants: usize,
    max_payload_size: usize,
    latched: bool,
}

impl InputLatch {
    /// Create an empty latch for the given limits
    pub fn new(max_participants: usize, max_payload_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_participants * max_payload_size),
            entries: Vec::with_capacity(max_participants),
            max_participants,
            max_payload_size,
            latched: false,
        }
    }

    /// Replace the latched input
    ///
    /// Every entry is validated before anything is copied; on error the
    /// previous snapshot stays untouched.
    pub fn submit(&mut self, inputs: &[ParticipantInput<'_>]) -> Result<()> {
        if let Err(err) = self.validate(inputs) {
            warn!("rejected input: {}", err);
            return Err(err);
        }

        self.buffer.clear();
        self.entries.clear();
        for input in inputs {
            let offset = self.buffer.len();
            self.buffer.extend_from_slice(input.payload);
            self.entries.push(LatchEntry {
                // Checked by validate()
                participant_id: ParticipantId::new(input.participant_id)?,
                step_type: StepType::Normal,
                offset,
                len: input.payload.len(),
            });
        }
        self.latched = true;

        Ok(())
    }

    fn validate(&self, inputs: &[ParticipantInput<'_>]) -> Result<()> {
        if inputs.len() > self.max_participants {
            return Err(Error::TooManyParticipants {
                count: inputs.len(),
                max: self.max_participants,
            });
        }

        // Ids are 1..=64, one bit each
        let mut seen: u64 = 0;
        for input in inputs {
            let participant = ParticipantId::new(input.participant_id)?;
            let bit = 1u64 << (participant.raw() - 1);
            if seen & bit != 0 {
                return Err(Error::DuplicateParticipant(participant));
            }
            seen |= bit;

            if input.payload.len() > self.max_payload_size {
                return Err(Error::PayloadTooLarge {
                    participant,
                    len: input.payload.len(),
                    max: self.max_payload_size,
                });
            }
        }

        Ok(())
    }

    /// The latched input, or `None` if nothing was accepted yet
    pub fn snapshot(&self) -> Option<InputSnapshot<'_>> {
        self.latched.then(|| InputSnapshot {
            entries: &self.entries,
            buffer: &self.buffer,
        })
    }

}

/// Read-only view of a latched input
#[derive(Debug, Clone, Copy)]
pub struct InputSnapshot<'a> {
    entries: &'a [LatchEntry],
    buffer: &'a [u8],
}

impl<'a> InputSnapshot<'a> {
    /// Number of participants in this input
    pub fn participant_count(&self) -> usize {
        self.entries.len()
    }

    /// Participants in submission order
    pub fn iter(&self) -> impl Iterator<Item = LatchedParticipant<'a>> + 'a {
        let buffer = self.buffer;
        self.entries.iter().map(move |entry| LatchedParticipant {
            participant_id: entry.participant_id,
            step_type: entry.step_type,
            payload: &buffer[entry.offset..entry.offset + entry.len],
        })
    }
}

/// One participant's input inside a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatchedParticipant<'a> {
    pub participant_id: ParticipantId,
    pub step_type: StepType,
    pub payload: &'a [u8],
}
