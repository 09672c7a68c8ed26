//! Predicted step serialization
//!
//! Each predicted step leaves the client as one combined record holding
//! every local participant's input:
//!
//! ```text
//! participant_count: u8
//! repeated participant_count times:
//!     participant_id: u8     (1..=64)
//!     step_type:      u8     (0 = normal)
//!     payload_len:    u8
//!     payload:        [u8; payload_len]
//! ```

use crate::input_latch::InputSnapshot;
use lockstep_core::ParticipantId;
use thiserror::Error;

/// Errors raised while encoding a combined step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("{participant} payload of {len} octets does not fit a one-octet length")]
    PayloadTooLarge {
        participant: ParticipantId,
        len: usize,
    },

    #[error("combined step needs {needed} octets, limit is {limit}")]
    StepTooLarge { needed: usize, limit: usize },
}

/// Serializes a latched input into the outgoing wire format
pub trait StepCodec {
    /// Encode `snapshot` into `out`, replacing its contents
    ///
    /// Returns the number of octets written. On error `out` must not be
    /// sent anywhere.
    fn encode(&self, snapshot: &InputSnapshot<'_>, out: &mut Vec<u8>) -> Result<usize, CodecError>;
}

/// Codec for the combined step record
#[derive(Debug, Clone, Copy)]
pub struct CombinedStepCodec {
    max_octets: usize,
}

impl CombinedStepCodec {
    /// Create a codec refusing steps larger than `max_octets`
    pub fn new(max_octets: usize) -> Self {
        Self { max_octets }
    }
}

impl StepCodec for CombinedStepCodec {
    fn encode(&self, snapshot: &InputSnapshot<'_>, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        out.clear();

        let needed = 1 + snapshot
            .iter()
            .map(|p| 3 + p.payload.len())
            .sum::<usize>();
        if needed > self.max_octets {
            return Err(CodecError::StepTooLarge {
                needed,
                limit: self.max_octets,
            });
        }

        let count = u8::try_from(snapshot.participant_count()).map_err(|_| {
            CodecError::StepTooLarge {
                needed,
                limit: self.max_octets,
            }
        })?;
        out.push(count);

        for participant in snapshot.iter() {
            let len = u8::try_from(participant.payload.len()).map_err(|_| {
                CodecError::PayloadTooLarge {
                    participant: participant.participant_id,
                    len: participant.payload.len(),
                }
            })?;
            out.push(participant.participant_id.raw());
            out.push(participant.step_type.as_u8());
            out.push(len);
            out.extend_from_slice(participant.payload);
        }

        Ok(out.len())
    }
}
