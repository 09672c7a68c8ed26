//! Lockstep Core - Shared types for deterministic lockstep synchronization
//!
//! This crate provides the vocabulary shared by every lockstep component:
//! - Wraparound-aware step identifiers (`StepId`)
//! - Participant identifiers and step types
//! - Borrowed per-participant inputs (`ParticipantInput`)
//! - Application/protocol version triples (`Version`)
//!
//! ## Step Ordering
//!
//! Step ids wrap around. Never compare them with `<` on the raw value;
//! use [`StepId::diff`]:
//!
//! ```
//! use lockstep_core::StepId;
//!
//! let before_wrap = StepId::new(u32::MAX);
//! let after_wrap = before_wrap.next();
//! assert_eq!(after_wrap.raw(), 0);
//! assert_eq!(after_wrap.diff(before_wrap), 1);
//! assert!(after_wrap.diff(before_wrap) > 0);
//! ```

mod error;
mod participant;
mod step_id;
mod version;

pub use error::{Error, Result};
pub use participant::{ParticipantId, ParticipantInput, StepType, MAX_PARTICIPANT_ID};
pub use step_id::StepId;
pub use version::Version;
