//! Error types for lockstep-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid participant id {0}: must be in 1..=64, zero is reserved")]
    InvalidParticipant(u8),

    #[error("Unknown step type {0}")]
    InvalidStepType(u8),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
