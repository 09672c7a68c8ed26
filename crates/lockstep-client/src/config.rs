//! Engine client configuration
//!
//! Limits that size the client's owned buffers, the version triples of the
//! deterministic machines, and the opt-in diagnostics. Configs can be built
//! in code or loaded from RON.

use crate::{Error, Result};
use lockstep_core::Version;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest participant count the predicted path supports
pub const MAX_PREDICTED_PARTICIPANTS: usize = 32;

/// Largest single-participant payload; the wire length field is one octet
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// Octets the combined step record spends per participant besides the payload
pub(crate) const PARTICIPANT_HEADER_OCTETS: usize = 3;

/// Configuration for an [`EngineClient`](crate::EngineClient)
///
/// # Example
///
/// ```
/// use lockstep_client::ClientConfig;
///
/// let config = ClientConfig::from_ron_str(
///     "(max_payload_size: 16, max_participants: 4, debug_stream: true)",
/// )
/// .unwrap();
/// assert_eq!(config.max_participants, 4);
/// assert_eq!(config.tick_interval_ms, 16);
/// assert!(config.debug_stream);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum payload octets for a single participant in one step
    pub max_payload_size: usize,
    /// Maximum number of participants in one step
    pub max_participants: usize,
    /// Version of the authoritative deterministic machine
    pub authoritative_version: Version,
    /// Version of the predicted deterministic machine
    pub predicted_version: Version,
    /// Version sent along with join requests
    pub application_version: Version,
    /// How far the predicted simulation may run ahead of the authoritative one
    pub max_ticks_behind_authoritative: usize,
    /// Fixed tick interval in milliseconds
    pub tick_interval_ms: u64,
    /// Record a per-tick trace of controller decisions
    pub debug_stream: bool,
    /// Warn when the host calls `update` too rarely to keep the tick rate
    pub tick_quality_check: bool,
}

impl ClientConfig {
    /// Parse a config from RON text
    ///
    /// Missing fields take their default value. The result is validated.
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: ClientConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every limit is in range
    pub fn validate(&self) -> Result<()> {
        if self.max_payload_size == 0 || self.max_payload_size > MAX_PAYLOAD_SIZE {
            return Err(Error::InvalidConfig(format!(
                "max_payload_size must be in 1..={}, got {}",
                MAX_PAYLOAD_SIZE, self.max_payload_size
            )));
        }
        if self.max_participants == 0 || self.max_participants > MAX_PREDICTED_PARTICIPANTS {
            return Err(Error::InvalidConfig(format!(
                "max_participants must be in 1..={}, got {}",
                MAX_PREDICTED_PARTICIPANTS, self.max_participants
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "tick_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if both deterministic machines share a version
    pub fn versions_match(&self) -> bool {
        self.authoritative_version == self.predicted_version
    }

    /// Largest serialized combined step
    pub fn max_step_octets(&self) -> usize {
        1 + self.max_participants * (PARTICIPANT_HEADER_OCTETS + self.max_payload_size)
    }

    /// Tick interval as a duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 64,
            max_participants: 8,
            authoritative_version: Version::default(),
            predicted_version: Version::default(),
            application_version: Version::default(),
            max_ticks_behind_authoritative: 200,
            tick_interval_ms: 16,
            debug_stream: false,
            tick_quality_check: false,
        }
    }
}
