//! Wraparound-aware step identifiers
//!
//! A `StepId` names one discrete simulation tick's input or state. The
//! counter wraps at `u32::MAX`, so ordering is defined by the signed
//! difference between two ids rather than by their raw values. Two ids
//! compare correctly as long as they are less than `2^31` steps apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monotonic, wrapping step identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub u32);

impl StepId {
    /// Create a new step id
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// The id directly after this one
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Move this id by a signed number of steps
    pub fn offset(self, steps: i32) -> Self {
        Self(self.0.wrapping_add_signed(steps))
    }

    /// Signed distance `self - other`
    ///
    /// Positive when `self` lies ahead of `other`.
    ///
    /// ```
    /// use lockstep_core::StepId;
    ///
    /// assert_eq!(StepId::new(120).diff(StepId::new(100)), 20);
    /// assert_eq!(StepId::new(100).diff(StepId::new(120)), -20);
    /// assert_eq!(StepId::new(2).diff(StepId::new(u32::MAX - 1)), 4);
    /// ```
    pub fn diff(self, other: StepId) -> i32 {
        self.0.wrapping_sub(other.0) as i32
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl From<u32> for StepId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_next_wraps() {
        let id = StepId::new(u32::MAX);
        assert_eq!(id.next(), StepId::new(0));
    }

    #[test]
    fn test_diff_across_wrap() {
        let before = StepId::new(u32::MAX - 2);
        let after = StepId::new(3);
        assert_eq!(after.diff(before), 6);
        assert_eq!(before.diff(after), -6);
    }

    #[test]
    fn test_offset_negative() {
        assert_eq!(StepId::new(10).offset(-4), StepId::new(6));
        assert_eq!(StepId::new(1).offset(-2), StepId::new(u32::MAX));
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(format!("{}", StepId::new(0xAB)), "000000AB");
    }

    #[test]
    fn test_serde_transparent() {
        let id = StepId::new(42);
        let text = ron::to_string(&id).unwrap();
        assert_eq!(text, "42");
        let back: StepId = ron::from_str(&text).unwrap();
        assert_eq!(back, id);
    }

    proptest! {
        #[test]
        fn diff_is_antisymmetric(a in any::<u32>(), steps in -1_000_000i32..1_000_000) {
            let base = StepId::new(a);
            let moved = base.offset(steps);
            prop_assert_eq!(moved.diff(base), steps);
            prop_assert_eq!(base.diff(moved), -steps);
        }
    }
}
