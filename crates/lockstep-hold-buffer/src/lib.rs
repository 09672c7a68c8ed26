//! Lockstep Hold Buffer - Sticky boolean signals over a fixed window
//!
//! This crate provides a bounded ring of boolean samples that reports
//! "positive" as long as any sample still retained in the window was
//! positive. It turns noisy per-tick conditions into a hysteretic signal:
//! a single positive sample keeps the signal asserted for a full window,
//! so short jitter and sustained stalls can be told apart by pairing
//! windows fed with stricter and looser conditions.
//!
//! # Features
//!
//! - **Bounded memory**: Fixed-size ring, allocated once
//! - **O(1) insertion**: Constant time to add a sample
//! - **O(1) query**: A running count of positive samples is maintained
//! - **Automatic eviction**: The oldest sample drops out when full
//!
//! # Example
//!
//! ```rust
//! use lockstep_hold_buffer::HoldPositive;
//!
//! // Remember the last 20 samples
//! let mut gap = HoldPositive::new(20);
//! assert!(!gap.is_positive());
//!
//! gap.add(true);
//! for _ in 0..19 {
//!     gap.add(false);
//! }
//! // The positive sample is still inside the window
//! assert!(gap.is_positive());
//!
//! gap.add(false);
//! assert!(!gap.is_positive());
//! ```

/// A ring buffer of boolean samples with sticky positive reporting
#[derive(Debug, Clone)]
pub struct HoldPositive {
    /// Ring buffer storage
    samples: Vec<bool>,
    /// Current write position in the ring buffer
    head: usize,
    /// Number of samples currently stored
    count: usize,
    /// Number of stored samples that are positive
    positive_count: usize,
}

impl HoldPositive {
    /// Create a new window holding `capacity` samples
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            samples: vec![false; capacity],
            head: 0,
            count: 0,
            positive_count: 0,
        }
    }

    /// Add one sample, evicting the oldest when the window is full
    pub fn add(&mut self, sample: bool) {
        if self.count == self.samples.len() {
            if self.samples[self.head] {
                self.positive_count -= 1;
            }
        } else {
            self.count += 1;
        }

        self.samples[self.head] = sample;
        if sample {
            self.positive_count += 1;
        }

        self.head = (self.head + 1) % self.samples.len();
    }

    /// Returns true if any retained sample was positive
    pub fn is_positive(&self) -> bool {
        self.positive_count > 0
    }
}
