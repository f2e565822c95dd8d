//! Simulated time.
//!
//! Time is a plain 64-bit tick count. The foreign-call boundary historically exchanges time as
//! a `(high, low)` pair of 32-bit words, so [`SimTime`] offers both views.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A point in simulated time, in simulation precision units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime(pub u64);

impl SimTime {
    /// Time zero.
    pub const ZERO: Self = Self(0);

    /// Builds a time from its `(high, low)` 32-bit halves.
    pub const fn from_pair(high: u32, low: u32) -> Self {
        Self(((high as u64) << 32) | low as u64)
    }

    /// Upper 32 bits.
    pub const fn high(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Lower 32 bits.
    pub const fn low(self) -> u32 {
        self.0 as u32
    }

    /// Returns the `(high, low)` pair.
    pub const fn pair(self) -> (u32, u32) {
        (self.high(), self.low())
    }

    /// Returns the raw tick count.
    pub const fn ticks(self) -> u64 {
        self.0
    }
}

impl Add<u64> for SimTime {
    type Output = Self;

    fn add(self, delay: u64) -> Self {
        Self(self.0.saturating_add(delay))
    }
}

impl From<u64> for SimTime {
    fn from(ticks: u64) -> Self {
        Self(ticks)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
