//! Positions, travel envelopes and drive directions.
//!
//! Every coordinate in the workspace is an encoder tick count
//! (degrees-equivalent). Raw positions come straight from the actuator;
//! logical positions are raw positions minus the axis zero offset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed encoder position [ticks].
pub type Position = i32;

/// Drive direction along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Increasing encoder ticks.
    #[default]
    Positive,
    /// Decreasing encoder ticks.
    Negative,
}

impl Direction {
    /// Sign multiplier for velocities and deltas.
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }

    /// The opposite direction.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// Closed travel interval `[lower, upper]` in logical ticks.
///
/// Both bounds are inclusive everywhere in the workspace. An open
/// interval is converted once with [`TravelEnvelope::from_exclusive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelEnvelope {
    /// Lowest reachable logical position (inclusive).
    pub lower: Position,
    /// Highest reachable logical position (inclusive).
    pub upper: Position,
}

impl TravelEnvelope {
    /// Create an envelope from inclusive bounds.
    pub const fn new(lower: Position, upper: Position) -> Self {
        Self { lower, upper }
    }

    /// Create an envelope from an open interval `(lower, upper)`.
    pub const fn from_exclusive(lower: Position, upper: Position) -> Self {
        Self {
            lower: lower + 1,
            upper: upper - 1,
        }
    }

    /// Check if a logical position is reachable.
    #[inline]
    pub const fn contains(&self, position: Position) -> bool {
        position >= self.lower && position <= self.upper
    }

    /// True if no position satisfies the envelope.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.lower > self.upper
    }
}

impl fmt::Display for TravelEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Convert millimetres to whole ticks for a given transmission ratio.
///
/// Returns `None` if the product is not finite or does not fit a
/// [`Position`].
#[inline]
pub fn mm_to_ticks(mm: f64, ticks_per_mm: f64) -> Option<Position> {
    let ticks = (mm * ticks_per_mm).round();
    if ticks.is_finite() && ticks >= f64::from(Position::MIN) && ticks <= f64::from(Position::MAX) {
        Some(ticks as Position)
    } else {
        None
    }
}
