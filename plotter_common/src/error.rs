//! Control-level error taxonomy.
//!
//! Envelope and state-precondition errors are raised synchronously to
//! the direct caller before any actuator command is issued. Nothing is
//! retried internally.

use crate::hal::driver::HalError;
use crate::motion::{Position, TravelEnvelope};
use thiserror::Error;

/// Errors raised by the rig components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RigError {
    /// Requested logical position violates the axis travel envelope.
    #[error("{axis}: position {position} is out of reachable bounds {envelope}")]
    OutOfBounds {
        axis: &'static str,
        position: Position,
        envelope: TravelEnvelope,
    },

    /// Roller positioning requested while no sheet is gripped.
    #[error("There is no paper")]
    NoPaper,

    /// Intake requested while a sheet is already loaded.
    #[error("Paper is already loaded")]
    PaperAlreadyLoaded,

    /// The gate lost the sheet during intake.
    #[error("Paper was lost during intake")]
    PaperLost,

    /// A millimetre distance has no finite tick count on this axis.
    #[error("{axis}: distance is not representable in encoder ticks")]
    InvalidDistance { axis: &'static str },

    /// Positioning requested on an axis without a valid reference frame.
    #[error("{axis}: axis is not referenced, home it first")]
    NotReferenced { axis: &'static str },

    /// A capped cooperative poll gave up.
    #[error("Gave up waiting for {what} after {iterations} polls")]
    PollExhausted { what: &'static str, iterations: u32 },

    /// The hardware back-end failed.
    #[error("Hardware error: {0}")]
    Hal(#[from] HalError),
}

impl RigError {
    /// True if the caller can fix the request and try again without
    /// operator intervention.
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. }
                | Self::InvalidDistance { .. }
                | Self::NoPaper
                | Self::PaperAlreadyLoaded
        )
    }
}
