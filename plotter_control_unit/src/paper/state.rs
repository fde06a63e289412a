//! Paper state machine of the roller pair.
//!
//! ```text
//!            begin_intake            intake_complete
//!   Empty ─────────────────► Gripping ───────────────► Loaded
//!     ▲                         │                        │
//!     └──── abort_intake ◄──────┘                        │
//!     └──────────────────────── ejected ◄────────────────┘
//! ```

use plotter_common::error::RigError;
use tracing::debug;

/// Whether the roller pair holds a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperState {
    /// No sheet gripped. Positioning is rejected.
    #[default]
    Empty,
    /// Intake sequence running.
    Gripping,
    /// Sheet gripped, roller offsets valid.
    Loaded,
}

/// Paper state with guarded transitions.
#[derive(Debug, Clone, Default)]
pub struct PaperStateMachine {
    state: PaperState,
}

impl PaperStateMachine {
    /// Machine in `Empty`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> PaperState {
        self.state
    }

    /// True while a sheet is gripped and positioning is allowed.
    #[inline]
    pub fn has_paper(&self) -> bool {
        self.state == PaperState::Loaded
    }

    /// Empty → Gripping.
    ///
    /// # Errors
    ///
    /// `PaperAlreadyLoaded` from any other state.
    pub fn begin_intake(&mut self) -> Result<(), RigError> {
        if self.state != PaperState::Empty {
            return Err(RigError::PaperAlreadyLoaded);
        }
        self.transition(PaperState::Gripping);
        Ok(())
    }

    /// Gripping → Loaded. Ignored from other states.
    pub fn intake_complete(&mut self) {
        if self.state == PaperState::Gripping {
            self.transition(PaperState::Loaded);
        }
    }

    /// Gripping → Empty after a failed intake.
    pub fn abort_intake(&mut self) {
        if self.state == PaperState::Gripping {
            self.transition(PaperState::Empty);
        }
    }

    /// Any → Empty once the gate confirmed the sheet left.
    pub fn ejected(&mut self) {
        self.transition(PaperState::Empty);
    }

    fn transition(&mut self, to: PaperState) {
        if self.state != to {
            debug!("paper: {:?} -> {:?}", self.state, to);
            self.state = to;
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
