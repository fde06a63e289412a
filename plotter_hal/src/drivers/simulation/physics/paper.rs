//! Paper sheet simulator.
//!
//! The sheet's feed *travel* is measured in in-feed roller ticks from the
//! point where the operator inserted it into the in-feed nip. The gate
//! sensor sits `gate_at` ticks downstream and sees paper while
//! `travel ∈ [gate_at, gate_at + length)`. The out-feed roller sits at
//! the gate: once the leading edge reached it, whichever roller turns
//! further moves the sheet.

use plotter_common::motion::Position;
use tracing::debug;

use super::motor::MILLI;

/// Geometry of the feed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperPath {
    /// Distance from the in-feed nip to the gate [ticks].
    pub gate_at: Position,
    /// Sheet length [ticks].
    pub length: Position,
}

impl Default for PaperPath {
    fn default() -> Self {
        Self {
            gate_at: 80,
            length: 1200,
        }
    }
}

/// Where a sheet currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetState {
    /// Nothing in the path.
    Absent,
    /// Sheet in the path, travel in milli-ticks.
    Feeding { travel: i64 },
    /// Sheet fell out behind the out-feed roller.
    Ejected,
}

/// Sheet plus path.
#[derive(Debug, Clone)]
pub struct PaperSimulator {
    path: PaperPath,
    state: SheetState,
}

impl PaperSimulator {
    /// Empty path.
    pub fn new(path: PaperPath) -> Self {
        Self {
            path,
            state: SheetState::Absent,
        }
    }

    /// Path geometry.
    pub fn path(&self) -> PaperPath {
        self.path
    }

    /// Current sheet state.
    pub fn state(&self) -> SheetState {
        self.state
    }

    /// Operator pushes a fresh sheet into the in-feed nip.
    pub fn insert(&mut self) {
        self.insert_at(0);
    }

    /// Place a sheet at an arbitrary travel, e.g. one left over from
    /// a previous run.
    pub fn insert_at(&mut self, travel: Position) {
        self.state = SheetState::Feeding {
            travel: i64::from(travel) * MILLI,
        };
    }

    /// Operator pulls the sheet out.
    pub fn remove(&mut self) {
        self.state = SheetState::Absent;
    }

    /// Travel in whole ticks, if a sheet is in the path.
    pub fn travel(&self) -> Option<Position> {
        match self.state {
            SheetState::Feeding { travel } => Some((travel / MILLI) as Position),
            _ => None,
        }
    }

    /// True while the sheet covers the gate.
    pub fn covers_gate(&self) -> bool {
        match self.travel() {
            Some(t) => t >= self.path.gate_at && t < self.path.gate_at + self.path.length,
            None => false,
        }
    }

    /// Apply one step of roller motion. Displacements are in the
    /// rollers' reported frames, in milli-ticks.
    pub fn feed(&mut self, in_delta: i64, out_delta: i64) {
        let SheetState::Feeding { travel } = &mut self.state else {
            return;
        };

        let engaged_out = *travel >= i64::from(self.path.gate_at) * MILLI;
        let delta = if engaged_out && out_delta.abs() > in_delta.abs() {
            out_delta
        } else {
            in_delta
        };
        // The in-feed nip cannot push the sheet out backwards.
        *travel = (*travel + delta).max(0);

        let tail_out = i64::from(self.path.gate_at + self.path.length) * MILLI;
        if *travel >= tail_out {
            debug!("paper: sheet ejected");
            self.state = SheetState::Ejected;
        }
    }
}
