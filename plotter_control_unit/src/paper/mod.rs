//! Paper handling: presence gate, paper state and the roller pair.

pub mod gate;
pub mod rollers;
pub mod state;

pub use gate::PaperGate;
pub use rollers::{RollerOffsets, RollerPair, RollerSettings};
pub use state::{PaperState, PaperStateMachine};
