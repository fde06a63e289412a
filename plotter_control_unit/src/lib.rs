//! # Plotter Control Unit Library
//!
//! Mechanical control core of the paper plotter: homing against
//! end-stops, bounded axes with reference frames, the paper gate, the
//! dual-roller synchronizer, the pen lift and the carriage.
//!
//! ## Layers
//!
//! 1. **Ports**: `Actuator`, `ColorSensor`, `Delay` from `plotter_common`
//! 2. **Motion**: [`motion::homing`] and [`motion::axis`]
//! 3. **Components**: [`paper`] (gate, roller pair) and [`head`] (pen, carriage)
//! 4. **Facade**: [`printer::Printer`]
//!
//! ## Execution model
//!
//! Single-threaded and cooperative. A non-blocking command only means
//! the motor keeps moving while the host goes on; every wait goes
//! through an injected `Delay` via [`poll::poll_until`].

pub mod head;
pub mod motion;
pub mod paper;
pub mod poll;
pub mod printer;

pub use head::{Carriage, Pen};
pub use motion::{BoundedAxis, LimitHoming, MoveOptions};
pub use paper::{PaperGate, PaperState, RollerPair};
pub use printer::{Printer, RigFlags, RigPorts, RigStatus};
