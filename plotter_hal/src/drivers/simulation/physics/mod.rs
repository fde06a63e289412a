//! Physics simulation module.
//!
//! Integer kinematics for encoder motors and the paper feed path.

mod motor;
mod paper;

pub use motor::{Drive, MILLI, MotorSpec, SimMotor};
pub use paper::{PaperPath, PaperSimulator, SheetState};
