//! Simulation driver module.
//!
//! Deterministic software back-end for the actuator, colour sensor and
//! delay ports, for development and testing without the physical rig.
//! Simulated time advances only while the control code waits.

mod actuator;
mod driver;
mod io;
mod physics;
mod world;

pub use actuator::SimActuator;
pub use driver::{SimRig, SimulationConfig};
pub use io::{SimColorSensor, SimDelay};
pub use physics::{Drive, MILLI, MotorSpec, PaperPath, PaperSimulator, SheetState, SimMotor};
pub use world::{DEFAULT_BLOCK_LIMIT, JournalEntry, MotorId, SimCommand, SimHandle, SimWorld};

/// Factory function to create a simulated rig.
pub fn create_rig(config: &SimulationConfig) -> SimRig {
    SimRig::build(config)
}
