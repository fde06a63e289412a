//! Driver implementations of the plotter ports.
//!
//! - [`simulation`] - Software simulation driver for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `Actuator` and `ColorSensor` from `plotter_common::hal::driver`
//! 3. Add export and documentation

pub mod simulation;
