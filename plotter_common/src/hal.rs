//! Hardware abstraction ports consumed by the control unit.
//!
//! - [`driver`] - `Actuator` / `ColorSensor` traits and `HalError`
//! - [`types`] - polarity, stop actions, run limits, colour codes
//! - [`delay`] - injectable cooperative delay

pub mod delay;
pub mod driver;
pub mod types;
