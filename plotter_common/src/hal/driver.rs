//! Actuator and sensor ports plus their error type.
//!
//! This module defines:
//! - `Actuator` trait - a single encoder-equipped motor
//! - `ColorSensor` trait - the paper gate's colour classifier
//! - `HalError` enum - failures reported by a back-end

use crate::hal::types::{Color, Polarity, RunLimit, StopAction};
use crate::motion::Position;
use thiserror::Error;

/// Error types for port operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Reading or writing the device failed
    #[error("Device I/O error: {0}")]
    Io(String),

    /// The device is not attached to the expected port
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// A blocking wait did not finish within the back-end's limit
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The back-end rejected a command argument
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Trait defining a single motor with an incremental encoder.
///
/// All positions are raw encoder ticks as seen through the configured
/// polarity. Powers are percentages in `0..=100`; signed velocities are
/// percentages in `-100..=100`.
///
/// # Blocking
///
/// Commands taking `block` return immediately when `block == false` and
/// the motor keeps moving in hardware. With `block == true` they return
/// once the motor reports that it stopped.
pub trait Actuator {
    /// Run continuously at a signed velocity.
    fn set_velocity(&mut self, percent: i32) -> Result<(), HalError>;

    /// Run at a signed velocity for a duration or a tick distance.
    ///
    /// For [`RunLimit::Ticks`] the sign of `percent` selects the direction.
    fn run_for(&mut self, percent: i32, limit: RunLimit, block: bool) -> Result<(), HalError>;

    /// Drive to an absolute raw position.
    fn move_to(&mut self, position: Position, power: u8, block: bool) -> Result<(), HalError>;

    /// Command zero velocity using the configured stop action.
    fn stop(&mut self) -> Result<(), HalError>;

    /// Toggle holding torque.
    ///
    /// `true` actively holds the current position; `false` stops and
    /// coasts, releasing the shaft to cut current draw.
    fn hold(&mut self, enabled: bool) -> Result<(), HalError>;

    /// Current raw encoder position.
    fn position(&self) -> Result<Position, HalError>;

    /// Block until the motor reports that it is not moving.
    ///
    /// Returns on stall against an obstacle as well as on completion.
    fn wait_until_stopped(&mut self) -> Result<(), HalError>;

    /// Polarity the driver applies to commands and readings.
    fn polarity(&self) -> Polarity;

    /// Configure the behaviour of subsequent `stop()` calls.
    fn set_stop_action(&mut self, action: StopAction) -> Result<(), HalError>;
}

/// Trait for the colour classifier used as a paper presence gate.
pub trait ColorSensor {
    /// Single-shot, non-debounced colour reading.
    fn color(&mut self) -> Result<Color, HalError>;
}
