//! Prelude module for common re-exports.
//!
//! Consumers can do `use plotter_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    CarriageConfig, ConfigError, ConfigLoader, LogLevel, PenConfig, PollConfig, RigConfig,
    RollerConfig, SharedConfig,
};

// ─── Motion ─────────────────────────────────────────────────────────
pub use crate::motion::{Direction, Position, TravelEnvelope, mm_to_ticks};

// ─── Ports ──────────────────────────────────────────────────────────
pub use crate::hal::delay::{Delay, ThreadDelay};
pub use crate::hal::driver::{Actuator, ColorSensor, HalError};
pub use crate::hal::types::{Color, Polarity, RunLimit, StopAction};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::RigError;
