//! Port-level value types.
//!
//! - `Polarity` - signed gain applied by the driver to every command and reading
//! - `StopAction` - what a motor does when told to stop
//! - `RunLimit` - how long a `run_for` command lasts
//! - `Color` - colour classification reported by the paper gate sensor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Motor polarity, fixed when the driver-side actuator is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Positive commands turn the shaft in its native direction.
    #[default]
    Normal,
    /// Commands and readings are mirrored.
    Inverted,
}

impl Polarity {
    /// Signed gain (+1 / -1).
    #[inline]
    pub const fn gain(self) -> i32 {
        match self {
            Self::Normal => 1,
            Self::Inverted => -1,
        }
    }
}

/// Behaviour of a motor after a stop command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StopAction {
    /// Remove power and let the shaft spin down freely.
    Coast,
    /// Short the windings; passive resistance only.
    #[default]
    Brake,
    /// Actively hold the stop position.
    Hold,
}

impl StopAction {
    /// True if the motor keeps torque on the shaft after stopping.
    #[inline]
    pub const fn holds(self) -> bool {
        matches!(self, Self::Hold)
    }
}

/// Extent of a `run_for` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLimit {
    /// Run for a fixed wall-clock duration.
    Duration(Duration),
    /// Run until the encoder advanced by this many ticks.
    Ticks(u32),
}

/// Colour classification of the paper gate sensor.
///
/// Discriminants are the raw mode values reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    /// Nothing recognisable in front of the sensor.
    #[default]
    NoColor = 0,
    Black = 1,
    Blue = 2,
    Green = 3,
    Yellow = 4,
    Red = 5,
    White = 6,
    Brown = 7,
}

impl Color {
    /// Decode a raw sensor mode value.
    #[inline]
    pub const fn from_code(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NoColor),
            1 => Some(Self::Black),
            2 => Some(Self::Blue),
            3 => Some(Self::Green),
            4 => Some(Self::Yellow),
            5 => Some(Self::Red),
            6 => Some(Self::White),
            7 => Some(Self::Brown),
            _ => None,
        }
    }

    /// Raw sensor mode value.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}
