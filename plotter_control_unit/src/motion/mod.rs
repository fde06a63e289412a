//! Single-axis motion: limit homing and the bounded axis.

pub mod axis;
pub mod homing;

pub use axis::{BoundedAxis, MoveOptions};
pub use homing::{HomingPhase, LimitHoming, home, retreat, seek_end_stop};
