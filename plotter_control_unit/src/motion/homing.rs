//! Limit homing against a mechanical end-stop.
//!
//! ## Sequence
//!
//! 1. `Seek`: run at `power` toward `direction` and wait until the
//!    actuator reports that it stopped (stall on the end-stop).
//! 2. Release: zero velocity without holding torque.
//! 3. `Retreat` (optional): back off `retreat_ticks` away from the stop.
//! 4. The actuator's raw position is the new zero offset.
//!
//! There is no timeout. An actuator that never stalls blocks the wait,
//! unless the back-end itself reports an error.

use plotter_common::consts::SOFT_RETREAT_TICKS;
use plotter_common::error::RigError;
use plotter_common::hal::driver::Actuator;
use plotter_common::hal::types::RunLimit;
use plotter_common::motion::{Direction, Position};
use tracing::debug;

// ─── Homing Phases ──────────────────────────────────────────────────

/// Phase of a running homing sequence, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingPhase {
    /// Driving toward the end-stop.
    Seek,
    /// Backing off the end-stop.
    Retreat,
    /// Zero offset recorded.
    Complete,
}

// ─── Limit Homing ───────────────────────────────────────────────────

/// Homing parameters of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitHoming {
    /// Direction of the end-stop used as home.
    pub direction: Direction,
    /// Default seek power [%].
    pub power: u8,
    /// Back-off distance after contact [ticks].
    pub retreat_ticks: u32,
}

impl LimitHoming {
    /// Homing toward `direction` with the standard 50-tick retreat.
    pub const fn new(direction: Direction, power: u8) -> Self {
        Self {
            direction,
            power,
            retreat_ticks: SOFT_RETREAT_TICKS,
        }
    }

    /// Same parameters with another retreat distance.
    pub const fn with_retreat(self, retreat_ticks: u32) -> Self {
        Self {
            retreat_ticks,
            ..self
        }
    }

    /// Run the homing sequence and return the zero offset.
    pub fn home<A: Actuator + ?Sized>(
        &self,
        actuator: &mut A,
        soft_retreat: bool,
        power: Option<u8>,
    ) -> Result<Position, RigError> {
        let power = power.unwrap_or(self.power);
        seek_end_stop(actuator, self.direction, power)?;
        if soft_retreat {
            retreat(actuator, self.direction, power, self.retreat_ticks)?;
        }
        let zero = actuator.position()?;
        debug!(
            "homing: {:?} direction={:?} zero_offset={zero}",
            HomingPhase::Complete,
            self.direction
        );
        Ok(zero)
    }
}

/// Home with the standard retreat distance.
///
/// Returns the actuator's raw position after the sequence.
pub fn home<A: Actuator + ?Sized>(
    actuator: &mut A,
    direction: Direction,
    power: u8,
    soft_retreat: bool,
) -> Result<Position, RigError> {
    LimitHoming::new(direction, power).home(actuator, soft_retreat, None)
}

/// Drive toward `direction` until stall, then release the motor.
pub fn seek_end_stop<A: Actuator + ?Sized>(
    actuator: &mut A,
    direction: Direction,
    power: u8,
) -> Result<(), RigError> {
    debug!("homing: {:?} direction={direction:?} power={power}", HomingPhase::Seek);
    actuator.set_velocity(direction.sign() * i32::from(power))?;
    actuator.wait_until_stopped()?;
    actuator.hold(false)?;
    Ok(())
}

/// Back off `ticks` away from the end-stop in `direction`.
pub fn retreat<A: Actuator + ?Sized>(
    actuator: &mut A,
    direction: Direction,
    power: u8,
    ticks: u32,
) -> Result<(), RigError> {
    debug!("homing: {:?} ticks={ticks}", HomingPhase::Retreat);
    actuator.run_for(
        direction.opposite().sign() * i32::from(power),
        RunLimit::Ticks(ticks),
        true,
    )?;
    Ok(())
}
