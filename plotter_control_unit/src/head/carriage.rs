//! Carriage: the horizontal pen axis.
//!
//! Left is positive velocity, right is negative. The right belt end is
//! both the home and the right limit.

use plotter_common::config::CarriageConfig;
use plotter_common::consts::SOFT_RETREAT_TICKS;
use plotter_common::error::RigError;
use plotter_common::hal::driver::Actuator;
use plotter_common::motion::{Direction, Position, mm_to_ticks};
use tracing::debug;

use crate::motion::{BoundedAxis, LimitHoming, MoveOptions, retreat, seek_end_stop};

/// Carriage axis.
#[derive(Debug)]
pub struct Carriage<A> {
    axis: BoundedAxis<A>,
    ticks_per_mm: f64,
}

impl<A: Actuator> Carriage<A> {
    /// Carriage on a homeable axis. Call [`Carriage::reset`] before use.
    pub fn new(axis: BoundedAxis<A>, ticks_per_mm: f64) -> Self {
        Self { axis, ticks_per_mm }
    }

    /// Carriage built from the `[carriage]` section.
    pub fn from_config(actuator: A, config: &CarriageConfig) -> Self {
        let homing = LimitHoming::new(config.home_direction, config.power)
            .with_retreat(config.retreat_ticks);
        let axis = BoundedAxis::new("carriage", actuator, config.envelope(), config.power)
            .with_homing(homing);
        Self::new(axis, config.ticks_per_mm)
    }

    /// Underlying axis.
    pub fn axis(&self) -> &BoundedAxis<A> {
        &self.axis
    }

    /// Underlying axis.
    pub fn axis_mut(&mut self) -> &mut BoundedAxis<A> {
        &mut self.axis
    }

    /// Logical position.
    pub fn position(&self) -> Result<Position, RigError> {
        self.axis.position()
    }

    /// Drive to a logical position.
    pub fn go_to(&mut self, position: Position, options: MoveOptions) -> Result<(), RigError> {
        self.axis.go_to(position, options)
    }

    /// Drive by `delta` ticks.
    pub fn move_by(&mut self, delta: Position, options: MoveOptions) -> Result<(), RigError> {
        self.axis.move_by(delta, options)
    }

    /// Drive by a distance in millimetres.
    pub fn move_mm(&mut self, mm: f64, options: MoveOptions) -> Result<(), RigError> {
        let ticks = mm_to_ticks(mm, self.ticks_per_mm).ok_or(RigError::InvalidDistance {
            axis: self.axis.name(),
        })?;
        self.axis.move_by(ticks, options)
    }

    fn power(&self, power: Option<u8>) -> u8 {
        power.unwrap_or(self.axis.power())
    }

    /// Run left until stopped.
    pub fn left(&mut self, power: Option<u8>) -> Result<(), RigError> {
        let power = self.power(power);
        self.axis.run(Direction::Positive.sign() * i32::from(power))
    }

    /// Run right until stopped.
    pub fn right(&mut self, power: Option<u8>) -> Result<(), RigError> {
        let power = self.power(power);
        self.axis.run(Direction::Negative.sign() * i32::from(power))
    }

    /// Zero velocity.
    pub fn stop(&mut self) -> Result<(), RigError> {
        self.axis.stop()
    }

    /// Release holding torque.
    pub fn save_energy(&mut self) -> Result<(), RigError> {
        self.axis.save_energy()
    }

    fn limit(
        &mut self,
        direction: Direction,
        soft_retreat: bool,
        power: Option<u8>,
    ) -> Result<(), RigError> {
        let power = self.power(power);
        let ticks = self
            .axis
            .homing()
            .map_or(SOFT_RETREAT_TICKS, |h| h.retreat_ticks);
        seek_end_stop(self.axis.actuator_mut(), direction, power)?;
        if soft_retreat {
            retreat(self.axis.actuator_mut(), direction, power, ticks)?;
        }
        debug!("carriage: at {direction:?} limit, raw={}", self.axis.raw_position()?);
        Ok(())
    }

    /// Drive against the right belt end. The reference frame is kept.
    pub fn right_limit(&mut self, soft_retreat: bool, power: Option<u8>) -> Result<(), RigError> {
        self.limit(Direction::Negative, soft_retreat, power)
    }

    /// Drive against the left belt end. The reference frame is kept.
    pub fn left_limit(&mut self, soft_retreat: bool, power: Option<u8>) -> Result<(), RigError> {
        self.limit(Direction::Positive, soft_retreat, power)
    }

    /// Home against the right belt end and return to logical 0.
    pub fn reset(&mut self, power: Option<u8>) -> Result<(), RigError> {
        self.axis.reset(power)
    }
}
