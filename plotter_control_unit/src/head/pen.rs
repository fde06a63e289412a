//! Pen lift.
//!
//! Two setpoints in the pen axis' logical frame: `up` is logical 0 (the
//! up stop plus retreat) and `down` is calibrated by [`Pen::setup`] or
//! taken from configuration. The pen counts as up while its position is
//! below `up + up_tolerance`.

use plotter_common::config::{PenConfig, PollConfig};
use plotter_common::error::RigError;
use plotter_common::hal::delay::Delay;
use plotter_common::hal::driver::Actuator;
use plotter_common::hal::types::StopAction;
use plotter_common::motion::Position;
use std::time::Duration;
use tracing::{debug, info};

use crate::motion::{BoundedAxis, LimitHoming, MoveOptions};
use crate::poll::{PollPolicy, poll_until};

/// Pen tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenSettings {
    /// Positions below `up + up_tolerance` count as up.
    pub up_tolerance: Position,
    /// Initial down setpoint.
    pub down_position: Position,
    /// Pause after homing.
    pub settle: Duration,
    /// Validator poll interval and cap.
    pub poll: PollPolicy,
}

impl PenSettings {
    /// Settings from the `[pen]` and `[poll]` sections.
    pub fn from_config(pen: &PenConfig, poll: &PollConfig) -> Self {
        Self {
            up_tolerance: pen.up_tolerance,
            down_position: pen.default_down,
            settle: pen.settle(),
            poll: PollPolicy::from(poll),
        }
    }
}

/// Pen lift actuator.
#[derive(Debug)]
pub struct Pen<A, D> {
    axis: BoundedAxis<A>,
    delay: D,
    settings: PenSettings,
    up_position: Position,
    down_position: Position,
}

impl<A: Actuator, D: Delay> Pen<A, D> {
    /// Pen on a homeable axis. Call [`Pen::reset`] before use.
    pub fn new(axis: BoundedAxis<A>, delay: D, settings: PenSettings) -> Self {
        Self {
            axis,
            delay,
            up_position: 0,
            down_position: settings.down_position,
            settings,
        }
    }

    /// Pen built from the `[pen]` and `[poll]` sections.
    pub fn from_config(actuator: A, delay: D, pen: &PenConfig, poll: &PollConfig) -> Self {
        let homing = LimitHoming::new(pen.home_direction, pen.power).with_retreat(pen.retreat_ticks);
        let axis = BoundedAxis::new("pen", actuator, pen.envelope(), pen.power).with_homing(homing);
        Self::new(axis, delay, PenSettings::from_config(pen, poll))
    }

    /// Underlying axis.
    pub fn axis(&self) -> &BoundedAxis<A> {
        &self.axis
    }

    /// Underlying axis, for direct positioning.
    pub fn axis_mut(&mut self) -> &mut BoundedAxis<A> {
        &mut self.axis
    }

    /// Logical up setpoint.
    pub fn up_position(&self) -> Position {
        self.up_position
    }

    /// Logical down setpoint.
    pub fn down_position(&self) -> Position {
        self.down_position
    }

    /// True while the pen is off the paper.
    pub fn is_up(&self) -> Result<bool, RigError> {
        Ok(self.axis.position()? < self.up_position + self.settings.up_tolerance)
    }

    fn options(power: Option<u8>) -> MoveOptions {
        match power {
            Some(p) => MoveOptions::blocking().with_power(p),
            None => MoveOptions::blocking(),
        }
    }

    /// Lift the pen unless it is already up.
    pub fn up(&mut self, power: Option<u8>) -> Result<(), RigError> {
        if !self.is_up()? {
            debug!("pen: up");
            self.axis.go_to(self.up_position, Self::options(power))?;
        }
        Ok(())
    }

    /// Lower the pen unless it is already down.
    pub fn down(&mut self, power: Option<u8>) -> Result<(), RigError> {
        if self.is_up()? {
            debug!("pen: down");
            self.axis.go_to(self.down_position, Self::options(power))?;
        }
        Ok(())
    }

    /// Lower a lifted pen, lift a lowered one.
    pub fn toggle(&mut self, power: Option<u8>) -> Result<(), RigError> {
        if self.is_up()? {
            self.down(power)
        } else {
            self.up(power)
        }
    }

    /// Home against the up stop and wait for the mechanics to settle.
    ///
    /// The pen holds its position after every stop.
    pub fn reset(&mut self, power: Option<u8>) -> Result<(), RigError> {
        self.axis.actuator_mut().set_stop_action(StopAction::Hold)?;
        let zero = self.axis.home(true, power)?;
        self.up_position = 0;
        self.delay.delay(self.settings.settle);
        debug!("pen: homed, up stop zero_offset={zero}");
        Ok(())
    }

    /// Calibrate the down setpoint.
    ///
    /// Homes, releases the motor so the operator can lower the pen by
    /// hand, polls `validator` until it confirms, records the position
    /// as the down setpoint and lifts the pen again.
    pub fn setup<F>(&mut self, mut validator: F, power: Option<u8>) -> Result<(), RigError>
    where
        F: FnMut() -> Result<bool, RigError>,
    {
        self.reset(power)?;
        self.axis.save_energy()?;
        poll_until(
            "pen down confirmation",
            &self.settings.poll,
            &mut self.delay,
            &mut validator,
        )?;

        let down = self.axis.position()?;
        self.axis.check_envelope(down)?;
        self.down_position = down;
        info!("pen: down setpoint calibrated at {down}");
        self.up(power)
    }

    /// Zero velocity.
    pub fn stop(&mut self) -> Result<(), RigError> {
        self.axis.stop()
    }

    /// Release holding torque.
    pub fn save_energy(&mut self) -> Result<(), RigError> {
        self.axis.save_energy()
    }
}
