//! Bounded axis: one actuator, a reference frame and a travel envelope.
//!
//! Logical positions are `raw - zero_offset`. Every absolute target is
//! checked against the envelope in the logical frame before anything
//! is sent to the actuator. The frame starts invalid and is established
//! by homing, or bound explicitly with [`BoundedAxis::set_reference`].

use plotter_common::error::RigError;
use plotter_common::hal::driver::Actuator;
use plotter_common::motion::{Position, TravelEnvelope};
use tracing::{debug, trace};

use super::homing::LimitHoming;

// ─── Move Options ───────────────────────────────────────────────────

/// Optional arguments of `go_to` / `move_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOptions {
    /// Drive power. `None` uses the axis default.
    pub power: Option<u8>,
    /// Wait for the motion to finish.
    pub block: bool,
    /// Skip the envelope check.
    pub override_envelope: bool,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self::blocking()
    }
}

impl MoveOptions {
    /// Blocking move at default power within the envelope.
    pub const fn blocking() -> Self {
        Self {
            power: None,
            block: true,
            override_envelope: false,
        }
    }

    /// Fire-and-forget move at default power within the envelope.
    pub const fn non_blocking() -> Self {
        Self {
            block: false,
            ..Self::blocking()
        }
    }

    /// Use `power` instead of the axis default.
    pub const fn with_power(self, power: u8) -> Self {
        Self {
            power: Some(power),
            ..self
        }
    }

    /// Select blocking or non-blocking dispatch.
    pub const fn with_block(self, block: bool) -> Self {
        Self { block, ..self }
    }

    /// Skip the envelope check.
    pub const fn overriding(self) -> Self {
        Self {
            override_envelope: true,
            ..self
        }
    }
}

// ─── Bounded Axis ───────────────────────────────────────────────────

/// A single actuator with reference frame and travel envelope.
#[derive(Debug)]
pub struct BoundedAxis<A> {
    name: &'static str,
    actuator: A,
    envelope: TravelEnvelope,
    power: u8,
    homing: Option<LimitHoming>,
    zero_offset: Option<Position>,
}

impl<A: Actuator> BoundedAxis<A> {
    /// Axis with an invalid reference frame and no end-stop.
    pub fn new(name: &'static str, actuator: A, envelope: TravelEnvelope, power: u8) -> Self {
        Self {
            name,
            actuator,
            envelope,
            power,
            homing: None,
            zero_offset: None,
        }
    }

    /// Home against an end-stop instead of the current position.
    pub fn with_homing(self, homing: LimitHoming) -> Self {
        Self {
            homing: Some(homing),
            ..self
        }
    }

    /// Axis name used in errors and logs.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Travel envelope in the logical frame.
    #[inline]
    pub fn envelope(&self) -> TravelEnvelope {
        self.envelope
    }

    /// Default drive power.
    #[inline]
    pub fn power(&self) -> u8 {
        self.power
    }

    /// Homing parameters, if the axis has an end-stop.
    #[inline]
    pub fn homing(&self) -> Option<LimitHoming> {
        self.homing
    }

    /// Raw position of the logical zero, if referenced.
    #[inline]
    pub fn zero_offset(&self) -> Option<Position> {
        self.zero_offset
    }

    /// True once a reference frame has been established.
    #[inline]
    pub fn is_referenced(&self) -> bool {
        self.zero_offset.is_some()
    }

    /// Underlying actuator.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Underlying actuator, for commands outside the logical frame.
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Bind logical zero to `zero_offset` raw.
    pub fn set_reference(&mut self, zero_offset: Position) {
        debug!("{}: reference frame set, zero_offset={zero_offset}", self.name);
        self.zero_offset = Some(zero_offset);
    }

    /// Drop the reference frame until the next homing.
    pub fn invalidate_reference(&mut self) {
        if self.zero_offset.take().is_some() {
            debug!("{}: reference frame invalidated", self.name);
        }
    }

    fn offset(&self) -> Result<Position, RigError> {
        self.zero_offset
            .ok_or(RigError::NotReferenced { axis: self.name })
    }

    /// Raw encoder position.
    pub fn raw_position(&self) -> Result<Position, RigError> {
        Ok(self.actuator.position()?)
    }

    /// Logical position.
    pub fn position(&self) -> Result<Position, RigError> {
        let offset = self.offset()?;
        Ok(self.actuator.position()? - offset)
    }

    /// Fail with `OutOfBounds` if `position` is outside the envelope.
    pub fn check_envelope(&self, position: Position) -> Result<(), RigError> {
        if self.envelope.contains(position) {
            Ok(())
        } else {
            debug!(
                "{}: rejected target {position} outside {}",
                self.name, self.envelope
            );
            Err(RigError::OutOfBounds {
                axis: self.name,
                position,
                envelope: self.envelope,
            })
        }
    }

    /// `base + delta`, or `OutOfBounds` if the sum leaves `Position`.
    pub fn shifted(&self, base: Position, delta: Position) -> Result<Position, RigError> {
        base.checked_add(delta).ok_or_else(|| {
            debug!("{}: target {base} + {delta} overflows", self.name);
            RigError::OutOfBounds {
                axis: self.name,
                position: base.saturating_add(delta),
                envelope: self.envelope,
            }
        })
    }

    /// Raw target for a logical position, after all checks.
    pub fn raw_target(&self, position: Position, options: MoveOptions) -> Result<Position, RigError> {
        if !options.override_envelope {
            self.check_envelope(position)?;
        }
        self.shifted(position, self.offset()?)
    }

    /// Drive to a logical position.
    pub fn go_to(&mut self, position: Position, options: MoveOptions) -> Result<(), RigError> {
        let target = self.raw_target(position, options)?;
        let power = options.power.unwrap_or(self.power);
        trace!(
            "{}: go_to logical={position} raw={target} power={power} block={}",
            self.name, options.block
        );
        self.actuator.move_to(target, power, options.block)?;
        Ok(())
    }

    /// Drive by `delta` from the current logical position.
    pub fn move_by(&mut self, delta: Position, options: MoveOptions) -> Result<(), RigError> {
        let target = self.shifted(self.position()?, delta)?;
        self.go_to(target, options)
    }

    /// Run continuously at a signed power.
    pub fn run(&mut self, percent: i32) -> Result<(), RigError> {
        self.actuator.set_velocity(percent)?;
        Ok(())
    }

    /// Zero velocity with the actuator's stop action.
    pub fn stop(&mut self) -> Result<(), RigError> {
        self.actuator.stop()?;
        Ok(())
    }

    /// Release holding torque.
    pub fn save_energy(&mut self) -> Result<(), RigError> {
        self.actuator.hold(false)?;
        Ok(())
    }

    /// Home against the configured end-stop and bind the frame.
    ///
    /// Axes without an end-stop bind logical zero to the current raw
    /// position. Returns the new zero offset.
    pub fn home(&mut self, soft_retreat: bool, power: Option<u8>) -> Result<Position, RigError> {
        self.invalidate_reference();
        let zero = match self.homing {
            Some(homing) => homing.home(&mut self.actuator, soft_retreat, power)?,
            None => self.actuator.position()?,
        };
        self.set_reference(zero);
        Ok(zero)
    }

    /// Home with soft retreat, then drive to logical 0.
    pub fn reset(&mut self, power: Option<u8>) -> Result<(), RigError> {
        self.home(true, power)?;
        let options = match power {
            Some(p) => MoveOptions::blocking().with_power(p),
            None => MoveOptions::blocking(),
        };
        self.go_to(0, options)
    }
}
