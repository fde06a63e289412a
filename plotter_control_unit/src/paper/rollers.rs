//! Dual-roller synchronizer.
//!
//! Two rollers move one sheet. They are coupled only through the paper,
//! so each keeps its own reference frame: at the end of intake both raw
//! positions are snapshotted as the rollers' zero offsets and logical
//! position 0 means "this snapshot" on either roller.
//!
//! ## Dispatch order
//!
//! Every paired motion sends the in-feed roller non-blocking first, then
//! the out-feed roller with the caller's `block`. The out-feed roller is
//! the anchor the caller waits on.

use plotter_common::config::{PollConfig, RollerConfig};
use plotter_common::consts::TICKS_PER_ROTATION;
use plotter_common::error::RigError;
use plotter_common::hal::delay::Delay;
use plotter_common::hal::driver::{Actuator, ColorSensor};
use plotter_common::hal::types::RunLimit;
use plotter_common::motion::{Position, TravelEnvelope, mm_to_ticks};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::gate::PaperGate;
use super::state::{PaperState, PaperStateMachine};
use crate::motion::{BoundedAxis, MoveOptions};
use crate::poll::{PollPolicy, poll_until};

// ─── Settings ───────────────────────────────────────────────────────

/// Tunables of the paper feed.
#[derive(Debug, Clone, PartialEq)]
pub struct RollerSettings {
    /// Default drive power [%].
    pub power: u8,
    /// Out-feed power during the grip pulse [%].
    pub grip_power: u8,
    /// Grip pulse length.
    pub grip_duration: Duration,
    /// Retract after intake [ticks].
    pub slack_ticks: Position,
    /// Settle after the intake retract.
    pub settle: Duration,
    /// Settle before and after the eject wait.
    pub eject_settle: Duration,
    /// Rotations run to clear the path on reset.
    pub clearing_rotations: u32,
    /// Tolerated in/out divergence [ticks].
    pub drift_tolerance: Position,
    /// Roller transmission [ticks/mm].
    pub ticks_per_mm: f64,
    /// Gate poll interval and cap.
    pub poll: PollPolicy,
}

impl RollerSettings {
    /// Settings from the `[rollers]` and `[poll]` sections.
    pub fn from_config(rollers: &RollerConfig, poll: &PollConfig) -> Self {
        Self {
            power: rollers.power,
            grip_power: rollers.grip_power,
            grip_duration: rollers.grip_duration(),
            slack_ticks: rollers.slack_ticks,
            settle: rollers.settle(),
            eject_settle: rollers.eject_settle(),
            clearing_rotations: rollers.clearing_rotations,
            drift_tolerance: rollers.drift_tolerance,
            ticks_per_mm: rollers.ticks_per_mm,
            poll: PollPolicy::from(poll),
        }
    }
}

impl Default for RollerSettings {
    fn default() -> Self {
        Self::from_config(&RollerConfig::default(), &PollConfig::default())
    }
}

/// Per-roller zero references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RollerOffsets {
    /// In-feed roller raw position of logical 0.
    pub delta_in: Position,
    /// Out-feed roller raw position of logical 0.
    pub delta_out: Position,
}

// ─── Roller Pair ────────────────────────────────────────────────────

/// In-feed and out-feed roller tracking one logical paper position.
#[derive(Debug)]
pub struct RollerPair<A, S, D> {
    roller_in: BoundedAxis<A>,
    roller_out: BoundedAxis<A>,
    gate: PaperGate<S>,
    delay: D,
    settings: RollerSettings,
    paper: PaperStateMachine,
}

impl<A: Actuator, S: ColorSensor, D: Delay> RollerPair<A, S, D> {
    /// Pair in `Empty` with cleared offsets.
    pub fn new(
        roller_in: A,
        roller_out: A,
        gate: PaperGate<S>,
        delay: D,
        envelope: TravelEnvelope,
        settings: RollerSettings,
    ) -> Self {
        let mut roller_in = BoundedAxis::new("roller_in", roller_in, envelope, settings.power);
        let mut roller_out = BoundedAxis::new("roller_out", roller_out, envelope, settings.power);
        roller_in.set_reference(0);
        roller_out.set_reference(0);
        Self {
            roller_in,
            roller_out,
            gate,
            delay,
            settings,
            paper: PaperStateMachine::new(),
        }
    }

    /// Paper state.
    #[inline]
    pub fn state(&self) -> PaperState {
        self.paper.state()
    }

    /// True while a sheet is gripped.
    #[inline]
    pub fn has_paper(&self) -> bool {
        self.paper.has_paper()
    }

    /// Feed settings.
    pub fn settings(&self) -> &RollerSettings {
        &self.settings
    }

    /// Travel envelope of the logical paper position.
    pub fn envelope(&self) -> TravelEnvelope {
        self.roller_out.envelope()
    }

    /// In-feed roller axis.
    pub fn roller_in(&self) -> &BoundedAxis<A> {
        &self.roller_in
    }

    /// Out-feed roller axis.
    pub fn roller_out(&self) -> &BoundedAxis<A> {
        &self.roller_out
    }

    /// Paper gate.
    pub fn gate_mut(&mut self) -> &mut PaperGate<S> {
        &mut self.gate
    }

    /// Current zero references. Both are 0 while `Empty`.
    pub fn offsets(&self) -> RollerOffsets {
        RollerOffsets {
            delta_in: self.roller_in.zero_offset().unwrap_or(0),
            delta_out: self.roller_out.zero_offset().unwrap_or(0),
        }
    }

    /// Logical `(in, out)` position, `None` without paper.
    pub fn position(&self) -> Result<Option<(Position, Position)>, RigError> {
        if !self.has_paper() {
            return Ok(None);
        }
        Ok(Some((self.roller_in.position()?, self.roller_out.position()?)))
    }

    /// `in - out` logical divergence, `None` without paper.
    pub fn drift(&self) -> Result<Option<Position>, RigError> {
        Ok(self.position()?.map(|(p_in, p_out)| p_in - p_out))
    }

    /// True if the drift is within the configured tolerance, or there
    /// is no paper.
    pub fn is_synchronized(&self) -> Result<bool, RigError> {
        Ok(self
            .drift()?
            .is_none_or(|d| d.abs() <= self.settings.drift_tolerance))
    }

    // ─── Positioning ────────────────────────────────────────────────

    fn require_paper(&self) -> Result<(), RigError> {
        if self.has_paper() {
            Ok(())
        } else {
            debug!("rollers: positioning rejected, no paper");
            Err(RigError::NoPaper)
        }
    }

    fn dispatch(
        &mut self,
        target_in: Position,
        target_out: Position,
        options: MoveOptions,
    ) -> Result<(), RigError> {
        let power = options.power.unwrap_or(self.settings.power);
        self.roller_in
            .actuator_mut()
            .move_to(target_in, power, false)?;
        self.roller_out
            .actuator_mut()
            .move_to(target_out, power, options.block)?;
        Ok(())
    }

    /// Drive the sheet to a logical position.
    pub fn go_to(&mut self, position: Position, options: MoveOptions) -> Result<(), RigError> {
        self.require_paper()?;
        let target_in = self.roller_in.raw_target(position, options)?;
        let target_out = self.roller_out.raw_target(position, options)?;
        debug!("rollers: go_to {position} (raw in={target_in} out={target_out})");
        self.dispatch(target_in, target_out, options)
    }

    /// Move each roller by `delta` from its own raw position.
    pub fn move_by(&mut self, delta: Position, options: MoveOptions) -> Result<(), RigError> {
        self.require_paper()?;
        if !options.override_envelope {
            for roller in [&self.roller_in, &self.roller_out] {
                roller.check_envelope(roller.shifted(roller.position()?, delta)?)?;
            }
        }
        let target_in = self.roller_in.shifted(self.roller_in.raw_position()?, delta)?;
        let target_out = self.roller_out.shifted(self.roller_out.raw_position()?, delta)?;
        debug!("rollers: move {delta} (raw in={target_in} out={target_out})");
        self.dispatch(target_in, target_out, options)
    }

    /// Move the sheet by a distance in millimetres.
    pub fn move_mm(&mut self, mm: f64, options: MoveOptions) -> Result<(), RigError> {
        let ticks = mm_to_ticks(mm, self.settings.ticks_per_mm).ok_or(RigError::InvalidDistance {
            axis: self.roller_out.name(),
        })?;
        self.move_by(ticks, options)
    }

    /// Drive to the lower paper bound.
    pub fn up_limit(&mut self, power: Option<u8>) -> Result<(), RigError> {
        self.go_to(self.envelope().lower, with_power(power))
    }

    /// Drive to the upper paper bound.
    pub fn down_limit(&mut self, power: Option<u8>) -> Result<(), RigError> {
        self.go_to(self.envelope().upper, with_power(power))
    }

    // ─── Continuous drive ───────────────────────────────────────────

    /// Run both rollers forward.
    pub fn up(&mut self, power: Option<u8>) -> Result<(), RigError> {
        let power = i32::from(power.unwrap_or(self.settings.power));
        self.roller_in.run(power)?;
        self.roller_out.run(power)
    }

    /// Run both rollers backward.
    pub fn down(&mut self, power: Option<u8>) -> Result<(), RigError> {
        let power = i32::from(power.unwrap_or(self.settings.power));
        self.roller_in.run(-power)?;
        self.roller_out.run(-power)
    }

    /// Stop both rollers.
    pub fn stop(&mut self) -> Result<(), RigError> {
        self.roller_in.stop()?;
        self.roller_out.stop()
    }

    /// Release both rollers' holding torque.
    pub fn save_energy(&mut self) -> Result<(), RigError> {
        self.roller_in.save_energy()?;
        self.roller_out.save_energy()
    }

    // ─── Paper handling ─────────────────────────────────────────────

    fn clear_offsets(&mut self) {
        self.roller_in.set_reference(0);
        self.roller_out.set_reference(0);
    }

    /// Pull a sheet in, stretch it and bind the logical frame.
    ///
    /// # Errors
    ///
    /// - `PaperAlreadyLoaded` unless `Empty`.
    /// - `PaperLost` if the gate no longer sees the sheet after the
    ///   grip pulse.
    /// - Poll and back-end errors. Both rollers are stopped and the pair
    ///   returns to `Empty` on any failure.
    pub fn take_paper(
        &mut self,
        power: Option<u8>,
        grip_power: Option<u8>,
    ) -> Result<(), RigError> {
        self.paper.begin_intake()?;
        match self.intake(power, grip_power) {
            Ok(offsets) => {
                self.paper.intake_complete();
                info!(
                    "rollers: paper loaded (delta_in={}, delta_out={})",
                    offsets.delta_in, offsets.delta_out
                );
                Ok(())
            }
            Err(e) => {
                warn!("rollers: intake failed: {e}");
                if let Err(stop_err) = self.stop() {
                    warn!("rollers: stop after failed intake: {stop_err}");
                }
                self.clear_offsets();
                self.paper.abort_intake();
                Err(e)
            }
        }
    }

    fn intake(&mut self, power: Option<u8>, grip_power: Option<u8>) -> Result<RollerOffsets, RigError> {
        let power = power.unwrap_or(self.settings.power);
        let grip_power = grip_power.unwrap_or(self.settings.grip_power);

        self.up(Some(power))?;
        let gate = &mut self.gate;
        poll_until("paper at gate", &self.settings.poll, &mut self.delay, || {
            gate.is_present()
        })?;
        self.stop()?;

        debug!("rollers: grip pulse {grip_power}% for {:?}", self.settings.grip_duration);
        self.roller_out.actuator_mut().run_for(
            i32::from(grip_power),
            RunLimit::Duration(self.settings.grip_duration),
            true,
        )?;
        if !self.gate.is_present()? {
            return Err(RigError::PaperLost);
        }

        let slack = self.settings.slack_ticks;
        let retract_in = self.roller_in.raw_position()? - slack;
        let retract_out = self.roller_out.raw_position()? - slack;
        self.dispatch(
            retract_in,
            retract_out,
            MoveOptions::blocking().with_power(power),
        )?;
        self.delay.delay(self.settings.settle);

        let offsets = RollerOffsets {
            delta_in: self.roller_in.raw_position()?,
            delta_out: self.roller_out.raw_position()?,
        };
        self.roller_in.set_reference(offsets.delta_in);
        self.roller_out.set_reference(offsets.delta_out);
        Ok(offsets)
    }

    /// Feed the sheet out until the gate clears.
    ///
    /// From `Empty` with a clear gate this is a no-op. A sheet the gate
    /// sees while `Empty` is ejected as well.
    pub fn eject_paper(&mut self, power: Option<u8>) -> Result<(), RigError> {
        if self.paper.state() == PaperState::Empty {
            if !self.gate.is_present()? {
                debug!("rollers: eject with empty path, nothing to do");
                return Ok(());
            }
            warn!("rollers: ejecting a sheet that was never loaded");
        }

        self.eject_drive(power)?;
        self.paper.ejected();
        self.clear_offsets();
        info!("rollers: paper ejected");
        Ok(())
    }

    fn eject_drive(&mut self, power: Option<u8>) -> Result<(), RigError> {
        self.up(power)?;
        self.delay.delay(self.settings.eject_settle);
        let gate = &mut self.gate;
        let waited = poll_until("paper cleared", &self.settings.poll, &mut self.delay, || {
            Ok(!gate.is_present()?)
        });
        if let Err(e) = waited {
            self.stop()?;
            return Err(e);
        }
        self.delay.delay(self.settings.eject_settle);
        self.stop()
    }

    /// Eject a sheet seen by the gate, otherwise optionally clear the
    /// feed path by running a few rotations.
    pub fn reset(&mut self, prevent_paper_blocking: bool, power: Option<u8>) -> Result<(), RigError> {
        if self.has_paper() || self.gate.is_present()? {
            return self.eject_paper(power);
        }
        if prevent_paper_blocking {
            let power = i32::from(power.unwrap_or(self.settings.power));
            let ticks = self.settings.clearing_rotations * TICKS_PER_ROTATION;
            debug!("rollers: clearing feed path, {ticks} ticks");
            self.roller_in
                .actuator_mut()
                .run_for(power, RunLimit::Ticks(ticks), false)?;
            self.roller_out
                .actuator_mut()
                .run_for(power, RunLimit::Ticks(ticks), true)?;
        }
        Ok(())
    }
}

fn with_power(power: Option<u8>) -> MoveOptions {
    match power {
        Some(p) => MoveOptions::blocking().with_power(p),
        None => MoveOptions::blocking(),
    }
}
