//! Printer facade.
//!
//! Owns the carriage, the pen and the roller pair and exposes the
//! operations a remote-control loop needs. Everything here is a thin
//! pass-through to the components; the facade adds the whole-rig
//! operations `reset_all`, `stop_all`, `emergency_stop` and `status`.

use bitflags::bitflags;
use plotter_common::config::RigConfig;
use plotter_common::error::RigError;
use plotter_common::hal::delay::Delay;
use plotter_common::hal::driver::{Actuator, ColorSensor};
use plotter_common::motion::{Position, TravelEnvelope};
use tracing::{info, warn};

use crate::head::{Carriage, Pen};
use crate::motion::{BoundedAxis, MoveOptions};
use crate::paper::{PaperGate, RollerPair, RollerSettings};

// ─── Status ─────────────────────────────────────────────────────────

bitflags! {
    /// Rig status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RigFlags: u8 {
        /// Carriage reference frame valid.
        const CARRIAGE_REFERENCED = 0x01;
        /// Pen reference frame valid.
        const PEN_REFERENCED      = 0x02;
        /// Pen off the paper.
        const PEN_UP              = 0x04;
        /// Sheet gripped by the rollers.
        const PAPER_LOADED        = 0x08;
        /// In-feed and out-feed rollers disagree beyond tolerance.
        const ROLLER_DRIFT        = 0x10;
    }
}

impl RigFlags {
    /// Flags required before drawing.
    pub const READY_MASK: Self = Self::from_bits_truncate(
        Self::CARRIAGE_REFERENCED.bits() | Self::PEN_REFERENCED.bits() | Self::PAPER_LOADED.bits(),
    );

    /// True if the rig is referenced and holds a synchronized sheet.
    #[inline]
    pub const fn is_ready(&self) -> bool {
        self.contains(Self::READY_MASK) && !self.contains(Self::ROLLER_DRIFT)
    }
}

impl Default for RigFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Snapshot of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RigStatus {
    /// Status flags.
    pub flags: RigFlags,
    /// Carriage logical position, if referenced.
    pub carriage: Option<Position>,
    /// Pen logical position, if referenced.
    pub pen: Option<Position>,
    /// Roller logical positions `(in, out)`, if paper is loaded.
    pub rollers: Option<(Position, Position)>,
}

// ─── Ports ──────────────────────────────────────────────────────────

/// Every port the rig needs, handed over once at construction.
#[derive(Debug)]
pub struct RigPorts<A, S, D> {
    /// Carriage motor.
    pub carriage: A,
    /// Pen lift motor.
    pub pen: A,
    /// In-feed roller motor.
    pub roller_in: A,
    /// Out-feed roller motor.
    pub roller_out: A,
    /// Paper gate sensor.
    pub gate: S,
    /// Cooperative delay.
    pub delay: D,
}

// ─── Printer ────────────────────────────────────────────────────────

/// The complete rig.
#[derive(Debug)]
pub struct Printer<A, S, D> {
    carriage: Carriage<A>,
    pen: Pen<A, D>,
    rollers: RollerPair<A, S, D>,
    prevent_paper_blocking: bool,
}

impl<A, S, D> Printer<A, S, D>
where
    A: Actuator,
    S: ColorSensor,
    D: Delay + Clone,
{
    /// Assemble the rig from configuration. Nothing moves until
    /// [`Printer::reset_all`].
    pub fn new(ports: RigPorts<A, S, D>, config: &RigConfig) -> Self {
        let carriage = Carriage::from_config(ports.carriage, &config.carriage);
        let pen = Pen::from_config(ports.pen, ports.delay.clone(), &config.pen, &config.poll);
        let rollers = RollerPair::new(
            ports.roller_in,
            ports.roller_out,
            PaperGate::new(ports.gate, config.rollers.paper_color),
            ports.delay,
            config.rollers.envelope(),
            RollerSettings::from_config(&config.rollers, &config.poll),
        );
        info!("{}: rig assembled", config.shared.service_name);
        Self {
            carriage,
            pen,
            rollers,
            prevent_paper_blocking: config.rollers.prevent_paper_blocking,
        }
    }
}

impl<A, S, D> Printer<A, S, D>
where
    A: Actuator,
    S: ColorSensor,
    D: Delay,
{
    /// Carriage.
    pub fn carriage(&mut self) -> &mut Carriage<A> {
        &mut self.carriage
    }

    /// Pen.
    pub fn pen(&mut self) -> &mut Pen<A, D> {
        &mut self.pen
    }

    /// Roller pair.
    pub fn rollers(&mut self) -> &mut RollerPair<A, S, D> {
        &mut self.rollers
    }

    /// Home pen and carriage and clear the feed path.
    ///
    /// The pen is lifted first so the carriage never drags it.
    pub fn reset_all(&mut self) -> Result<(), RigError> {
        self.pen.reset(None)?;
        self.carriage.reset(None)?;
        self.rollers.reset(self.prevent_paper_blocking, None)?;
        info!("printer: all axes reset");
        Ok(())
    }

    /// Stop every motor. All stops are attempted; the first error is
    /// returned.
    pub fn stop_all(&mut self) -> Result<(), RigError> {
        let results = [self.carriage.stop(), self.pen.stop(), self.rollers.stop()];
        results.into_iter().collect()
    }

    /// Stop the carriage.
    pub fn stop_carriage(&mut self) -> Result<(), RigError> {
        self.carriage.stop()
    }

    /// Stop both rollers.
    pub fn stop_rollers(&mut self) -> Result<(), RigError> {
        self.rollers.stop()
    }

    /// Lower a lifted pen, lift a lowered one.
    pub fn toggle_pen(&mut self) -> Result<(), RigError> {
        self.pen.toggle(None)
    }

    /// Pull in and grip a sheet.
    pub fn take_paper(&mut self) -> Result<(), RigError> {
        self.rollers.take_paper(None, None)
    }

    /// Feed the sheet out.
    pub fn eject_paper(&mut self) -> Result<(), RigError> {
        self.rollers.eject_paper(None)
    }

    /// Run the rollers forward until stopped.
    pub fn up_forever(&mut self) -> Result<(), RigError> {
        self.rollers.up(None)
    }

    /// Run the rollers backward until stopped.
    pub fn down_forever(&mut self) -> Result<(), RigError> {
        self.rollers.down(None)
    }

    /// Run the carriage left until stopped.
    pub fn left_forever(&mut self) -> Result<(), RigError> {
        self.carriage.left(None)
    }

    /// Run the carriage right until stopped.
    pub fn right_forever(&mut self) -> Result<(), RigError> {
        self.carriage.right(None)
    }

    /// Advance the sheet by `ticks`.
    pub fn up_degrees(&mut self, ticks: Position) -> Result<(), RigError> {
        self.rollers.move_by(ticks, MoveOptions::blocking())
    }

    /// Move the carriage left by `ticks`.
    pub fn left_degrees(&mut self, ticks: Position) -> Result<(), RigError> {
        self.carriage.move_by(ticks, MoveOptions::blocking())
    }

    /// Release holding torque on every motor.
    pub fn save_energy(&mut self) -> Result<(), RigError> {
        let results = [
            self.carriage.save_energy(),
            self.pen.save_energy(),
            self.rollers.save_energy(),
        ];
        results.into_iter().collect()
    }

    /// Stop every motor and drop the carriage and pen frames.
    ///
    /// The roller frames stay bound to the gripped sheet.
    pub fn emergency_stop(&mut self) -> Result<(), RigError> {
        warn!("printer: EMERGENCY STOP");
        let stopped = self.stop_all();
        self.carriage.axis_mut().invalidate_reference();
        self.pen.axis_mut().invalidate_reference();
        stopped
    }

    /// Snapshot of flags and positions.
    pub fn status(&self) -> Result<RigStatus, RigError> {
        let mut flags = RigFlags::empty();
        let carriage = referenced_position(self.carriage.axis())?;
        let pen = referenced_position(self.pen.axis())?;

        flags.set(RigFlags::CARRIAGE_REFERENCED, carriage.is_some());
        flags.set(RigFlags::PEN_REFERENCED, pen.is_some());
        if pen.is_some() {
            flags.set(RigFlags::PEN_UP, self.pen.is_up()?);
        }
        flags.set(RigFlags::PAPER_LOADED, self.rollers.has_paper());
        flags.set(RigFlags::ROLLER_DRIFT, !self.rollers.is_synchronized()?);

        Ok(RigStatus {
            flags,
            carriage,
            pen,
            rollers: self.rollers.position()?,
        })
    }

    /// Paper travel envelope.
    pub fn paper_envelope(&self) -> TravelEnvelope {
        self.rollers.envelope()
    }
}

fn referenced_position<A: Actuator>(axis: &BoundedAxis<A>) -> Result<Option<Position>, RigError> {
    if axis.is_referenced() {
        Ok(Some(axis.position()?))
    } else {
        Ok(None)
    }
}
