//! Encoder motor simulator.
//!
//! Kinematics are integer and advance in 1 ms steps. Positions are kept
//! in milli-ticks so that slow drives still make progress every step:
//! a motor running at `p` % moves `p * max_speed / 100` milli-ticks per
//! millisecond, i.e. `max_speed` is the speed at full power in ticks/s.
//!
//! All state here is *physical*. Polarity is applied at the actuator
//! boundary by [`SimMotor::reported_position`] and the command helpers.

use plotter_common::hal::types::{Polarity, StopAction};
use plotter_common::motion::Position;
use tracing::trace;

/// Milli-ticks per encoder tick.
pub const MILLI: i64 = 1000;

/// Static description of one simulated motor.
#[derive(Debug, Clone)]
pub struct MotorSpec {
    /// Name used in logs and the command journal.
    pub name: String,
    /// Polarity the actuator applies to commands and readings.
    pub polarity: Polarity,
    /// Speed at 100 % power [ticks/s].
    pub max_speed: u32,
    /// Reported position at power-on [ticks].
    pub start_position: Position,
    /// Physical end-stop below the start position, if any [ticks].
    pub lower_stop: Option<Position>,
    /// Physical end-stop above the start position, if any [ticks].
    pub upper_stop: Option<Position>,
}

impl MotorSpec {
    /// Free-running motor with normal polarity and 1000 ticks/s.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            polarity: Polarity::Normal,
            max_speed: 1000,
            start_position: 0,
            lower_stop: None,
            upper_stop: None,
        }
    }

    /// Set the polarity.
    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Set the full-power speed [ticks/s].
    pub fn max_speed(mut self, max_speed: u32) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Set the reported power-on position.
    pub fn start_at(mut self, position: Position) -> Self {
        self.start_position = position;
        self
    }

    /// Add mechanical end-stops in physical ticks.
    pub fn end_stops(mut self, lower: Position, upper: Position) -> Self {
        self.lower_stop = Some(lower);
        self.upper_stop = Some(upper);
        self
    }
}

/// Current drive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    /// Not moving.
    Idle,
    /// Run until told otherwise.
    Forever {
        /// Signed milli-ticks per ms.
        rate: i64,
    },
    /// Run for a number of milliseconds.
    Timed {
        /// Signed milli-ticks per ms.
        rate: i64,
        /// Time left [ms].
        remaining_ms: u64,
    },
    /// Run until a distance has been covered.
    Distance {
        /// Signed milli-ticks per ms.
        rate: i64,
        /// Distance left [milli-ticks].
        remaining: i64,
    },
    /// Run to an absolute physical position.
    Seek {
        /// Physical target [milli-ticks].
        target: i64,
        /// Unsigned milli-ticks per ms.
        rate: i64,
    },
}

/// One simulated encoder motor.
#[derive(Debug, Clone)]
pub struct SimMotor {
    spec: MotorSpec,
    /// Physical position [milli-ticks].
    position: i64,
    drive: Drive,
    stop_action: StopAction,
    holding: bool,
    stalled: bool,
}

impl SimMotor {
    /// Power on a motor described by `spec`.
    pub fn new(spec: MotorSpec) -> Self {
        let position = i64::from(spec.polarity.gain() * spec.start_position) * MILLI;
        Self {
            spec,
            position,
            drive: Drive::Idle,
            stop_action: StopAction::default(),
            holding: false,
            stalled: false,
        }
    }

    /// Motor name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Motor polarity.
    pub fn polarity(&self) -> Polarity {
        self.spec.polarity
    }

    /// Position as seen through the polarity, truncated to whole ticks.
    pub fn reported_position(&self) -> Position {
        let physical = (self.position / MILLI) as Position;
        self.spec.polarity.gain() * physical
    }

    /// Physical position in milli-ticks.
    pub fn physical_milli(&self) -> i64 {
        self.position
    }

    /// True while a drive mode other than idle is active.
    pub fn is_moving(&self) -> bool {
        self.drive != Drive::Idle
    }

    /// True if the last motion ended against an end-stop.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// True if the shaft is held with active torque.
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Active drive mode.
    pub fn drive(&self) -> Drive {
        self.drive
    }

    /// Configured stop action.
    pub fn stop_action(&self) -> StopAction {
        self.stop_action
    }

    /// Signed physical rate for a reported-frame percentage.
    fn rate(&self, percent: i32) -> i64 {
        i64::from(self.spec.polarity.gain() * percent) * i64::from(self.spec.max_speed) / 100
    }

    fn start(&mut self, drive: Drive) {
        self.drive = drive;
        self.stalled = false;
        self.holding = false;
    }

    /// Run continuously.
    pub fn run_forever(&mut self, percent: i32) {
        let rate = self.rate(percent);
        if rate == 0 {
            self.stop();
        } else {
            self.start(Drive::Forever { rate });
        }
    }

    /// Run for `ms` milliseconds.
    pub fn run_timed(&mut self, percent: i32, ms: u64) {
        let rate = self.rate(percent);
        if rate == 0 || ms == 0 {
            self.stop();
        } else {
            self.start(Drive::Timed {
                rate,
                remaining_ms: ms,
            });
        }
    }

    /// Run `ticks` in the direction of `percent`.
    pub fn run_ticks(&mut self, percent: i32, ticks: u32) {
        let rate = self.rate(percent);
        if rate == 0 || ticks == 0 {
            self.stop();
        } else {
            self.start(Drive::Distance {
                rate,
                remaining: i64::from(ticks) * MILLI,
            });
        }
    }

    /// Run to a reported-frame position.
    pub fn seek(&mut self, position: Position, power: u8) {
        let target = i64::from(self.spec.polarity.gain() * position) * MILLI;
        let rate = self.rate(i32::from(power)).abs();
        if target == self.position {
            self.stop();
        } else if rate > 0 {
            self.start(Drive::Seek { target, rate });
        }
    }

    /// Zero velocity using the configured stop action.
    pub fn stop(&mut self) {
        self.drive = Drive::Idle;
        self.holding = self.stop_action.holds();
    }

    /// Enable or release holding torque. Either way the motor stops.
    pub fn hold(&mut self, enabled: bool) {
        self.drive = Drive::Idle;
        self.holding = enabled;
    }

    /// Configure subsequent stops.
    pub fn set_stop_action(&mut self, action: StopAction) {
        self.stop_action = action;
    }

    /// Advance one millisecond. Returns the physical displacement in
    /// milli-ticks.
    pub fn step(&mut self) -> i64 {
        let wanted = match &mut self.drive {
            Drive::Idle => return 0,
            Drive::Forever { rate } => *rate,
            Drive::Timed { rate, remaining_ms } => {
                *remaining_ms -= 1;
                *rate
            }
            Drive::Distance { rate, remaining } => {
                let step = (*rate).abs().min(*remaining);
                *remaining -= step;
                step * rate.signum()
            }
            Drive::Seek { target, rate } => {
                let error = *target - self.position;
                error.signum() * error.abs().min(*rate)
            }
        };

        let before = self.position;
        let mut after = before + wanted;
        let mut hit_stop = false;
        if let Some(lower) = self.spec.lower_stop {
            let lower = i64::from(lower) * MILLI;
            if wanted < 0 && after <= lower {
                after = after.max(lower);
                hit_stop = true;
            }
        }
        if let Some(upper) = self.spec.upper_stop {
            let upper = i64::from(upper) * MILLI;
            if wanted > 0 && after >= upper {
                after = after.min(upper);
                hit_stop = true;
            }
        }
        self.position = after;

        let finished = match self.drive {
            Drive::Timed { remaining_ms, .. } => remaining_ms == 0,
            Drive::Distance { remaining, .. } => remaining == 0,
            Drive::Seek { target, .. } => after == target,
            _ => false,
        };

        if hit_stop {
            trace!("{}: stalled at end-stop, pos={}", self.spec.name, self.reported_position());
            self.drive = Drive::Idle;
            self.stalled = true;
        } else if finished {
            self.stop();
        }

        after - before
    }
}
