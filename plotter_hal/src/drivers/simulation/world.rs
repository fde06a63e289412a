//! Shared simulated world.
//!
//! One `SimWorld` owns every simulated motor, the paper path and the
//! simulated clock. Actuators, the colour sensor and the delay hold a
//! [`SimHandle`] to it, so time only advances when the control code
//! waits: either through a blocking actuator command or through
//! [`Delay::delay`](plotter_common::hal::delay::Delay::delay).

use plotter_common::hal::driver::HalError;
use plotter_common::hal::types::{Color, RunLimit, StopAction};
use plotter_common::motion::Position;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::physics::{MotorSpec, PaperPath, PaperSimulator, SimMotor};

/// Shared, single-threaded handle to the world.
pub type SimHandle = Rc<RefCell<SimWorld>>;

/// Default limit for one blocking wait in simulated time.
pub const DEFAULT_BLOCK_LIMIT: Duration = Duration::from_secs(60);

/// Index of a motor inside the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotorId(usize);

/// A command as received by a simulated actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCommand {
    /// `set_velocity`
    SetVelocity(i32),
    /// `run_for`
    RunFor {
        /// Signed power [%].
        percent: i32,
        /// Run extent.
        limit: RunLimit,
        /// Caller waited for completion.
        block: bool,
    },
    /// `move_to`
    MoveTo {
        /// Absolute reported position.
        position: Position,
        /// Power [%].
        power: u8,
        /// Caller waited for completion.
        block: bool,
    },
    /// `stop`
    Stop,
    /// `hold`
    Hold(bool),
    /// `set_stop_action`
    SetStopAction(StopAction),
}

/// One journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Simulated time of the command.
    pub at: Duration,
    /// Motor name.
    pub motor: String,
    /// The command.
    pub command: SimCommand,
}

/// Simulated rig state.
#[derive(Debug)]
pub struct SimWorld {
    clock_ms: u64,
    motors: Vec<SimMotor>,
    faults: Vec<Option<HalError>>,
    feed: Option<(MotorId, MotorId)>,
    paper: PaperSimulator,
    paper_color: Color,
    background: Color,
    journal: Vec<JournalEntry>,
    block_limit: Duration,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(PaperPath::default())
    }
}

impl SimWorld {
    /// Empty world with the given paper path.
    pub fn new(path: PaperPath) -> Self {
        Self {
            clock_ms: 0,
            motors: Vec::new(),
            faults: Vec::new(),
            feed: None,
            paper: PaperSimulator::new(path),
            paper_color: Color::White,
            background: Color::NoColor,
            journal: Vec::new(),
            block_limit: DEFAULT_BLOCK_LIMIT,
        }
    }

    /// Wrap into a shared handle.
    pub fn into_handle(self) -> SimHandle {
        Rc::new(RefCell::new(self))
    }

    // ─── Setup ──────────────────────────────────────────────────────

    /// Add a motor.
    pub fn add_motor(&mut self, spec: MotorSpec) -> MotorId {
        debug!("sim: adding motor {} ({:?})", spec.name, spec.polarity);
        self.motors.push(SimMotor::new(spec));
        self.faults.push(None);
        MotorId(self.motors.len() - 1)
    }

    /// Declare which motors move the sheet.
    pub fn set_feed(&mut self, in_feed: MotorId, out_feed: MotorId) {
        self.feed = Some((in_feed, out_feed));
    }

    /// Colours the gate reports with and without paper.
    pub fn set_colors(&mut self, paper: Color, background: Color) {
        self.paper_color = paper;
        self.background = background;
    }

    /// Limit for one blocking wait.
    pub fn set_block_limit(&mut self, limit: Duration) {
        self.block_limit = limit;
    }

    /// Make the next command on `motor` fail with `error`.
    pub fn inject_fault(&mut self, motor: MotorId, error: HalError) {
        self.faults[motor.0] = Some(error);
    }

    /// Paper path and sheet.
    pub fn paper(&self) -> &PaperSimulator {
        &self.paper
    }

    /// Mutable paper path, for inserting and removing sheets.
    pub fn paper_mut(&mut self) -> &mut PaperSimulator {
        &mut self.paper
    }

    // ─── Observation ────────────────────────────────────────────────

    /// Simulated time since power-on.
    pub fn now(&self) -> Duration {
        Duration::from_millis(self.clock_ms)
    }

    /// Motor by id.
    pub fn motor(&self, id: MotorId) -> &SimMotor {
        &self.motors[id.0]
    }

    /// Reported position of a motor.
    pub fn position(&self, id: MotorId) -> Position {
        self.motors[id.0].reported_position()
    }

    /// Colour currently in front of the gate.
    pub fn gate_color(&self) -> Color {
        if self.paper.covers_gate() {
            self.paper_color
        } else {
            self.background
        }
    }

    /// Every command received so far.
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    /// Commands received by one motor.
    pub fn commands_for(&self, id: MotorId) -> Vec<SimCommand> {
        let name = self.motors[id.0].name();
        self.journal
            .iter()
            .filter(|e| e.motor == name)
            .map(|e| e.command)
            .collect()
    }

    /// Forget all journal entries.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    // ─── Commands ───────────────────────────────────────────────────

    /// Apply a command to a motor and record it.
    ///
    /// Blocking commands advance the clock until the motor stops.
    pub fn command(&mut self, id: MotorId, command: SimCommand) -> Result<(), HalError> {
        if let Some(error) = self.faults[id.0].take() {
            warn!("sim: {} fails {:?} with {}", self.motors[id.0].name(), command, error);
            return Err(error);
        }

        validate(&command)?;

        self.journal.push(JournalEntry {
            at: self.now(),
            motor: self.motors[id.0].name().to_string(),
            command,
        });
        trace!("sim: {} <- {:?}", self.motors[id.0].name(), command);

        let motor = &mut self.motors[id.0];
        let block = match command {
            SimCommand::SetVelocity(percent) => {
                motor.run_forever(percent);
                false
            }
            SimCommand::RunFor {
                percent,
                limit,
                block,
            } => {
                match limit {
                    RunLimit::Duration(d) => motor.run_timed(percent, duration_ms(d)),
                    RunLimit::Ticks(ticks) => motor.run_ticks(percent, ticks),
                }
                block
            }
            SimCommand::MoveTo {
                position,
                power,
                block,
            } => {
                motor.seek(position, power);
                block
            }
            SimCommand::Stop => {
                motor.stop();
                false
            }
            SimCommand::Hold(enabled) => {
                motor.hold(enabled);
                false
            }
            SimCommand::SetStopAction(action) => {
                motor.set_stop_action(action);
                false
            }
        };

        if block {
            self.run_until_stopped(id)?;
        }
        Ok(())
    }

    /// Advance the clock until `id` stops moving.
    ///
    /// # Errors
    ///
    /// `HalError::Timeout` if the motor is still moving after the block
    /// limit. The motor keeps its drive mode.
    pub fn run_until_stopped(&mut self, id: MotorId) -> Result<(), HalError> {
        let limit = duration_ms(self.block_limit);
        let mut waited = 0;
        while self.motors[id.0].is_moving() {
            if waited >= limit {
                return Err(HalError::Timeout(format!(
                    "{} still moving after {} ms",
                    self.motors[id.0].name(),
                    waited
                )));
            }
            self.tick();
            waited += 1;
        }
        Ok(())
    }

    /// Let `duration` of simulated time pass.
    pub fn advance(&mut self, duration: Duration) {
        for _ in 0..duration_ms(duration) {
            self.tick();
        }
    }

    fn tick(&mut self) {
        self.clock_ms += 1;
        let mut deltas = vec![0i64; self.motors.len()];
        for (motor, delta) in self.motors.iter_mut().zip(deltas.iter_mut()) {
            *delta = motor.step() * i64::from(motor.polarity().gain());
        }
        if let Some((in_feed, out_feed)) = self.feed {
            self.paper.feed(deltas[in_feed.0], deltas[out_feed.0]);
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn validate(command: &SimCommand) -> Result<(), HalError> {
    let percent = match *command {
        SimCommand::SetVelocity(p) => p,
        SimCommand::RunFor { percent, .. } => percent,
        SimCommand::MoveTo { power, .. } => i32::from(power),
        _ => return Ok(()),
    };
    if !(-100..=100).contains(&percent) {
        return Err(HalError::InvalidCommand(format!(
            "power {percent} outside -100..=100"
        )));
    }
    Ok(())
}
