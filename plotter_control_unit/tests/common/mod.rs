//! Shared mock bench for control-unit integration tests.
//!
//! Every mock port shares one [`Bench`]. Motions are instantaneous except
//! continuous runs, which advance `step` ticks per `delay()` call. Timed
//! runs do not move the shaft. Every command lands in one ordered log.

#![allow(dead_code)]

use plotter_common::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// One recorded actuator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    SetVelocity(i32),
    RunFor(i32, RunLimit, bool),
    MoveTo(Position, u8, bool),
    Stop,
    Hold(bool),
    WaitUntilStopped,
    SetStopAction(StopAction),
}

#[derive(Debug)]
struct Motor {
    name: &'static str,
    position: Position,
    velocity: i32,
    lower_stop: Option<Position>,
    upper_stop: Option<Position>,
}

impl Motor {
    fn clamp(&self, position: Position) -> Position {
        let position = self.lower_stop.map_or(position, |lo| position.max(lo));
        self.upper_stop.map_or(position, |hi| position.min(hi))
    }
}

/// Gate rule: paper seen while `motor` is inside `[from, to)`.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub motor: usize,
    pub from: Position,
    pub to: Position,
}

#[derive(Debug, Default)]
pub struct Bench {
    motors: Vec<Motor>,
    log: Vec<(&'static str, Cmd)>,
    window: Option<Window>,
    /// Ticks a running motor advances per `delay()` call.
    pub step: Position,
    pub elapsed: Duration,
    pub delays: u32,
}

pub type BenchHandle = Rc<RefCell<Bench>>;

impl Bench {
    pub fn new() -> BenchHandle {
        Rc::new(RefCell::new(Self {
            step: 10,
            ..Self::default()
        }))
    }
}

pub fn add_motor(bench: &BenchHandle, name: &'static str, start: Position) -> MockActuator {
    let mut b = bench.borrow_mut();
    b.motors.push(Motor {
        name,
        position: start,
        velocity: 0,
        lower_stop: None,
        upper_stop: None,
    });
    MockActuator {
        bench: bench.clone(),
        index: b.motors.len() - 1,
    }
}

pub fn set_end_stops(bench: &BenchHandle, motor: &MockActuator, lower: Position, upper: Position) {
    let mut b = bench.borrow_mut();
    b.motors[motor.index].lower_stop = Some(lower);
    b.motors[motor.index].upper_stop = Some(upper);
}

pub fn set_window(bench: &BenchHandle, window: Option<Window>) {
    bench.borrow_mut().window = window;
}

pub fn commands(bench: &BenchHandle) -> Vec<(&'static str, Cmd)> {
    bench.borrow().log.clone()
}

pub fn commands_for(bench: &BenchHandle, name: &str) -> Vec<Cmd> {
    bench
        .borrow()
        .log
        .iter()
        .filter(|(n, _)| *n == name)
        .map(|(_, c)| c.clone())
        .collect()
}

pub fn clear_log(bench: &BenchHandle) {
    bench.borrow_mut().log.clear();
}

// ─── Actuator ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MockActuator {
    bench: BenchHandle,
    pub index: usize,
}

impl MockActuator {
    fn with<R>(&self, cmd: Cmd, f: impl FnOnce(&mut Motor) -> R) -> R {
        let mut b = self.bench.borrow_mut();
        let name = b.motors[self.index].name;
        b.log.push((name, cmd));
        f(&mut b.motors[self.index])
    }

    pub fn raw(&self) -> Position {
        self.bench.borrow().motors[self.index].position
    }
}

impl Actuator for MockActuator {
    fn set_velocity(&mut self, percent: i32) -> Result<(), HalError> {
        self.with(Cmd::SetVelocity(percent), |m| m.velocity = percent);
        Ok(())
    }

    fn run_for(&mut self, percent: i32, limit: RunLimit, block: bool) -> Result<(), HalError> {
        self.with(Cmd::RunFor(percent, limit, block), |m| {
            m.velocity = 0;
            if let RunLimit::Ticks(ticks) = limit {
                m.position = m.clamp(m.position + percent.signum() * ticks as Position);
            }
        });
        Ok(())
    }

    fn move_to(&mut self, position: Position, power: u8, block: bool) -> Result<(), HalError> {
        self.with(Cmd::MoveTo(position, power, block), |m| {
            m.velocity = 0;
            m.position = m.clamp(position);
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        self.with(Cmd::Stop, |m| m.velocity = 0);
        Ok(())
    }

    fn hold(&mut self, enabled: bool) -> Result<(), HalError> {
        self.with(Cmd::Hold(enabled), |m| m.velocity = 0);
        Ok(())
    }

    fn position(&self) -> Result<Position, HalError> {
        Ok(self.raw())
    }

    fn wait_until_stopped(&mut self) -> Result<(), HalError> {
        self.with(Cmd::WaitUntilStopped, |m| {
            let stop = match m.velocity.signum() {
                0 => return Ok(()),
                1 => m.upper_stop,
                _ => m.lower_stop,
            };
            match stop {
                Some(stop) => {
                    m.position = stop;
                    m.velocity = 0;
                    Ok(())
                }
                None => Err(HalError::Timeout(format!("{} never stalled", m.name))),
            }
        })
    }

    fn polarity(&self) -> Polarity {
        Polarity::Normal
    }

    fn set_stop_action(&mut self, action: StopAction) -> Result<(), HalError> {
        self.with(Cmd::SetStopAction(action), |_| ());
        Ok(())
    }
}

// ─── Sensor & Delay ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MockSensor {
    bench: BenchHandle,
}

impl MockSensor {
    pub fn new(bench: &BenchHandle) -> Self {
        Self {
            bench: bench.clone(),
        }
    }
}

impl ColorSensor for MockSensor {
    fn color(&mut self) -> Result<Color, HalError> {
        let b = self.bench.borrow();
        let present = b.window.is_some_and(|w| {
            let p = b.motors[w.motor].position;
            w.from <= p && p < w.to
        });
        Ok(if present { Color::White } else { Color::NoColor })
    }
}

#[derive(Debug, Clone)]
pub struct MockDelay {
    bench: BenchHandle,
}

impl MockDelay {
    pub fn new(bench: &BenchHandle) -> Self {
        Self {
            bench: bench.clone(),
        }
    }
}

impl Delay for MockDelay {
    fn delay(&mut self, duration: Duration) {
        let mut b = self.bench.borrow_mut();
        b.elapsed += duration;
        b.delays += 1;
        let step = b.step;
        for m in &mut b.motors {
            if m.velocity != 0 {
                m.position = m.clamp(m.position + m.velocity.signum() * step);
            }
        }
    }
}

// ─── Rig ────────────────────────────────────────────────────────────

/// Mock ports for a full rig.
pub struct MockRig {
    pub bench: BenchHandle,
    pub carriage: MockActuator,
    pub pen: MockActuator,
    pub roller_in: MockActuator,
    pub roller_out: MockActuator,
    pub gate: MockSensor,
    pub delay: MockDelay,
}

impl MockRig {
    /// Rollers at 1000/500, carriage stops at -200/1150, pen stops at
    /// -60/400. Paper reaches the gate after 80 ticks of in-feed travel.
    pub fn new() -> Self {
        let bench = Bench::new();
        let carriage = add_motor(&bench, "carriage", 0);
        set_end_stops(&bench, &carriage, -200, 1150);
        let pen = add_motor(&bench, "pen", 0);
        set_end_stops(&bench, &pen, -60, 400);
        let roller_in = add_motor(&bench, "roller_in", 1000);
        let roller_out = add_motor(&bench, "roller_out", 500);
        set_window(
            &bench,
            Some(Window {
                motor: roller_in.index,
                from: 1080,
                to: 1400,
            }),
        );
        Self {
            gate: MockSensor::new(&bench),
            delay: MockDelay::new(&bench),
            bench,
            carriage,
            pen,
            roller_in,
            roller_out,
        }
    }
}
