//! Simulated encoder motor behind the `Actuator` port.

use plotter_common::hal::driver::{Actuator, HalError};
use plotter_common::hal::types::{Polarity, RunLimit, StopAction};
use plotter_common::motion::Position;

use super::world::{MotorId, SimCommand, SimHandle};

/// One motor of a [`SimWorld`](super::world::SimWorld).
#[derive(Debug, Clone)]
pub struct SimActuator {
    world: SimHandle,
    id: MotorId,
}

impl SimActuator {
    /// Actuator for motor `id` of `world`.
    pub fn new(world: SimHandle, id: MotorId) -> Self {
        Self { world, id }
    }

    /// Motor id inside the world.
    pub fn id(&self) -> MotorId {
        self.id
    }

    fn send(&mut self, command: SimCommand) -> Result<(), HalError> {
        self.world.borrow_mut().command(self.id, command)
    }
}

impl Actuator for SimActuator {
    fn set_velocity(&mut self, percent: i32) -> Result<(), HalError> {
        self.send(SimCommand::SetVelocity(percent))
    }

    fn run_for(&mut self, percent: i32, limit: RunLimit, block: bool) -> Result<(), HalError> {
        self.send(SimCommand::RunFor {
            percent,
            limit,
            block,
        })
    }

    fn move_to(&mut self, position: Position, power: u8, block: bool) -> Result<(), HalError> {
        self.send(SimCommand::MoveTo {
            position,
            power,
            block,
        })
    }

    fn stop(&mut self) -> Result<(), HalError> {
        self.send(SimCommand::Stop)
    }

    fn hold(&mut self, enabled: bool) -> Result<(), HalError> {
        self.send(SimCommand::Hold(enabled))
    }

    fn position(&self) -> Result<Position, HalError> {
        Ok(self.world.borrow().position(self.id))
    }

    fn wait_until_stopped(&mut self) -> Result<(), HalError> {
        self.world.borrow_mut().run_until_stopped(self.id)
    }

    fn polarity(&self) -> Polarity {
        self.world.borrow().motor(self.id).polarity()
    }

    fn set_stop_action(&mut self, action: StopAction) -> Result<(), HalError> {
        self.send(SimCommand::SetStopAction(action))
    }
}
