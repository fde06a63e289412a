//! Simulated colour sensor and simulated clock.

use plotter_common::hal::delay::Delay;
use plotter_common::hal::driver::{ColorSensor, HalError};
use plotter_common::hal::types::Color;
use std::time::Duration;

use super::world::SimHandle;

/// Gate sensor reading whatever covers the gate in the world.
#[derive(Debug, Clone)]
pub struct SimColorSensor {
    world: SimHandle,
}

impl SimColorSensor {
    /// Sensor looking at `world`'s gate.
    pub fn new(world: SimHandle) -> Self {
        Self { world }
    }
}

impl ColorSensor for SimColorSensor {
    fn color(&mut self) -> Result<Color, HalError> {
        Ok(self.world.borrow().gate_color())
    }
}

/// Delay that advances the simulated clock instead of sleeping.
#[derive(Debug, Clone)]
pub struct SimDelay {
    world: SimHandle,
}

impl SimDelay {
    /// Delay driving `world`'s clock.
    pub fn new(world: SimHandle) -> Self {
        Self { world }
    }
}

impl Delay for SimDelay {
    fn delay(&mut self, duration: Duration) {
        self.world.borrow_mut().advance(duration);
    }
}
