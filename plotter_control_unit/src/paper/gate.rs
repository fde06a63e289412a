//! Paper gate: colour sensor used as a presence switch.

use plotter_common::error::RigError;
use plotter_common::hal::driver::ColorSensor;
use plotter_common::hal::types::Color;
use tracing::trace;

/// Reports whether the sheet currently covers the gate.
///
/// Reads are single-shot and not debounced. Callers wait for a
/// transition through [`poll_until`](crate::poll::poll_until).
#[derive(Debug)]
pub struct PaperGate<S> {
    sensor: S,
    paper_color: Color,
}

impl<S: ColorSensor> PaperGate<S> {
    /// Gate that treats `paper_color` as "paper present".
    pub fn new(sensor: S, paper_color: Color) -> Self {
        Self {
            sensor,
            paper_color,
        }
    }

    /// Colour classified as paper.
    pub fn paper_color(&self) -> Color {
        self.paper_color
    }

    /// Raw colour reading.
    pub fn color(&mut self) -> Result<Color, RigError> {
        Ok(self.sensor.color()?)
    }

    /// True if the sensor currently sees paper.
    pub fn is_present(&mut self) -> Result<bool, RigError> {
        let color = self.sensor.color()?;
        trace!("gate: read {color:?}");
        Ok(color == self.paper_color)
    }

    /// Underlying sensor.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}
