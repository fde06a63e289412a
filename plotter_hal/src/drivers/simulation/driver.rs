//! Simulated plotter rig.
//!
//! Builds the standard motor set of the plotter on one [`SimWorld`]:
//!
//! | Motor      | Type   | Polarity | End-stops        |
//! |------------|--------|----------|------------------|
//! | carriage   | large  | normal   | belt ends        |
//! | pen        | medium | normal   | up / down stop   |
//! | roller_in  | large  | normal   | none             |
//! | roller_out | large  | inverted | none             |
//!
//! plus the colour gate between the two rollers.

use plotter_common::hal::types::{Color, Polarity};
use plotter_common::motion::Position;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::actuator::SimActuator;
use super::io::{SimColorSensor, SimDelay};
use super::physics::{MotorSpec, PaperPath};
use super::world::{SimHandle, SimWorld};

/// Power-on state and geometry of the simulated rig.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Large motor speed at 100 % [ticks/s].
    pub large_motor_speed: u32,
    /// Medium motor speed at 100 % [ticks/s].
    pub medium_motor_speed: u32,
    /// Carriage encoder reading at power-on.
    pub carriage_start: Position,
    /// Carriage belt ends in encoder ticks (right, left).
    pub carriage_stops: (Position, Position),
    /// Pen encoder reading at power-on.
    pub pen_start: Position,
    /// Pen stops in encoder ticks (up, down).
    pub pen_stops: (Position, Position),
    /// In-feed roller encoder reading at power-on.
    pub roller_in_start: Position,
    /// Out-feed roller encoder reading at power-on.
    pub roller_out_start: Position,
    /// In-feed nip to gate [ticks].
    pub gate_at: Position,
    /// Sheet length [ticks].
    pub sheet_length: Position,
    /// Colour reported while paper covers the gate.
    pub paper_color: Color,
    /// Colour reported with an empty gate.
    pub background: Color,
    /// Insert a sheet into the in-feed nip at power-on.
    pub insert_sheet: bool,
    /// Longest blocking wait before `HalError::Timeout` [ms].
    pub block_limit_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            large_motor_speed: 1000,
            medium_motor_speed: 1500,
            carriage_start: 0,
            carriage_stops: (-200, 1150),
            pen_start: 0,
            pen_stops: (-60, 400),
            roller_in_start: 0,
            roller_out_start: 0,
            gate_at: 80,
            sheet_length: 1200,
            paper_color: Color::White,
            background: Color::NoColor,
            insert_sheet: true,
            block_limit_ms: 60_000,
        }
    }
}

/// Every port of the simulated rig.
#[derive(Debug)]
pub struct SimRig {
    /// The shared world.
    pub world: SimHandle,
    /// Carriage motor.
    pub carriage: SimActuator,
    /// Pen lift motor.
    pub pen: SimActuator,
    /// In-feed roller motor.
    pub roller_in: SimActuator,
    /// Out-feed roller motor.
    pub roller_out: SimActuator,
    /// Paper gate colour sensor.
    pub gate: SimColorSensor,
    /// Simulated clock.
    pub delay: SimDelay,
}

impl SimRig {
    /// Power on a simulated rig.
    pub fn build(config: &SimulationConfig) -> Self {
        let mut world = SimWorld::new(PaperPath {
            gate_at: config.gate_at,
            length: config.sheet_length,
        });
        world.set_colors(config.paper_color, config.background);
        world.set_block_limit(Duration::from_millis(config.block_limit_ms));

        let carriage = world.add_motor(
            MotorSpec::new("carriage")
                .max_speed(config.large_motor_speed)
                .start_at(config.carriage_start)
                .end_stops(config.carriage_stops.0, config.carriage_stops.1),
        );
        let pen = world.add_motor(
            MotorSpec::new("pen")
                .max_speed(config.medium_motor_speed)
                .start_at(config.pen_start)
                .end_stops(config.pen_stops.0, config.pen_stops.1),
        );
        let roller_in = world.add_motor(
            MotorSpec::new("roller_in")
                .max_speed(config.large_motor_speed)
                .start_at(config.roller_in_start),
        );
        let roller_out = world.add_motor(
            MotorSpec::new("roller_out")
                .polarity(Polarity::Inverted)
                .max_speed(config.large_motor_speed)
                .start_at(config.roller_out_start),
        );
        world.set_feed(roller_in, roller_out);
        if config.insert_sheet {
            world.paper_mut().insert();
        }

        info!(
            "Simulated rig powered on (gate at {} ticks, sheet {})",
            config.gate_at,
            if config.insert_sheet { "inserted" } else { "absent" }
        );

        let world = world.into_handle();
        Self {
            carriage: SimActuator::new(world.clone(), carriage),
            pen: SimActuator::new(world.clone(), pen),
            roller_in: SimActuator::new(world.clone(), roller_in),
            roller_out: SimActuator::new(world.clone(), roller_out),
            gate: SimColorSensor::new(world.clone()),
            delay: SimDelay::new(world.clone()),
            world,
        }
    }

    /// Operator pushes a fresh sheet into the in-feed nip.
    pub fn insert_sheet(&self) {
        self.world.borrow_mut().paper_mut().insert();
    }
}
