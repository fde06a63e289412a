//! # Plotter HAL Library
//!
//! Back-ends for the hardware ports defined in `plotter_common::hal`.
//!
//! # Module Structure
//!
//! - [`drivers`] - Driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    plotter_hal::simulation                    │
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────────────┐   │
//! │  │ SimActuator │──►│   SimWorld   │◄──│  SimColorSensor   │   │
//! │  │   (×4)      │   │ motors+paper │   │  SimDelay (clock) │   │
//! │  └──────┬──────┘   └──────────────┘   └─────────┬─────────┘   │
//! └─────────┼───────────────────────────────────────┼─────────────┘
//!           ▼                                       ▼
//!      Actuator trait                    ColorSensor / Delay traits
//! ```

#![warn(missing_docs)]

pub mod drivers;

pub use crate::drivers::simulation::{SimRig, SimulationConfig, create_rig};
