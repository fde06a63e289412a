//! Plotter Common Library
//!
//! Shared types, hardware ports and configuration loading for all
//! plotter workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Mechanical defaults of the rig
//! - [`motion`] - Positions, directions and travel envelopes
//! - [`hal`] - Actuator, colour sensor and delay ports
//! - [`error`] - Control-level error taxonomy
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use plotter_common::prelude::*;
//!
//! let envelope = TravelEnvelope::from_exclusive(-50, 1240);
//! assert!(envelope.contains(1239));
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod hal;
pub mod motion;
pub mod prelude;
