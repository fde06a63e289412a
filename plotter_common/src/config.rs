//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load the rig's TOML
//! configuration file.
//!
//! # Usage
//!
//! ```rust,no_run
//! use plotter_common::config::{ConfigError, ConfigLoader, RigConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = RigConfig::load(Path::new("config/rig.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use crate::consts::*;
use crate::hal::types::Color;
use crate::motion::{Direction, Position, TravelEnvelope};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "plotter-bench-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Rig instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: "plotter".to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Cooperative poll settings shared by every blocking wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollConfig {
    /// Delay between two polls [ms].
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    /// Give up after this many polls. `None` waits forever.
    #[serde(default)]
    pub max_iterations: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_iterations: None,
        }
    }
}

impl PollConfig {
    /// Poll interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_carriage_power() -> u8 {
    CARRIAGE_POWER
}
fn default_carriage_lower() -> Position {
    CARRIAGE_EXCLUSIVE_LOWER + 1
}
fn default_carriage_upper() -> Position {
    CARRIAGE_EXCLUSIVE_UPPER - 1
}
fn default_negative() -> Direction {
    Direction::Negative
}
fn default_retreat() -> u32 {
    SOFT_RETREAT_TICKS
}
fn default_carriage_ticks_per_mm() -> f64 {
    CARRIAGE_TICKS_PER_MM
}

/// Carriage axis configuration.
///
/// Bounds are inclusive. The default `[-49, 1239]` is the carriage's
/// open interval `(-50, 1240)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarriageConfig {
    /// Default drive power [%].
    #[serde(default = "default_carriage_power")]
    pub power: u8,
    /// Lowest reachable logical position (inclusive).
    #[serde(default = "default_carriage_lower")]
    pub lower_bound: Position,
    /// Highest reachable logical position (inclusive).
    #[serde(default = "default_carriage_upper")]
    pub upper_bound: Position,
    /// Direction of the end-stop used as home ("right").
    #[serde(default = "default_negative")]
    pub home_direction: Direction,
    /// Ticks backed off the end-stop after contact.
    #[serde(default = "default_retreat")]
    pub retreat_ticks: u32,
    /// Belt transmission [ticks/mm].
    #[serde(default = "default_carriage_ticks_per_mm")]
    pub ticks_per_mm: f64,
}

impl Default for CarriageConfig {
    fn default() -> Self {
        Self {
            power: CARRIAGE_POWER,
            lower_bound: default_carriage_lower(),
            upper_bound: default_carriage_upper(),
            home_direction: Direction::Negative,
            retreat_ticks: SOFT_RETREAT_TICKS,
            ticks_per_mm: CARRIAGE_TICKS_PER_MM,
        }
    }
}

impl CarriageConfig {
    /// Travel envelope in logical ticks.
    pub fn envelope(&self) -> TravelEnvelope {
        TravelEnvelope::new(self.lower_bound, self.upper_bound)
    }
}

fn default_pen_power() -> u8 {
    PEN_POWER
}
fn default_pen_lower() -> Position {
    PEN_LOWER_BOUND
}
fn default_pen_upper() -> Position {
    PEN_UPPER_BOUND
}
fn default_pen_retreat() -> u32 {
    PEN_RETREAT_TICKS
}
fn default_pen_tolerance() -> i32 {
    PEN_UP_TOLERANCE
}
fn default_pen_down() -> Position {
    PEN_DEFAULT_DOWN
}
fn default_pen_settle_ms() -> u64 {
    PEN_SETTLE_MS
}

/// Pen lift configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PenConfig {
    /// Default drive power [%].
    #[serde(default = "default_pen_power")]
    pub power: u8,
    /// Lowest reachable logical position (inclusive).
    #[serde(default = "default_pen_lower")]
    pub lower_bound: Position,
    /// Highest reachable logical position (inclusive).
    #[serde(default = "default_pen_upper")]
    pub upper_bound: Position,
    /// Direction of the up stop.
    #[serde(default = "default_negative")]
    pub home_direction: Direction,
    /// Ticks backed off the up stop after contact.
    #[serde(default = "default_pen_retreat")]
    pub retreat_ticks: u32,
    /// Positions below `up + up_tolerance` count as up.
    #[serde(default = "default_pen_tolerance")]
    pub up_tolerance: i32,
    /// Down setpoint used until `setup` calibrates one.
    #[serde(default = "default_pen_down")]
    pub default_down: Position,
    /// Pause after homing [ms].
    #[serde(default = "default_pen_settle_ms")]
    pub settle_ms: u64,
}

impl Default for PenConfig {
    fn default() -> Self {
        Self {
            power: PEN_POWER,
            lower_bound: PEN_LOWER_BOUND,
            upper_bound: PEN_UPPER_BOUND,
            home_direction: Direction::Negative,
            retreat_ticks: PEN_RETREAT_TICKS,
            up_tolerance: PEN_UP_TOLERANCE,
            default_down: PEN_DEFAULT_DOWN,
            settle_ms: PEN_SETTLE_MS,
        }
    }
}

impl PenConfig {
    /// Travel envelope in logical ticks.
    pub fn envelope(&self) -> TravelEnvelope {
        TravelEnvelope::new(self.lower_bound, self.upper_bound)
    }

    /// Post-homing pause as a `Duration`.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

fn default_roller_power() -> u8 {
    ROLLER_POWER
}
fn default_grip_power() -> u8 {
    ROLLER_GRIP_POWER
}
fn default_grip_ms() -> u64 {
    ROLLER_GRIP_MS
}
fn default_slack() -> i32 {
    PAPER_SLACK_TICKS
}
fn default_settle_ms() -> u64 {
    ROLLER_SETTLE_MS
}
fn default_eject_settle_ms() -> u64 {
    EJECT_SETTLE_MS
}
fn default_roller_lower() -> Position {
    ROLLER_LOWER_BOUND
}
fn default_roller_upper() -> Position {
    ROLLER_UPPER_BOUND
}
fn default_paper_color() -> Color {
    Color::White
}
fn default_clearing_rotations() -> u32 {
    ROLLER_CLEARING_ROTATIONS
}
fn default_drift_tolerance() -> i32 {
    ROLLER_DRIFT_TOLERANCE
}
fn default_roller_ticks_per_mm() -> f64 {
    ROLLER_TICKS_PER_MM
}

/// Paper feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollerConfig {
    /// Default drive power [%].
    #[serde(default = "default_roller_power")]
    pub power: u8,
    /// Out-feed power during the grip pulse [%].
    #[serde(default = "default_grip_power")]
    pub grip_power: u8,
    /// Grip pulse duration [ms].
    #[serde(default = "default_grip_ms")]
    pub grip_duration_ms: u64,
    /// Retract after intake [ticks].
    #[serde(default = "default_slack")]
    pub slack_ticks: i32,
    /// Settle after the intake retract [ms].
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Settle before and after the eject wait loop [ms].
    #[serde(default = "default_eject_settle_ms")]
    pub eject_settle_ms: u64,
    /// Lowest reachable logical paper position (inclusive).
    #[serde(default = "default_roller_lower")]
    pub lower_bound: Position,
    /// Highest reachable logical paper position (inclusive).
    #[serde(default = "default_roller_upper")]
    pub upper_bound: Position,
    /// Colour the gate reports while paper covers it.
    #[serde(default = "default_paper_color")]
    pub paper_color: Color,
    /// Run the clearing rotations on reset when no sheet is seen.
    #[serde(default)]
    pub prevent_paper_blocking: bool,
    /// Rotations run to clear the feed path.
    #[serde(default = "default_clearing_rotations")]
    pub clearing_rotations: u32,
    /// Tolerated in/out divergence [ticks].
    #[serde(default = "default_drift_tolerance")]
    pub drift_tolerance: i32,
    /// Roller transmission [ticks/mm].
    #[serde(default = "default_roller_ticks_per_mm")]
    pub ticks_per_mm: f64,
}

impl Default for RollerConfig {
    fn default() -> Self {
        Self {
            power: ROLLER_POWER,
            grip_power: ROLLER_GRIP_POWER,
            grip_duration_ms: ROLLER_GRIP_MS,
            slack_ticks: PAPER_SLACK_TICKS,
            settle_ms: ROLLER_SETTLE_MS,
            eject_settle_ms: EJECT_SETTLE_MS,
            lower_bound: ROLLER_LOWER_BOUND,
            upper_bound: ROLLER_UPPER_BOUND,
            paper_color: Color::White,
            prevent_paper_blocking: false,
            clearing_rotations: ROLLER_CLEARING_ROTATIONS,
            drift_tolerance: ROLLER_DRIFT_TOLERANCE,
            ticks_per_mm: ROLLER_TICKS_PER_MM,
        }
    }
}

impl RollerConfig {
    /// Travel envelope in logical ticks.
    pub fn envelope(&self) -> TravelEnvelope {
        TravelEnvelope::new(self.lower_bound, self.upper_bound)
    }

    /// Grip pulse as a `Duration`.
    pub fn grip_duration(&self) -> Duration {
        Duration::from_millis(self.grip_duration_ms)
    }

    /// Intake settle as a `Duration`.
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Eject settle as a `Duration`.
    pub fn eject_settle(&self) -> Duration {
        Duration::from_millis(self.eject_settle_ms)
    }
}

/// Complete rig configuration, loaded from one TOML file.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "plotter-01"
///
/// [poll]
/// interval_ms = 100
///
/// [carriage]
/// power = 30
///
/// [rollers]
/// prevent_paper_blocking = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigConfig {
    /// Service name and log level.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Cooperative poll settings.
    #[serde(default)]
    pub poll: PollConfig,
    /// Carriage axis.
    #[serde(default)]
    pub carriage: CarriageConfig,
    /// Pen lift.
    #[serde(default)]
    pub pen: PenConfig,
    /// Paper feed.
    #[serde(default)]
    pub rollers: RollerConfig,
}

impl RigConfig {
    /// Validate the rig configuration.
    ///
    /// # Validation Rules
    /// 1. `shared` is valid
    /// 2. `poll.interval_ms` > 0
    /// 3. every power is in `1..=100`
    /// 4. no envelope is empty
    /// 5. the pen's default down setpoint lies inside the pen envelope
    /// 6. transmissions are positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.poll.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll.interval_ms must be greater than 0".to_string(),
            ));
        }

        for (name, power) in [
            ("carriage.power", self.carriage.power),
            ("pen.power", self.pen.power),
            ("rollers.power", self.rollers.power),
            ("rollers.grip_power", self.rollers.grip_power),
        ] {
            validate_power(name, power)?;
        }

        for (name, envelope) in [
            ("carriage", self.carriage.envelope()),
            ("pen", self.pen.envelope()),
            ("rollers", self.rollers.envelope()),
        ] {
            if envelope.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{name}: empty travel envelope {envelope}"
                )));
            }
        }

        if !self.pen.envelope().contains(self.pen.default_down) {
            return Err(ConfigError::ValidationError(format!(
                "pen.default_down {} is outside {}",
                self.pen.default_down,
                self.pen.envelope()
            )));
        }

        if self.carriage.ticks_per_mm <= 0.0 || self.rollers.ticks_per_mm <= 0.0 {
            return Err(ConfigError::ValidationError(
                "ticks_per_mm must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_power(name: &str, power: u8) -> Result<(), ConfigError> {
    if power == 0 || power > 100 {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be in 1..=100, got {power}"
        )));
    }
    Ok(())
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for every `serde::de::DeserializeOwned` type.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
