//! Rig-wide constants for the plotter workspace.
//!
//! Single source of truth for mechanical defaults. Configuration defaults
//! in [`crate::config`] are taken from here.

use static_assertions::const_assert;

// ─── Poll ───────────────────────────────────────────────────────────

/// Default interval between two sensor/validator polls [ms].
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// ─── Limit homing ───────────────────────────────────────────────────

/// Ticks backed off an end-stop after stall contact.
pub const SOFT_RETREAT_TICKS: u32 = 50;

// ─── Carriage ───────────────────────────────────────────────────────

/// Default carriage drive power [%].
pub const CARRIAGE_POWER: u8 = 30;

/// Carriage travel, exclusive lower bound [ticks].
pub const CARRIAGE_EXCLUSIVE_LOWER: i32 = -50;

/// Carriage travel, exclusive upper bound [ticks].
pub const CARRIAGE_EXCLUSIVE_UPPER: i32 = 1240;

/// Carriage pulley: ticks per millimetre of belt (360° per 78 mm).
pub const CARRIAGE_TICKS_PER_MM: f64 = 360.0 / 78.0;

// ─── Pen ────────────────────────────────────────────────────────────

/// Default pen drive power [%].
pub const PEN_POWER: u8 = 20;

/// Ticks backed off the pen's up stop after homing.
pub const PEN_RETREAT_TICKS: u32 = 20;

/// A pen below `up + PEN_UP_TOLERANCE` still counts as up [ticks].
pub const PEN_UP_TOLERANCE: i32 = 15;

/// Down setpoint used until the pen is calibrated [ticks].
pub const PEN_DEFAULT_DOWN: i32 = 40;

/// Pen travel lower bound (inclusive) [ticks].
pub const PEN_LOWER_BOUND: i32 = -30;

/// Pen travel upper bound (inclusive) [ticks].
pub const PEN_UPPER_BOUND: i32 = 360;

/// Pause after pen homing before the next command [ms].
pub const PEN_SETTLE_MS: u64 = 1000;

// ─── Rollers ────────────────────────────────────────────────────────

/// Default roller drive power [%].
pub const ROLLER_POWER: u8 = 30;

/// Out-feed grip pulse power [%].
pub const ROLLER_GRIP_POWER: u8 = 15;

/// Out-feed grip pulse duration [ms].
pub const ROLLER_GRIP_MS: u64 = 1000;

/// Retract after intake to create working slack [ticks].
pub const PAPER_SLACK_TICKS: i32 = 130;

/// Mechanical settle after the intake retract [ms].
pub const ROLLER_SETTLE_MS: u64 = 200;

/// Settle around the eject wait loop [ms].
pub const EJECT_SETTLE_MS: u64 = 500;

/// Roller travel lower bound (inclusive) [ticks].
pub const ROLLER_LOWER_BOUND: i32 = 0;

/// Roller travel upper bound (inclusive) [ticks].
pub const ROLLER_UPPER_BOUND: i32 = 515;

/// Rotations run by both rollers to clear a blocked feed path.
pub const ROLLER_CLEARING_ROTATIONS: u32 = 3;

/// Encoder ticks per full motor rotation.
pub const TICKS_PER_ROTATION: u32 = 360;

/// Maximum tolerated in/out divergence before flagging drift [ticks].
pub const ROLLER_DRIFT_TOLERANCE: i32 = 10;

/// Roller surface: ticks per millimetre of paper (360° per 132 mm).
pub const ROLLER_TICKS_PER_MM: f64 = 360.0 / 132.0;

const_assert!(CARRIAGE_EXCLUSIVE_LOWER + 1 < CARRIAGE_EXCLUSIVE_UPPER - 1);
const_assert!(PEN_LOWER_BOUND <= 0 && PEN_DEFAULT_DOWN <= PEN_UPPER_BOUND);
const_assert!(ROLLER_LOWER_BOUND < ROLLER_UPPER_BOUND);
const_assert!(PAPER_SLACK_TICKS > 0);
