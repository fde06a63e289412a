//! Integration test: paper intake, positioning and eject on the roller pair.
//!
//! Rollers start at raw 1000 (in) and 500 (out). The gate sees the sheet
//! once the in-feed roller has advanced 80 ticks.

use plotter_common::config::{PollConfig, RollerConfig};
use plotter_common::error::RigError;
use plotter_common::hal::types::{Color, RunLimit};
use plotter_control_unit::MoveOptions;
use plotter_control_unit::paper::{PaperGate, PaperState, RollerOffsets, RollerPair, RollerSettings};
use std::time::Duration;

use crate::common::{Cmd, MockActuator, MockDelay, MockRig, MockSensor, Window};
use crate::common::{clear_log, commands, commands_for, set_window};

type Pair = RollerPair<MockActuator, MockSensor, MockDelay>;

// ── Helpers ─────────────────────────────────────────────────────────

fn pair_with(rig: &MockRig, settings: RollerSettings) -> Pair {
    RollerPair::new(
        rig.roller_in.clone(),
        rig.roller_out.clone(),
        PaperGate::new(rig.gate.clone(), Color::White),
        rig.delay.clone(),
        RollerConfig::default().envelope(),
        settings,
    )
}

fn pair(rig: &MockRig) -> Pair {
    pair_with(rig, RollerSettings::default())
}

fn loaded() -> (MockRig, Pair) {
    let rig = MockRig::new();
    let mut pair = pair(&rig);
    pair.take_paper(None, None).unwrap();
    clear_log(&rig.bench);
    (rig, pair)
}

// ── Intake ──────────────────────────────────────────────────────────

#[test]
fn intake_snapshots_retracted_positions() {
    let rig = MockRig::new();
    let mut pair = pair(&rig);

    pair.take_paper(None, None).unwrap();

    assert_eq!(pair.state(), PaperState::Loaded);
    assert_eq!(
        pair.offsets(),
        RollerOffsets {
            delta_in: 950,
            delta_out: 450
        }
    );
    assert_eq!(pair.position().unwrap(), Some((0, 0)));
    assert_eq!(pair.drift().unwrap(), Some(0));
}

#[test]
fn intake_command_sequence() {
    let rig = MockRig::new();
    let mut pair = pair(&rig);
    pair.take_paper(None, None).unwrap();

    let expected = vec![
        ("roller_in", Cmd::SetVelocity(30)),
        ("roller_out", Cmd::SetVelocity(30)),
        ("roller_in", Cmd::Stop),
        ("roller_out", Cmd::Stop),
        (
            "roller_out",
            Cmd::RunFor(15, RunLimit::Duration(Duration::from_millis(1000)), true),
        ),
        ("roller_in", Cmd::MoveTo(950, 30, false)),
        ("roller_out", Cmd::MoveTo(450, 30, true)),
    ];
    assert_eq!(commands(&rig.bench), expected);
}

#[test]
fn go_to_zero_commands_snapshot() {
    let (rig, mut pair) = loaded();

    pair.go_to(0, MoveOptions::blocking()).unwrap();

    assert_eq!(
        commands(&rig.bench),
        vec![
            ("roller_in", Cmd::MoveTo(950, 30, false)),
            ("roller_out", Cmd::MoveTo(450, 30, true)),
        ]
    );
}

#[test]
fn second_intake_is_rejected() {
    let (rig, mut pair) = loaded();

    assert_eq!(pair.take_paper(None, None), Err(RigError::PaperAlreadyLoaded));
    assert!(commands(&rig.bench).is_empty());
    assert_eq!(pair.state(), PaperState::Loaded);
}

#[test]
fn intake_gives_up_with_capped_poll() {
    let rig = MockRig::new();
    set_window(&rig.bench, None);
    let poll = PollConfig {
        interval_ms: 100,
        max_iterations: Some(5),
    };
    let settings = RollerSettings::from_config(&RollerConfig::default(), &poll);
    let mut pair = pair_with(&rig, settings);

    let err = pair.take_paper(None, None).unwrap_err();

    assert!(matches!(err, RigError::PollExhausted { iterations: 5, .. }));
    assert_eq!(pair.state(), PaperState::Empty);
    assert_eq!(pair.offsets(), RollerOffsets::default());
    assert_eq!(commands_for(&rig.bench, "roller_in").last(), Some(&Cmd::Stop));
    assert_eq!(commands_for(&rig.bench, "roller_out").last(), Some(&Cmd::Stop));
}

// ── Positioning ─────────────────────────────────────────────────────

#[test]
fn positioning_without_paper_sends_nothing() {
    let rig = MockRig::new();
    let mut pair = pair(&rig);

    assert_eq!(pair.go_to(0, MoveOptions::blocking()), Err(RigError::NoPaper));
    assert_eq!(pair.move_by(10, MoveOptions::blocking()), Err(RigError::NoPaper));
    assert_eq!(pair.down_limit(None), Err(RigError::NoPaper));
    assert!(commands(&rig.bench).is_empty());
}

#[test]
fn move_and_back_returns_to_start() {
    let (rig, mut pair) = loaded();

    pair.move_by(120, MoveOptions::blocking()).unwrap();
    assert_eq!(pair.position().unwrap(), Some((120, 120)));
    pair.move_by(-120, MoveOptions::blocking()).unwrap();

    assert_eq!(pair.position().unwrap(), Some((0, 0)));
    assert_eq!(rig.roller_in.raw(), 950);
    assert_eq!(rig.roller_out.raw(), 450);
}

#[test]
fn move_outside_paper_envelope_is_rejected() {
    let (rig, mut pair) = loaded();

    let err = pair.move_by(-1, MoveOptions::blocking()).unwrap_err();
    assert!(matches!(err, RigError::OutOfBounds { position: -1, .. }));
    assert!(pair.go_to(516, MoveOptions::blocking()).is_err());
    assert!(commands(&rig.bench).is_empty());

    pair.go_to(515, MoveOptions::blocking()).unwrap();
    pair.move_by(-600, MoveOptions::blocking().overriding()).unwrap();
    assert_eq!(pair.position().unwrap(), Some((-85, -85)));
}

#[test]
fn extreme_moves_are_rejected_without_overflow() {
    let (rig, mut pair) = loaded();

    let err = pair.move_by(i32::MAX, MoveOptions::blocking()).unwrap_err();
    assert!(matches!(err, RigError::OutOfBounds { .. }));

    let err = pair
        .move_by(i32::MAX, MoveOptions::blocking().overriding())
        .unwrap_err();
    assert!(matches!(err, RigError::OutOfBounds { position: i32::MAX, .. }));

    let err = pair
        .go_to(i32::MAX, MoveOptions::blocking().overriding())
        .unwrap_err();
    assert!(matches!(err, RigError::OutOfBounds { position: i32::MAX, .. }));

    assert!(commands(&rig.bench).is_empty());
    assert_eq!(pair.position().unwrap(), Some((0, 0)));
}

#[test]
fn non_finite_distance_is_rejected() {
    let (rig, mut pair) = loaded();

    assert_eq!(
        pair.move_mm(f64::INFINITY, MoveOptions::blocking()),
        Err(RigError::InvalidDistance { axis: "roller_out" })
    );
    assert!(commands(&rig.bench).is_empty());
}

// ── Eject ───────────────────────────────────────────────────────────

#[test]
fn eject_runs_until_gate_clears() {
    let (rig, mut pair) = loaded();
    set_window(
        &rig.bench,
        Some(Window {
            motor: rig.roller_in.index,
            from: 900,
            to: 1100,
        }),
    );

    pair.eject_paper(None).unwrap();

    assert_eq!(pair.state(), PaperState::Empty);
    assert_eq!(pair.offsets(), RollerOffsets::default());
    assert!(rig.roller_in.raw() >= 1100);
    assert_eq!(commands_for(&rig.bench, "roller_out").last(), Some(&Cmd::Stop));
}

#[test]
fn eject_twice_is_idempotent() {
    let (rig, mut pair) = loaded();
    pair.eject_paper(None).unwrap();
    assert_eq!(pair.state(), PaperState::Empty);
    clear_log(&rig.bench);

    pair.eject_paper(None).unwrap();

    assert_eq!(pair.state(), PaperState::Empty);
    assert!(commands(&rig.bench).is_empty());
}
