//! Integration test: limit homing of carriage and pen.
//!
//! Mock end-stops: carriage at -200 / 1150, pen at -60 / 400.

use plotter_common::config::{CarriageConfig, PenConfig, PollConfig};
use plotter_common::error::RigError;
use plotter_common::hal::driver::{Actuator, HalError};
use plotter_common::hal::types::{RunLimit, StopAction};
use plotter_common::motion::{Direction, TravelEnvelope};
use plotter_control_unit::head::{Carriage, Pen};
use plotter_control_unit::motion::{BoundedAxis, LimitHoming};
use plotter_control_unit::MoveOptions;
use std::time::Duration;

use crate::common::{Bench, Cmd, MockDelay, MockRig, add_motor, clear_log, commands_for};

#[test]
fn carriage_reset_sequence() {
    let rig = MockRig::new();
    let mut carriage = Carriage::from_config(rig.carriage.clone(), &CarriageConfig::default());

    carriage.reset(None).unwrap();

    assert_eq!(
        commands_for(&rig.bench, "carriage"),
        vec![
            Cmd::SetVelocity(-30),
            Cmd::WaitUntilStopped,
            Cmd::Hold(false),
            Cmd::RunFor(30, RunLimit::Ticks(50), true),
            Cmd::MoveTo(-150, 30, true),
        ]
    );
    assert_eq!(carriage.axis().zero_offset(), Some(-150));
    assert_eq!(carriage.position().unwrap(), 0);
}

#[test]
fn go_to_zero_after_home_targets_zero_offset() {
    let rig = MockRig::new();
    let mut carriage = Carriage::from_config(rig.carriage.clone(), &CarriageConfig::default());
    carriage.axis_mut().home(true, Some(50)).unwrap();
    assert_eq!(carriage.position().unwrap(), 0);
    clear_log(&rig.bench);

    carriage.move_by(300, MoveOptions::blocking()).unwrap();
    carriage.go_to(0, MoveOptions::blocking()).unwrap();

    assert_eq!(
        commands_for(&rig.bench, "carriage"),
        vec![Cmd::MoveTo(150, 30, true), Cmd::MoveTo(-150, 30, true)]
    );
}

#[test]
fn home_without_retreat_binds_the_stop() {
    let rig = MockRig::new();
    let mut carriage = Carriage::from_config(rig.carriage.clone(), &CarriageConfig::default());

    let zero = carriage.axis_mut().home(false, None).unwrap();

    assert_eq!(zero, -200);
    assert!(
        !commands_for(&rig.bench, "carriage")
            .iter()
            .any(|c| matches!(c, Cmd::RunFor(..)))
    );
}

#[test]
fn limits_keep_the_frame() {
    let rig = MockRig::new();
    let mut carriage = Carriage::from_config(rig.carriage.clone(), &CarriageConfig::default());
    carriage.reset(None).unwrap();

    carriage.left_limit(true, None).unwrap();
    assert_eq!(carriage.position().unwrap(), 1250);

    carriage.right_limit(false, None).unwrap();
    assert_eq!(carriage.position().unwrap(), -50);
    assert_eq!(carriage.axis().zero_offset(), Some(-150));
}

#[test]
fn actuator_that_never_stalls_leaves_axis_unreferenced() {
    let bench = Bench::new();
    let free = add_motor(&bench, "free", 0);
    let mut axis = BoundedAxis::new("free", free, TravelEnvelope::new(-1000, 1000), 30)
        .with_homing(LimitHoming::new(Direction::Negative, 30));

    let err = axis.home(true, None).unwrap_err();

    assert!(matches!(err, RigError::Hal(HalError::Timeout(_))));
    assert!(!axis.is_referenced());
}

#[test]
fn pen_reset_holds_homes_and_settles() {
    let rig = MockRig::new();
    let mut pen = Pen::from_config(
        rig.pen.clone(),
        rig.delay.clone(),
        &PenConfig::default(),
        &PollConfig::default(),
    );

    pen.reset(None).unwrap();

    assert_eq!(
        commands_for(&rig.bench, "pen"),
        vec![
            Cmd::SetStopAction(StopAction::Hold),
            Cmd::SetVelocity(-20),
            Cmd::WaitUntilStopped,
            Cmd::Hold(false),
            Cmd::RunFor(20, RunLimit::Ticks(20), true),
        ]
    );
    assert_eq!(pen.axis().zero_offset(), Some(-40));
    assert_eq!(rig.bench.borrow().elapsed, Duration::from_millis(1000));
    assert!(pen.is_up().unwrap());
}

#[test]
fn pen_toggle_moves_between_setpoints() {
    let rig = MockRig::new();
    let mut pen = Pen::from_config(
        rig.pen.clone(),
        MockDelay::new(&rig.bench),
        &PenConfig::default(),
        &PollConfig::default(),
    );
    pen.reset(None).unwrap();
    clear_log(&rig.bench);

    pen.toggle(None).unwrap();
    assert!(!pen.is_up().unwrap());
    assert_eq!(pen.axis().position().unwrap(), 40);

    pen.down(None).unwrap();
    pen.toggle(None).unwrap();
    assert!(pen.is_up().unwrap());

    assert_eq!(
        commands_for(&rig.bench, "pen"),
        vec![Cmd::MoveTo(0, 20, true), Cmd::MoveTo(-40, 20, true)]
    );
}

#[test]
fn pen_setup_records_hand_lowered_position() {
    let rig = MockRig::new();
    let mut pen = Pen::from_config(
        rig.pen.clone(),
        rig.delay.clone(),
        &PenConfig::default(),
        &PollConfig::default(),
    );
    let mut hand = rig.pen.clone();
    let mut polls = 0;

    pen.setup(
        || {
            polls += 1;
            if polls < 3 {
                return Ok(false);
            }
            // Operator pushed the pen down to raw 30 and pressed confirm.
            hand.move_to(30, 10, true)?;
            Ok(true)
        },
        None,
    )
    .unwrap();

    assert_eq!(polls, 3);
    assert_eq!(pen.down_position(), 70);
    assert!(pen.is_up().unwrap());
    assert_eq!(pen.axis().position().unwrap(), 0);
    assert_eq!(
        commands_for(&rig.bench, "pen").last(),
        Some(&Cmd::MoveTo(-40, 20, true))
    );
}

#[test]
fn pen_setup_rejects_position_outside_envelope() {
    let rig = MockRig::new();
    let mut pen = Pen::from_config(
        rig.pen.clone(),
        rig.delay.clone(),
        &PenConfig::default(),
        &PollConfig::default(),
    );
    let mut hand = rig.pen.clone();

    let err = pen
        .setup(
            || {
                hand.move_to(360, 10, true)?;
                Ok(true)
            },
            None,
        )
        .unwrap_err();

    assert!(matches!(err, RigError::OutOfBounds { axis: "pen", position: 400, .. }));
    assert_eq!(pen.down_position(), 40);
}

#[test]
fn pen_setup_gives_up_without_confirmation() {
    let rig = MockRig::new();
    let poll = PollConfig {
        interval_ms: 100,
        max_iterations: Some(4),
    };
    let mut pen = Pen::from_config(rig.pen.clone(), rig.delay.clone(), &PenConfig::default(), &poll);

    assert_eq!(
        pen.setup(|| Ok(false), None),
        Err(RigError::PollExhausted {
            what: "pen down confirmation",
            iterations: 4
        })
    );
    assert_eq!(pen.down_position(), 40);
}
