//! Integration test: carriage travel envelope.
//!
//! The carriage's open interval (-50, 1240) is configured as the
//! inclusive envelope [-49, 1239]. Rejected targets never reach the motor.

use plotter_common::config::CarriageConfig;
use plotter_common::error::RigError;
use plotter_control_unit::head::Carriage;
use plotter_control_unit::MoveOptions;

use crate::common::{Cmd, MockActuator, MockRig, clear_log, commands_for};

fn homed_carriage(rig: &MockRig) -> Carriage<MockActuator> {
    let mut carriage = Carriage::from_config(rig.carriage.clone(), &CarriageConfig::default());
    carriage.reset(None).unwrap();
    clear_log(&rig.bench);
    carriage
}

#[test]
fn upper_bound_is_exclusive_of_1240() {
    let rig = MockRig::new();
    let mut carriage = homed_carriage(&rig);

    let err = carriage.go_to(1240, MoveOptions::blocking()).unwrap_err();
    assert!(matches!(
        err,
        RigError::OutOfBounds {
            axis: "carriage",
            position: 1240,
            ..
        }
    ));
    assert!(commands_for(&rig.bench, "carriage").is_empty());

    carriage.go_to(1239, MoveOptions::blocking()).unwrap();
    assert_eq!(
        commands_for(&rig.bench, "carriage"),
        vec![Cmd::MoveTo(1089, 30, true)]
    );
    assert_eq!(carriage.position().unwrap(), 1239);
}

#[test]
fn lower_bound_is_exclusive_of_minus_50() {
    let rig = MockRig::new();
    let mut carriage = homed_carriage(&rig);

    assert!(carriage.go_to(-50, MoveOptions::blocking()).is_err());
    carriage.go_to(-49, MoveOptions::blocking()).unwrap();
    assert_eq!(carriage.position().unwrap(), -49);
}

#[test]
fn relative_moves_are_checked_in_the_logical_frame() {
    let rig = MockRig::new();
    let mut carriage = homed_carriage(&rig);
    carriage.go_to(1200, MoveOptions::blocking()).unwrap();

    assert!(carriage.move_by(40, MoveOptions::blocking()).is_err());
    carriage.move_by(39, MoveOptions::blocking()).unwrap();
    assert_eq!(carriage.position().unwrap(), 1239);

    carriage.move_by(-300, MoveOptions::blocking()).unwrap();
    carriage.move_by(300, MoveOptions::blocking()).unwrap();
    assert_eq!(carriage.position().unwrap(), 1239);
}

#[test]
fn override_skips_the_envelope_but_not_the_end_stop() {
    let rig = MockRig::new();
    let mut carriage = homed_carriage(&rig);

    carriage
        .go_to(1400, MoveOptions::blocking().overriding())
        .unwrap();

    assert_eq!(
        commands_for(&rig.bench, "carriage"),
        vec![Cmd::MoveTo(1250, 30, true)]
    );
    // Physical travel ends at the belt end.
    assert_eq!(rig.carriage.raw(), 1150);
}

#[test]
fn unreferenced_carriage_refuses_to_move() {
    let rig = MockRig::new();
    let mut carriage = Carriage::from_config(rig.carriage.clone(), &CarriageConfig::default());

    assert_eq!(
        carriage.go_to(0, MoveOptions::blocking()),
        Err(RigError::NotReferenced { axis: "carriage" })
    );
    assert!(commands_for(&rig.bench, "carriage").is_empty());
}

#[test]
fn extreme_targets_are_rejected_without_overflow() {
    let rig = MockRig::new();
    let mut carriage = homed_carriage(&rig);
    carriage.go_to(1239, MoveOptions::blocking()).unwrap();
    clear_log(&rig.bench);

    let err = carriage.move_by(i32::MAX, MoveOptions::blocking()).unwrap_err();
    assert!(matches!(
        err,
        RigError::OutOfBounds {
            axis: "carriage",
            position: i32::MAX,
            ..
        }
    ));
    let err = carriage
        .go_to(i32::MIN, MoveOptions::blocking().overriding())
        .unwrap_err();
    assert!(matches!(err, RigError::OutOfBounds { position: i32::MIN, .. }));

    assert!(commands_for(&rig.bench, "carriage").is_empty());
    assert_eq!(carriage.position().unwrap(), 1239);
}

#[test]
fn nan_distance_is_not_a_zero_move() {
    let rig = MockRig::new();
    let mut carriage = homed_carriage(&rig);

    assert_eq!(
        carriage.move_mm(f64::NAN, MoveOptions::blocking()),
        Err(RigError::InvalidDistance { axis: "carriage" })
    );
    assert!(commands_for(&rig.bench, "carriage").is_empty());
}
