//! Integration test: whole-rig flows through the printer facade.

use plotter_common::config::RigConfig;
use plotter_common::error::RigError;
use plotter_common::hal::types::RunLimit;
use plotter_control_unit::paper::PaperState;
use plotter_control_unit::printer::{Printer, RigFlags, RigPorts};

use crate::common::{
    Cmd, MockActuator, MockDelay, MockRig, MockSensor, Window, clear_log, commands, commands_for,
    set_window,
};

type MockPrinter = Printer<MockActuator, MockSensor, MockDelay>;

fn printer(rig: &MockRig, config: &RigConfig) -> MockPrinter {
    Printer::new(
        RigPorts {
            carriage: rig.carriage.clone(),
            pen: rig.pen.clone(),
            roller_in: rig.roller_in.clone(),
            roller_out: rig.roller_out.clone(),
            gate: rig.gate.clone(),
            delay: rig.delay.clone(),
        },
        config,
    )
}

#[test]
fn reset_then_load_makes_rig_ready() {
    let rig = MockRig::new();
    let mut printer = printer(&rig, &RigConfig::default());

    printer.reset_all().unwrap();
    let status = printer.status().unwrap();
    assert!(status.flags.contains(RigFlags::CARRIAGE_REFERENCED | RigFlags::PEN_UP));
    assert!(!status.flags.is_ready());
    assert_eq!(status.rollers, None);

    printer.take_paper().unwrap();
    let status = printer.status().unwrap();
    assert!(status.flags.is_ready());
    assert_eq!(status.carriage, Some(0));
    assert_eq!(status.pen, Some(0));
    assert_eq!(status.rollers, Some((0, 0)));
}

#[test]
fn reset_lifts_pen_before_moving_carriage() {
    let rig = MockRig::new();
    let mut printer = printer(&rig, &RigConfig::default());

    printer.reset_all().unwrap();

    let log = commands(&rig.bench);
    let last_pen = log.iter().rposition(|(n, _)| *n == "pen").unwrap();
    let first_carriage = log.iter().position(|(n, _)| *n == "carriage").unwrap();
    assert!(last_pen < first_carriage);
}

#[test]
fn reset_clears_feed_path_when_configured() {
    let rig = MockRig::new();
    let mut config = RigConfig::default();
    config.rollers.prevent_paper_blocking = true;
    let mut printer = printer(&rig, &config);

    printer.reset_all().unwrap();

    assert_eq!(
        commands_for(&rig.bench, "roller_in"),
        vec![Cmd::RunFor(30, RunLimit::Ticks(1080), false)]
    );
    assert_eq!(
        commands_for(&rig.bench, "roller_out"),
        vec![Cmd::RunFor(30, RunLimit::Ticks(1080), true)]
    );
}

#[test]
fn reset_ejects_a_sheet_left_at_the_gate() {
    let rig = MockRig::new();
    set_window(
        &rig.bench,
        Some(Window {
            motor: rig.roller_in.index,
            from: 900,
            to: 1100,
        }),
    );
    let mut printer = printer(&rig, &RigConfig::default());

    printer.reset_all().unwrap();

    assert!(rig.roller_in.raw() >= 1100);
    assert_eq!(printer.rollers().state(), PaperState::Empty);
}

#[test]
fn stop_all_reaches_every_motor() {
    let rig = MockRig::new();
    let mut printer = printer(&rig, &RigConfig::default());

    printer.stop_all().unwrap();

    assert_eq!(
        commands(&rig.bench),
        vec![
            ("carriage", Cmd::Stop),
            ("pen", Cmd::Stop),
            ("roller_in", Cmd::Stop),
            ("roller_out", Cmd::Stop),
        ]
    );
}

#[test]
fn emergency_stop_keeps_the_sheet_frame() {
    let rig = MockRig::new();
    let mut printer = printer(&rig, &RigConfig::default());
    printer.reset_all().unwrap();
    printer.take_paper().unwrap();
    printer.up_degrees(100).unwrap();
    printer.right_forever().unwrap();
    clear_log(&rig.bench);

    printer.emergency_stop().unwrap();

    assert_eq!(commands(&rig.bench).len(), 4);
    let status = printer.status().unwrap();
    assert!(!status.flags.contains(RigFlags::CARRIAGE_REFERENCED));
    assert!(!status.flags.contains(RigFlags::PEN_REFERENCED));
    assert_eq!(status.rollers, Some((100, 100)));
    assert_eq!(
        printer.left_degrees(10),
        Err(RigError::NotReferenced { axis: "carriage" })
    );
}

#[test]
fn eject_through_facade_empties_the_rig() {
    let rig = MockRig::new();
    let mut printer = printer(&rig, &RigConfig::default());
    printer.reset_all().unwrap();
    printer.take_paper().unwrap();

    printer.eject_paper().unwrap();
    printer.eject_paper().unwrap();

    let status = printer.status().unwrap();
    assert!(!status.flags.contains(RigFlags::PAPER_LOADED));
    assert_eq!(printer.up_degrees(10), Err(RigError::NoPaper));
}

#[test]
fn continuous_drives_and_targeted_stops() {
    let rig = MockRig::new();
    let mut printer = printer(&rig, &RigConfig::default());

    printer.up_forever().unwrap();
    printer.down_forever().unwrap();
    printer.stop_rollers().unwrap();
    printer.left_forever().unwrap();
    printer.stop_carriage().unwrap();

    assert_eq!(
        commands(&rig.bench),
        vec![
            ("roller_in", Cmd::SetVelocity(30)),
            ("roller_out", Cmd::SetVelocity(30)),
            ("roller_in", Cmd::SetVelocity(-30)),
            ("roller_out", Cmd::SetVelocity(-30)),
            ("roller_in", Cmd::Stop),
            ("roller_out", Cmd::Stop),
            ("carriage", Cmd::SetVelocity(30)),
            ("carriage", Cmd::Stop),
        ]
    );
}
