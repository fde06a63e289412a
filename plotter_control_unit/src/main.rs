//! # Plotter Bring-up Binary
//!
//! Assembles the rig on the simulation driver and runs a short
//! self-test: home every axis, load a sheet, exercise rollers, carriage
//! and pen, report roller drift and eject the sheet.
//!
//! # Usage
//!
//! ```bash
//! # Defaults for everything
//! plotter
//!
//! # Rig and simulation configuration, verbose
//! plotter --config config/rig.toml --sim-config config/simulation.toml -v
//!
//! # Home only, JSON logs
//! plotter --skip-paper --json
//! ```

use clap::Parser;
use plotter_common::config::{ConfigLoader, LogLevel, RigConfig};
use plotter_control_unit::printer::{Printer, RigPorts};
use plotter_control_unit::MoveOptions;
use plotter_hal::drivers::simulation::{SimActuator, SimColorSensor, SimDelay};
use plotter_hal::{SimRig, SimulationConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type SimPrinter = Printer<SimActuator, SimColorSensor, SimDelay>;

/// Plotter bring-up - homes the rig and runs a paper/carriage/pen self-test
#[derive(Parser, Debug)]
#[command(name = "plotter")]
#[command(version)]
#[command(about = "Bring-up and self-test for the paper plotter rig")]
#[command(long_about = None)]
struct Args {
    /// Path to the rig configuration file (rig.toml). Defaults apply if omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to the simulation configuration file.
    #[arg(long, value_name = "FILE")]
    sim_config: Option<PathBuf>,

    /// Home the axes only, do not load paper
    #[arg(long)]
    skip_paper: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("FATAL: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RigConfig::load(path),
        None => Ok(RigConfig::default()),
    };
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    let config = config?;
    config.validate()?;
    info!(
        "{} bring-up v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let sim_config = match &args.sim_config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let rig = SimRig::build(&sim_config);
    let mut printer = Printer::new(
        RigPorts {
            carriage: rig.carriage.clone(),
            pen: rig.pen.clone(),
            roller_in: rig.roller_in.clone(),
            roller_out: rig.roller_out.clone(),
            gate: rig.gate.clone(),
            delay: rig.delay.clone(),
        },
        &config,
    );

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    let result = self_test(&mut printer, &running, args.skip_paper);
    if let Err(e) = &result {
        warn!("Self-test aborted: {e}");
        if let Err(stop_err) = printer.emergency_stop() {
            error!("Emergency stop failed: {stop_err}");
        }
    } else {
        printer.save_energy()?;
    }

    info!(
        "Bring-up finished after {:?} of simulated time",
        rig.world.borrow().now()
    );
    result
}

/// Fail if the operator asked to stop.
fn checkpoint(running: &AtomicBool) -> Result<(), Box<dyn std::error::Error>> {
    if running.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err("interrupted by operator".into())
    }
}

fn self_test(
    printer: &mut SimPrinter,
    running: &AtomicBool,
    skip_paper: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    printer.reset_all()?;
    info!("Axes homed: {:?}", printer.status()?.flags);
    checkpoint(running)?;

    if !skip_paper {
        printer.take_paper()?;
        checkpoint(running)?;

        let envelope = printer.paper_envelope();
        printer
            .rollers()
            .go_to(envelope.upper / 2, MoveOptions::blocking())?;
        printer.rollers().go_to(0, MoveOptions::blocking())?;
        checkpoint(running)?;
    }

    printer.carriage().move_mm(100.0, MoveOptions::blocking())?;
    printer.toggle_pen()?;
    printer.toggle_pen()?;
    printer.carriage().go_to(0, MoveOptions::blocking())?;
    checkpoint(running)?;

    let status = printer.status()?;
    info!(
        "Status: flags={:?} carriage={:?} pen={:?} rollers={:?}",
        status.flags, status.carriage, status.pen, status.rollers
    );
    if let Some(drift) = printer.rollers().drift()? {
        info!("Roller drift: {drift} ticks");
    }

    if !skip_paper {
        printer.eject_paper()?;
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        level
    };

    let filter = EnvFilter::from_default_env().add_directive(
        level
            .as_directive()
            .parse()
            .unwrap_or_else(|_| tracing::Level::INFO.into()),
    );

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).compact().init();
    }
}
