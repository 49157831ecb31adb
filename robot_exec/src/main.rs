//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Operator input script replay (simulation)
//!         - Robot cycle:
//!             - Sensor and operator input acquisition
//!             - Lift/arm arbitration and drive scaling
//!             - Actuator outputs, re-homing and pneumatics
//!             - Telemetry
//!         - Plant simulation step
//!
//! # Modules
//!
//! All control modules (e.g. `lift_arm_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::ds::RobotMode;
use robot_lib::{
    hal::sim::{SimEvent, SimRobot},
    params::RobotExecParams,
    robot::{Robot, RobotParams},
    tm::{ArchivePublisher, LogPublisher, MultiPublisher},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    raise_error,
    script_interpreter::{PendingEvents, ScriptInterpreter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Robot control executable.
///
/// Runs the control loop against the simulated robot, optionally replaying an operator input
/// script into it.
#[derive(Debug, StructOpt)]
#[structopt(name = "robot_exec")]
struct Opt {
    /// Operator input script to replay.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,

    /// Stop after this many cycles.
    #[structopt(short = "n", long)]
    max_cycles: Option<u64>,

    /// Starting mode (disabled, auto or teleop), overrides the parameter file.
    #[structopt(short, long)]
    mode: Option<RobotMode>,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("robot_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    // Sim plant updates and telemetry packets are traced every cycle
    logger_init(
        LevelFilter::Debug,
        &[
            ("robot_lib::hal::sim", LevelFilter::Debug),
            ("robot_lib::tm", LevelFilter::Debug),
        ],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("GEMINI Robot Executable\n");
    info!(
        "Running on: {}",
        host::get_hostname().unwrap_or_else(|| String::from("<unknown host>"))
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let exec_params: RobotExecParams =
        util::params::load("robot_exec.toml").wrap_err("Could not load exec params")?;
    let robot_params = RobotParams::load(exec_params.cycle_period_s)
        .wrap_err("Could not load module params")?;

    info!("Exec parameters loaded");

    // Keep a copy of the parameters this run used
    session.save("robot_exec_params.json", exec_params.clone());

    // ---- INITIALISE SCRIPT ----

    let mut script = match opt.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si: ScriptInterpreter<SimEvent> =
                ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} events\n",
                si.get_duration(),
                si.get_num_events()
            );

            Some(si)
        }
        None => {
            info!("No script provided, operator inputs stay at rest\n");
            None
        }
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let sim = SimRobot::new();
    let mut hw = sim.hardware();

    let mut robot = Robot::new(robot_params).wrap_err("Failed to initialise the robot")?;

    let mut tm = MultiPublisher::new();
    tm.add(LogPublisher::new(
        (exec_params.tm_log_period_s / exec_params.cycle_period_s).round() as u64,
    ));
    if exec_params.archive_tm {
        tm.add(ArchivePublisher::new(&session).wrap_err("Failed to initialise the TM archive")?);
    }

    robot.set_mode(opt.mode.unwrap_or(exec_params.starting_mode), &mut hw);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        if let Some(max) = opt.max_cycles {
            if robot.ds.num_cycles >= max {
                info!("Cycle limit of {} reached, stopping", max);
                break;
            }
        }

        // ---- SCRIPT PROCESSING ----

        if let Some(ref mut si) = script {
            let script_time_s = robot.ds.num_cycles as f64 * exec_params.cycle_period_s;

            match si.get_pending_events(script_time_s) {
                PendingEvents::None => (),
                PendingEvents::Some(events) => {
                    for event in events {
                        debug!("Script event: {:?}", event);
                        if let Some(mode) = sim.apply_event(event) {
                            robot.set_mode(mode, &mut hw);
                        }
                    }
                }
                // Exit if end of script reached
                PendingEvents::EndOfScript => {
                    info!("End of script reached, stopping");
                    break;
                }
            }
        }

        // ---- ROBOT PROCESSING ----

        robot.tick(&mut hw, &mut tm);

        // ---- SIMULATION ----

        sim.step(exec_params.cycle_period_s);

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                robot.ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                robot.ds.num_consec_cycle_overruns += 1;

                if robot.ds.num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns {
                    raise_error!(
                        "More than {} consecutive cycle overruns!",
                        exec_params.max_consec_cycle_overruns
                    );
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    robot.set_mode(RobotMode::Disabled, &mut hw);

    info!("End of execution");

    session.exit();

    Ok(())
}
