//! # Surface Station Executable
//!
//! This executable is the operator's side of the teleoperation link:
//!
//!     - Read raw controller events from the gamepad
//!     - Normalise and deadzone-shape them into axis values (AxisCtrl)
//!     - Integrate the triggers into the claw position setpoint (ClawCtrl)
//!     - Compose the control vector and send it to the vehicle as one UDP
//!       telegram per input cycle
//!     - Supervise the video display pipeline and, on demand, the record
//!       pipeline
//!
//! Operator interaction happens on a small console prompt (`help` lists the
//! commands) which runs on its own thread and never blocks the input path.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Normalises raw controller samples into shaped axis values.
mod axis_ctrl;

/// Integrates the triggers into the claw position setpoint.
mod claw_ctrl;

/// Control vector composition.
mod compose;

/// Operator console prompt.
mod console;

/// Gamepad event acquisition.
mod gamepad;

/// Parameters for the surface executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, trace, warn};

// Internal
use axis_ctrl::AxisCtrl;
use claw_ctrl::{ClawCtrl, ClawInput};
use compose::compose;
use comms_if::{
    net::{NetParams, TelegramSender},
    telegram::ControlVector,
    video::{self, VideoParams},
};
use console::ConsoleCommand;
use gamepad::Gamepad;
use params::SurfaceExecParams;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
    supervisor::{PollOutcome, Supervisor},
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "surface_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Surface Station Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let exec_params: SurfaceExecParams = util::params::load("surface_exec.toml")
        .wrap_err("Could not load surface_exec params")?;
    let net_params: NetParams = util::params::load("net.toml")
        .wrap_err("Could not load net params")?;
    let video_params: VideoParams = util::params::load("video.toml")
        .wrap_err("Could not load video params")?;

    info!("Parameters loaded");

    // ---- INITIALISE MODULES ----

    let mut axis_ctrl = AxisCtrl::default();
    axis_ctrl.init("axis_ctrl.toml", &session)
        .wrap_err("Failed to initialise AxisCtrl")?;
    info!("AxisCtrl init complete");

    let mut claw_ctrl = ClawCtrl::default();
    claw_ctrl.init("claw_ctrl.toml", &session)
        .wrap_err("Failed to initialise ClawCtrl")?;
    info!("ClawCtrl init complete");

    // ---- INITIALISE NETWORK ----

    let sender = TelegramSender::new(&net_params)
        .wrap_err("Failed to initialise the telegram sender")?;
    info!("Telegram sender initialised, vehicle endpoint is {}",
        net_params.telegram_dest_addr);

    // ---- SHUTDOWN FLAG ----

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || shutdown.store(true, Ordering::Relaxed))
            .wrap_err("Failed to install the shutdown handler")?;
    }

    // ---- VIDEO PIPELINES ----

    let check_interval = Duration::from_secs_f64(video_params.check_interval_s);

    let display_cmd = video::display_command(&video_params);
    let mut display = Supervisor::new(
        display_cmd.program,
        display_cmd.args,
        check_interval
    );
    display.start().wrap_err("Failed to start the video display pipeline")?;
    info!("Video display pipeline started");

    // Record pipeline exists only while the operator has recording enabled
    let mut record: Option<Supervisor> = None;

    // ---- OPERATOR CONSOLE ----

    let console_rx = console::spawn(shutdown.clone());

    // ---- GAMEPAD ----

    let mut gamepad = Gamepad::open(&exec_params.gamepad_device)
        .wrap_err("Failed to open the gamepad")?;

    info!("Initialisation complete, entering main loop\n");

    // ---- MAIN LOOP ----

    let mut calibrate = false;
    let mut last_vector: Option<ControlVector> = None;
    let mut last_status_s = 0.0;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        // ---- CONSOLE COMMANDS ----

        process_console_commands(
            &console_rx,
            &shutdown,
            &mut calibrate,
            &mut record,
            &mut display,
            &video_params,
            check_interval,
            &last_vector,
        );

        // ---- INPUT ACQUISITION ----

        let batch = match gamepad.next_batch(&shutdown) {
            Ok(Some(b)) => b,
            // Shutdown was requested during the wait
            Ok(None) => continue,
            Err(e) => {
                warn!("Gamepad read error: {}", e);
                std::thread::sleep(Duration::from_millis(100));
                continue;
            }
        };

        // ---- CONTROL PROCESSING ----

        let (axes, axis_report) = match axis_ctrl.proc(&batch) {
            Ok(x) => x,
            Err(e) => {
                warn!("Error during AxisCtrl processing: {}", e);
                continue;
            }
        };

        trace!("Pre-deadzone axis values: {:?}", axis_report.pre_deadzone);

        let claw_input = ClawInput {
            rt: axes.rt,
            lt: axes.lt,
            now_s: session::get_elapsed_seconds(),
        };
        let (claw_pos, claw_report) = match claw_ctrl.proc(&claw_input) {
            Ok(x) => x,
            Err(e) => {
                warn!("Error during ClawCtrl processing: {}", e);
                continue;
            }
        };

        if claw_report.moving {
            trace!("Claw moving, position {:.3} (dt {:.4} s)", claw_pos, claw_report.dt_s);
        }

        let vector = compose(&axes, claw_pos, calibrate);

        // ---- TELEGRAM SEND ----

        // Best effort, a lost telegram is superseded by the next cycle's
        match sender.send(vector.encode().as_bytes()) {
            Ok(_) => (),
            Err(e) => warn!("Could not send telegram: {}", e)
        }

        last_vector = Some(vector);

        // ---- VIDEO SUPERVISION ----

        // The display pipeline is paused while recording, so only supervise
        // whichever of the two currently owns the video port
        match record {
            Some(ref mut rec) => match rec.poll() {
                Ok(PollOutcome::Restarted) => info!("Record pipeline restarted"),
                Ok(_) => (),
                Err(e) => warn!("Record pipeline supervision error: {}", e)
            },
            None => match display.poll() {
                Ok(PollOutcome::Restarted) => info!("Display pipeline restarted"),
                Ok(_) => (),
                Err(e) => warn!("Display pipeline supervision error: {}", e)
            }
        }

        // ---- STATUS ----

        let now_s = session::get_elapsed_seconds();
        if now_s - last_status_s > exec_params.status_interval_s {
            info!(
                "surge {:+.3} sway {:+.3} yaw {:+.3} heave {:+.3} claw {:.3} cal {} rec {}",
                vector.surge,
                vector.sway,
                vector.yaw,
                vector.heave,
                vector.claw_pos,
                calibrate,
                record.is_some()
            );
            last_status_s = now_s;
        }
    }

    // ---- SHUTDOWN ----

    info!("Shutting down");

    if let Some(mut rec) = record.take() {
        rec.stop();
    }
    display.stop();

    info!("End of execution");

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Drain and execute all pending operator commands without blocking.
fn process_console_commands(
    console_rx: &Receiver<ConsoleCommand>,
    shutdown: &AtomicBool,
    calibrate: &mut bool,
    record: &mut Option<Supervisor>,
    display: &mut Supervisor,
    video_params: &VideoParams,
    check_interval: Duration,
    last_vector: &Option<ControlVector>,
) {
    loop {
        match console_rx.try_recv() {
            Ok(ConsoleCommand::ToggleCalibrate) => {
                *calibrate = !*calibrate;
                info!(
                    "Calibration flag {}",
                    if *calibrate { "set" } else { "cleared" }
                );
            }
            Ok(ConsoleCommand::ToggleRecord) => {
                toggle_record(record, display, video_params, check_interval);
            }
            Ok(ConsoleCommand::Status) => match last_vector {
                Some(v) => info!("Latest control vector: {:?}", v),
                None => info!("No control vector sent yet"),
            },
            Ok(ConsoleCommand::Quit) => {
                shutdown.store(true, Ordering::Relaxed);
                break;
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }
}

/// Start or stop the record pipeline.
///
/// The record and display pipelines bind the same video port, so the display
/// is stopped for the duration of a recording and brought back afterwards.
fn toggle_record(
    record: &mut Option<Supervisor>,
    display: &mut Supervisor,
    video_params: &VideoParams,
    check_interval: Duration,
) {
    match record.take() {
        Some(mut rec) => {
            rec.stop();
            info!("Recording stopped");

            match display.start() {
                Ok(_) => info!("Display pipeline resumed"),
                Err(e) => warn!("Could not resume the display pipeline: {}", e)
            }
        }
        None => {
            display.stop();

            let cmd = video::record_command(video_params);
            let mut rec = Supervisor::new(cmd.program, cmd.args, check_interval);

            match rec.start() {
                Ok(_) => {
                    info!("Recording to {}", video_params.record_file);
                    *record = Some(rec);
                }
                Err(e) => {
                    warn!("Could not start the record pipeline: {}", e);

                    // Recording never began, put the display back
                    match display.start() {
                        Ok(_) => info!("Display pipeline resumed"),
                        Err(e) => warn!("Could not resume the display pipeline: {}", e)
                    }
                }
            }
        }
    }
}
