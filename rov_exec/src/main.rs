//! # Vehicle Executable
//!
//! This executable runs on the vehicle and bridges the teleoperation link:
//!
//!     - Receive command telegrams on the UDP endpoint
//!     - Forward each telegram verbatim to the motion-control
//!       microcontroller over the serial link
//!     - Relay the firmware's diagnostic text into the operator's log
//!     - Keep the video encode pipeline running, restarting it whenever it
//!       dies
//!
//! Setup faults (bind, serial open, pipeline spawn) are fatal, the relay
//! never enters its loop half-initialised. Once running, per-iteration
//! faults are contained and only an operator shutdown ends the process.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the vehicle executable.
mod params;

/// The UDP to serial relay loop.
mod relay;

/// Serial connection to the motion-control microcontroller.
mod serial_link;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::info;

// Internal
use comms_if::{
    net::{NetParams, TelegramReceiver},
    video::{self, VideoParams},
};
use params::RovExecParams;
use relay::Relay;
use serial_link::SerialLink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
    supervisor::Supervisor,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "rov_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Vehicle Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let exec_params: RovExecParams = util::params::load("rov_exec.toml")
        .wrap_err("Could not load rov_exec params")?;
    let net_params: NetParams = util::params::load("net.toml")
        .wrap_err("Could not load net params")?;
    let video_params: VideoParams = util::params::load("video.toml")
        .wrap_err("Could not load video params")?;

    info!("Parameters loaded");

    // ---- ACQUIRE RESOURCES ----

    let receiver = TelegramReceiver::new(&net_params)
        .wrap_err("Failed to bind the telegram endpoint")?;
    info!("Telegram endpoint bound to {}", net_params.telegram_bind_addr);

    let serial = SerialLink::open(&exec_params)
        .wrap_err("Failed to open the serial link")?;

    let video = match exec_params.video_enabled {
        true => {
            let cmd = video::encode_command(&video_params);
            let mut sup = Supervisor::new(
                cmd.program,
                cmd.args,
                Duration::from_secs_f64(video_params.check_interval_s)
            );
            sup.start().wrap_err("Failed to start the video encode pipeline")?;
            info!("Video encode pipeline started, streaming to {}:{}",
                video_params.stream_host, video_params.stream_port);
            Some(sup)
        }
        false => {
            info!("Video encode pipeline disabled");
            None
        }
    };

    // ---- SHUTDOWN FLAG ----

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || shutdown.store(true, Ordering::Relaxed))
            .wrap_err("Failed to install the shutdown handler")?;
    }

    // ---- MAIN LOOP ----

    info!("Initialisation complete\n");

    let mut relay = Relay::new(receiver, serial, video);
    relay.run(&shutdown);

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
