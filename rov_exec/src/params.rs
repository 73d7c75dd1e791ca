//! Parameters for the vehicle executable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the vehicle executable, loaded from `rov_exec.toml`.
#[derive(Debug, Deserialize)]
pub struct RovExecParams {
    /// Serial device of the motion-control microcontroller,
    /// e.g. `/dev/ttyACM0`
    pub serial_device: String,

    /// Serial baud rate
    pub serial_baud: u32,

    /// Settle delay observed after deasserting the microcontroller's
    /// auto-reset line, before the stale input buffer is cleared.
    ///
    /// Units: seconds
    pub serial_settle_s: f64,

    /// Upper bound on a single serial I/O call.
    ///
    /// Units: milliseconds
    pub serial_timeout_ms: u64,

    /// Whether the video encode pipeline is started and supervised.
    ///
    /// Disabled for bench testing without a camera.
    pub video_enabled: bool,
}
