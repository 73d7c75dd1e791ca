//! Parameters for the surface station executable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the surface executable, loaded from `surface_exec.toml`.
#[derive(Debug, Deserialize)]
pub struct SurfaceExecParams {
    /// The controller's evdev node, e.g. `/dev/input/event0`
    pub gamepad_device: String,

    /// Interval between periodic status lines in the log.
    ///
    /// Units: seconds
    pub status_interval_s: f64,
}
