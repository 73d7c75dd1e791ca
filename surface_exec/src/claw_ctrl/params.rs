//! Parameters structure for ClawCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for claw control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Rate at which a fully pressed trigger moves the claw position.
    ///
    /// Units: position units (of the claw's `[0, 1]` travel) per second
    pub rate: f64,

    /// Trigger magnitude at or below which the trigger is treated as
    /// released, suppressing drift from sensor noise at rest.
    pub trigger_deadzone: f64,
}
