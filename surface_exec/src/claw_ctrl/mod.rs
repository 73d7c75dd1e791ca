//! Claw control module
//!
//! Converts the two trigger inputs into a continuously-moving claw position
//! setpoint. The position is an open-loop time integral, the right trigger
//! drives the claw open and the left trigger drives it closed at a
//! configured rate, with no feedback from the vehicle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ClawCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ClawCtrlError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Claw rate must be positive, found {0}")]
    InvalidRate(f64),
}
