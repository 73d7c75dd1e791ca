//! Axis control module
//!
//! Normalises raw, device-specific controller samples into shaped axis
//! values. Stick axes land in `[-1, 1]` with a hard deadzone cutoff, trigger
//! axes in `[0, 1]` untouched. The module keeps the last-known value of every
//! axis, axes the device does not report in a given batch keep their
//! previous value.

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
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Physical axes of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left stick, horizontal
    Lx,
    /// Left stick, vertical
    Ly,
    /// Right stick, horizontal
    Rx,
    /// Right stick, vertical
    Ry,
    /// Left trigger
    Lt,
    /// Right trigger
    Rt,
}

/// One raw sample from the controller driver.
#[derive(Debug, Clone, Copy)]
pub struct AxisSample {
    /// The axis the sample belongs to
    pub axis: Axis,

    /// The raw device reading
    pub raw: i32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during AxisCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum AxisCtrlError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Stick deadzone must be in [0, 1), found {0}")]
    InvalidDeadzone(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Axis {
    /// Whether this axis is one of the two analog sticks.
    pub fn is_stick(&self) -> bool {
        matches!(self, Axis::Lx | Axis::Ly | Axis::Rx | Axis::Ry)
    }

    /// Whether this axis is a vertical stick axis.
    ///
    /// Vertical axes are sign-inverted during normalisation so that pushing
    /// the stick up produces a positive value.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Axis::Ly | Axis::Ry)
    }
}
