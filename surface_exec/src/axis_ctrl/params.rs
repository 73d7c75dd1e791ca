//! Parameters structure for AxisCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for axis control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Normalised stick magnitude at or below which the axis value is forced
    /// to exactly zero.
    ///
    /// Must be in `[0, 1)`. Applied to stick axes only.
    pub stick_deadzone: f64,

    /// The controller profile in use.
    pub profile: Profile,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Supported controller profiles.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// A controller reporting stick axes in the signed 16-bit range
    /// `[-32768, 32767]` and triggers in `[0, 255]`.
    Standard,

    /// A controller reporting stick axes in an unsigned 8-bit range centred
    /// at 127. Stick readings are remapped into the signed 16-bit domain
    /// before normalisation, trigger readings are unchanged.
    EightBit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Profile {
    fn default() -> Self {
        Profile::Standard
    }
}
