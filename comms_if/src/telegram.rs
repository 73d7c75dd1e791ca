//! # Telegram Module
//!
//! This module defines the control vector sent from the surface station to
//! the vehicle and its encoding as a wire telegram.
//!
//! The telegram grammar is a hard contract with the motion-control firmware,
//! which parses fields by name and position. Field order, spelling, casing,
//! separators and the 3 fractional digit precision must never change without
//! a matching firmware update. There is no version marker or checksum.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An atomic snapshot of the operator's demanded vehicle motion.
///
/// One vector is composed per input-processing cycle and has no lifecycle
/// beyond the single telegram encoded from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlVector {
    /// Forward/backward demand, in `[-1, 1]`
    pub surge: f64,

    /// Lateral demand, in `[-1, 1]`
    pub sway: f64,

    /// Rotation demand, in `[-1, 1]`
    pub yaw: f64,

    /// Vertical demand, in `[-1, 1]`
    pub heave: f64,

    /// Claw position setpoint, in `[0, 1]`
    pub claw_pos: f64,

    /// Whether the firmware should run its calibration routine
    pub calibrate: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControlVector {
    /// Encode this vector as a wire telegram.
    ///
    /// The telegram is a single newline-terminated ASCII line with fixed
    /// field order and exactly 3 fractional digits per numeric field.
    pub fn encode(&self) -> String {
        format!(
            "SURGE {:.3} SWAY {:.3} YAW {:.3} HEAVE {:.3} CLAW_POS {:.3} CALIBRATE {}\n",
            self.surge,
            self.sway,
            self.yaw,
            self.heave,
            self.claw_pos,
            self.calibrate as u8
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_exact_grammar() {
        let vector = ControlVector {
            surge: -1.0,
            sway: 0.0,
            yaw: 0.5,
            heave: 0.0,
            claw_pos: 0.333,
            calibrate: true,
        };

        assert_eq!(
            vector.encode(),
            "SURGE -1.000 SWAY 0.000 YAW 0.500 HEAVE 0.000 CLAW_POS 0.333 CALIBRATE 1\n"
        );
    }

    #[test]
    fn test_encode_calibrate_off() {
        let vector = ControlVector {
            surge: 0.0,
            sway: 0.0,
            yaw: 0.0,
            heave: 0.0,
            claw_pos: 0.5,
            calibrate: false,
        };

        assert_eq!(
            vector.encode(),
            "SURGE 0.000 SWAY 0.000 YAW 0.000 HEAVE 0.000 CLAW_POS 0.500 CALIBRATE 0\n"
        );
    }

    #[test]
    fn test_encode_single_trailing_newline() {
        let vector = ControlVector {
            surge: 0.25,
            sway: -0.25,
            yaw: 1.0,
            heave: -1.0,
            claw_pos: 1.0,
            calibrate: false,
        };

        let telegram = vector.encode();

        assert!(telegram.ends_with('\n'));
        assert_eq!(telegram.matches('\n').count(), 1);
        assert!(telegram.is_ascii());
    }
}
