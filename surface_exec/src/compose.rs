//! Control vector composition

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::telegram::ControlVector;

use crate::axis_ctrl::AxisValues;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Assemble the latest axis values, claw position and calibration flag into
/// one control vector.
///
/// Pure snapshot, run once per input-processing cycle after AxisCtrl and
/// ClawCtrl have been updated.
pub fn compose(axes: &AxisValues, claw_pos: f64, calibrate: bool) -> ControlVector {
    ControlVector {
        surge: axes.ly,
        sway: axes.lx,
        yaw: axes.rx,
        heave: axes.ry,
        claw_pos,
        calibrate,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_to_demand_mapping() {
        let axes = AxisValues {
            lx: 0.1,
            ly: 0.2,
            rx: 0.3,
            ry: 0.4,
            lt: 0.0,
            rt: 0.0,
        };

        let vector = compose(&axes, 0.75, true);

        // Left stick drives translation, right stick drives yaw and heave
        assert_eq!(vector.surge, 0.2);
        assert_eq!(vector.sway, 0.1);
        assert_eq!(vector.yaw, 0.3);
        assert_eq!(vector.heave, 0.4);
        assert_eq!(vector.claw_pos, 0.75);
        assert!(vector.calibrate);
    }
}
