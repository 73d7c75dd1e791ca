//! Implementations for the AxisCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Axis, AxisCtrlError, AxisSample, Params, Profile};
use util::{
    maths::clamp,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Axis control module state
#[derive(Default)]
pub struct AxisCtrl {
    pub(crate) params: Params,

    /// Last-known shaped value of every axis
    axes: AxisValues,

    /// Last-known pre-deadzone value of every axis
    report: StatusReport,
}

/// The current normalised value of every controller axis.
///
/// Stick axes are in `[-1, 1]`, trigger axes in `[0, 1]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct AxisValues {
    pub lx: f64,
    pub ly: f64,
    pub rx: f64,
    pub ry: f64,
    pub lt: f64,
    pub rt: f64,
}

/// Status report for AxisCtrl processing.
///
/// Carries the pre-deadzone normalised axis values. These are not used by
/// the control path, they exist so an operator can see how close the sticks
/// sit to the deadzone threshold.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub pre_deadzone: AxisValues,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for AxisCtrl {
    type InitData = &'static str;
    type InitError = AxisCtrlError;

    type InputData = Vec<AxisSample>;
    type OutputData = AxisValues;
    type StatusReport = StatusReport;
    type ProcError = AxisCtrlError;

    /// Initialise the AxisCtrl module.
    ///
    /// Expected init data is the name of the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)?;

        if self.params.stick_deadzone < 0.0 || self.params.stick_deadzone >= 1.0 {
            return Err(AxisCtrlError::InvalidDeadzone(self.params.stick_deadzone));
        }

        Ok(())
    }

    /// Apply a batch of raw samples to the axis state.
    ///
    /// Axes not present in the batch keep their previous value.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        for sample in input_data.iter() {
            let raw = match (self.params.profile, sample.axis.is_stick()) {
                (Profile::EightBit, true) => remap_8bit(sample.raw),
                _ => sample.raw,
            };

            if sample.axis.is_stick() {
                let mut value = norm_stick(raw);

                if sample.axis.is_vertical() {
                    value = -value;
                }

                self.report.pre_deadzone.set(sample.axis, value);
                self.axes.set(
                    sample.axis,
                    shape(value, self.params.stick_deadzone)
                );
            }
            else {
                let value = norm_trigger(raw);

                self.report.pre_deadzone.set(sample.axis, value);
                self.axes.set(sample.axis, value);
            }
        }

        Ok((self.axes, self.report))
    }
}

impl AxisValues {
    /// Set the value of a single axis.
    fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Lx => self.lx = value,
            Axis::Ly => self.ly = value,
            Axis::Rx => self.rx = value,
            Axis::Ry => self.ry = value,
            Axis::Lt => self.lt = value,
            Axis::Rt => self.rt = value,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Normalise a signed 16-bit stick reading into `[-1, 1]`.
fn norm_stick(raw: i32) -> f64 {
    clamp(&(raw as f64 / 32767.0), &-1.0, &1.0)
}

/// Normalise an 8-bit trigger reading into `[0, 1]`.
fn norm_trigger(raw: i32) -> f64 {
    raw as f64 / 255.0
}

/// Apply the hard deadzone cutoff to a normalised stick value.
///
/// Values at or below the threshold become exactly zero, values above it
/// pass through unchanged. There is no rescaling, the output is
/// discontinuous at the threshold.
fn shape(value: f64, deadzone: f64) -> f64 {
    if value.abs() <= deadzone {
        0.0
    }
    else {
        value
    }
}

/// Remap an unsigned 8-bit stick reading centred at 127 into the signed
/// 16-bit domain.
fn remap_8bit(raw: i32) -> i32 {
    ((raw - 127) * 32767) / 128
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an AxisCtrl without going through parameter file loading.
    fn axis_ctrl(stick_deadzone: f64, profile: Profile) -> AxisCtrl {
        let mut ctrl = AxisCtrl::default();
        ctrl.params = Params { stick_deadzone, profile };
        ctrl
    }

    #[test]
    fn test_deadzone_zeros_small_deflections() {
        // 0.15 * 32767 = 4915.05, so 4915 normalises to just below the
        // threshold
        for raw in [0, 100, -100, 4915, -4915].iter() {
            let v = norm_stick(*raw);
            assert!(v.abs() <= 0.15);
            assert_eq!(shape(v, 0.15), 0.0);
        }
    }

    #[test]
    fn test_values_above_deadzone_pass_unchanged() {
        // A hard cutoff, not a rescale
        for raw in [4916, 16384, -16384, 32767, -32768].iter() {
            let v = norm_stick(*raw);
            assert!(v.abs() > 0.15);
            assert_eq!(shape(v, 0.15), v);
        }
    }

    #[test]
    fn test_stick_normalisation_is_clamped() {
        assert_eq!(norm_stick(32767), 1.0);
        // -32768 / 32767 is just beyond -1 and must clamp
        assert_eq!(norm_stick(-32768), -1.0);
    }

    #[test]
    fn test_vertical_axes_are_inverted() {
        let mut ctrl = axis_ctrl(0.15, Profile::Standard);

        let (_, report) = ctrl
            .proc(&vec![AxisSample { axis: Axis::Ly, raw: 16384 }])
            .unwrap();
        assert!(report.pre_deadzone.ly < 0.0);

        let (_, report) = ctrl
            .proc(&vec![AxisSample { axis: Axis::Ly, raw: -16384 }])
            .unwrap();
        assert!(report.pre_deadzone.ly > 0.0);
    }

    #[test]
    fn test_trigger_normalisation() {
        let mut ctrl = axis_ctrl(0.15, Profile::Standard);

        let (axes, _) = ctrl
            .proc(&vec![AxisSample { axis: Axis::Rt, raw: 255 }])
            .unwrap();
        assert_eq!(axes.rt, 1.0);

        let (axes, _) = ctrl
            .proc(&vec![AxisSample { axis: Axis::Rt, raw: 51 }])
            .unwrap();
        assert!((axes.rt - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_triggers_have_no_deadzone() {
        // A large deadzone must not touch trigger values
        let mut ctrl = axis_ctrl(0.9, Profile::Standard);

        let (axes, _) = ctrl
            .proc(&vec![AxisSample { axis: Axis::Lt, raw: 25 }])
            .unwrap();
        assert!(axes.lt > 0.0);
    }

    #[test]
    fn test_axes_keep_last_known_value() {
        let mut ctrl = axis_ctrl(0.15, Profile::Standard);

        let (axes, _) = ctrl
            .proc(&vec![AxisSample { axis: Axis::Lx, raw: 32767 }])
            .unwrap();
        assert_eq!(axes.lx, 1.0);

        // An empty batch leaves every axis untouched
        let (axes, _) = ctrl.proc(&vec![]).unwrap();
        assert_eq!(axes.lx, 1.0);
    }

    #[test]
    fn test_8bit_remap_endpoints() {
        // Midpoint maps to rest, full deflection to full scale
        assert_eq!(remap_8bit(127), 0);
        assert_eq!(remap_8bit(255), 32767);
        assert!(remap_8bit(0) < -32000);
    }

    #[test]
    fn test_8bit_profile_leaves_triggers_unchanged() {
        let mut ctrl = axis_ctrl(0.15, Profile::EightBit);

        let (axes, _) = ctrl
            .proc(&vec![AxisSample { axis: Axis::Rt, raw: 255 }])
            .unwrap();
        assert_eq!(axes.rt, 1.0);
    }

    #[test]
    fn test_8bit_profile_remaps_sticks() {
        let mut ctrl = axis_ctrl(0.15, Profile::EightBit);

        // 255 remaps to full positive deflection
        let (axes, _) = ctrl
            .proc(&vec![AxisSample { axis: Axis::Lx, raw: 255 }])
            .unwrap();
        assert_eq!(axes.lx, 1.0);

        // 127 remaps to rest
        let (axes, _) = ctrl
            .proc(&vec![AxisSample { axis: Axis::Lx, raw: 127 }])
            .unwrap();
        assert_eq!(axes.lx, 0.0);
    }
}
