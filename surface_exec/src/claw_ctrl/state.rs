//! Implementations for the ClawCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{ClawCtrlError, Params};
use util::{
    maths::clamp,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Claw position after executable start, the midpoint of the travel range.
///
/// The integrator state does not survive a restart of the executable, so the
/// claw setpoint always begins here.
pub const DEFAULT_CLAW_POS: f64 = 0.5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Claw control module state
pub struct ClawCtrl {
    pub(crate) params: Params,

    /// Current claw position setpoint, always in `[0, 1]`
    position: f64,

    /// Timestamp of the last processing cycle, `None` before the first one.
    ///
    /// Units: seconds (of the caller's clock)
    last_update_s: Option<f64>,
}

/// Input data to claw control.
pub struct ClawInput {
    /// Right trigger value in `[0, 1]`, drives the claw open
    pub rt: f64,

    /// Left trigger value in `[0, 1]`, drives the claw closed
    pub lt: f64,

    /// The current time.
    ///
    /// Units: seconds, any epoch, must be the same clock every cycle
    pub now_s: f64,
}

/// Status report for ClawCtrl processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// Time integrated over this cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Whether the position changed this cycle
    pub moving: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ClawCtrl {
    fn default() -> Self {
        Self {
            params: Params::default(),
            position: DEFAULT_CLAW_POS,
            last_update_s: None,
        }
    }
}

impl State for ClawCtrl {
    type InitData = &'static str;
    type InitError = ClawCtrlError;

    type InputData = ClawInput;
    type OutputData = f64;
    type StatusReport = StatusReport;
    type ProcError = ClawCtrlError;

    /// Initialise the ClawCtrl module.
    ///
    /// Expected init data is the name of the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)?;

        if self.params.rate <= 0.0 {
            return Err(ClawCtrlError::InvalidRate(self.params.rate));
        }

        Ok(())
    }

    /// Integrate the trigger inputs over the time since the last cycle.
    ///
    /// The timestamp is advanced unconditionally, even when the position is
    /// unchanged or `dt` is zero, so that idle cycles can never accumulate
    /// into one large step.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // A clock that steps backward must not un-integrate
        let dt_s = match self.last_update_s {
            Some(last_s) => (input_data.now_s - last_s).max(0.0),
            None => 0.0,
        };

        self.last_update_s = Some(input_data.now_s);

        let rt = suppress(input_data.rt, self.params.trigger_deadzone);
        let lt = suppress(input_data.lt, self.params.trigger_deadzone);

        let delta = (rt - lt) * self.params.rate * dt_s;

        self.position = clamp(&(self.position + delta), &0.0, &1.0);

        let report = StatusReport {
            dt_s,
            moving: delta != 0.0,
        };

        Ok((self.position, report))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Treat trigger values at or below the threshold as exactly zero.
fn suppress(trigger: f64, threshold: f64) -> f64 {
    if trigger <= threshold {
        0.0
    }
    else {
        trigger
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a ClawCtrl without going through parameter file loading.
    fn claw_ctrl() -> ClawCtrl {
        let mut ctrl = ClawCtrl::default();
        ctrl.params = Params {
            rate: 0.5,
            trigger_deadzone: 0.05,
        };
        ctrl
    }

    #[test]
    fn test_position_starts_at_midpoint() {
        let mut ctrl = claw_ctrl();

        let (pos, _) = ctrl
            .proc(&ClawInput { rt: 0.0, lt: 0.0, now_s: 0.0 })
            .unwrap();
        assert_eq!(pos, DEFAULT_CLAW_POS);
    }

    #[test]
    fn test_idle_cycles_advance_the_timestamp_only() {
        let mut ctrl = claw_ctrl();

        ctrl.proc(&ClawInput { rt: 0.0, lt: 0.0, now_s: 0.0 }).unwrap();

        let (pos, report) = ctrl
            .proc(&ClawInput { rt: 0.0, lt: 0.0, now_s: 10.0 })
            .unwrap();
        assert_eq!(pos, DEFAULT_CLAW_POS);
        assert_eq!(report.dt_s, 10.0);
        assert!(!report.moving);

        // The timestamp moved even though the position did not
        let (_, report) = ctrl
            .proc(&ClawInput { rt: 0.0, lt: 0.0, now_s: 11.0 })
            .unwrap();
        assert_eq!(report.dt_s, 1.0);
    }

    #[test]
    fn test_right_trigger_integrates_open() {
        let mut ctrl = claw_ctrl();

        ctrl.proc(&ClawInput { rt: 1.0, lt: 0.0, now_s: 0.0 }).unwrap();

        // 0.5 rate over 0.4 s moves the position by 0.2
        let (pos, report) = ctrl
            .proc(&ClawInput { rt: 1.0, lt: 0.0, now_s: 0.4 })
            .unwrap();
        assert!((pos - 0.7).abs() < 1e-9);
        assert!(report.moving);
    }

    #[test]
    fn test_position_saturates_at_full_open() {
        let mut ctrl = claw_ctrl();

        ctrl.proc(&ClawInput { rt: 1.0, lt: 0.0, now_s: 0.0 }).unwrap();

        // Far longer than needed to reach the end of travel
        let (pos, _) = ctrl
            .proc(&ClawInput { rt: 1.0, lt: 0.0, now_s: 60.0 })
            .unwrap();
        assert_eq!(pos, 1.0);

        // Continuing to drive it must not exceed the limit
        let (pos, _) = ctrl
            .proc(&ClawInput { rt: 1.0, lt: 0.0, now_s: 120.0 })
            .unwrap();
        assert_eq!(pos, 1.0);
    }

    #[test]
    fn test_position_saturates_at_full_closed() {
        let mut ctrl = claw_ctrl();

        ctrl.proc(&ClawInput { rt: 0.0, lt: 1.0, now_s: 0.0 }).unwrap();

        let (pos, _) = ctrl
            .proc(&ClawInput { rt: 0.0, lt: 1.0, now_s: 60.0 })
            .unwrap();
        assert_eq!(pos, 0.0);
    }

    #[test]
    fn test_backward_clock_step_is_ignored() {
        let mut ctrl = claw_ctrl();

        ctrl.proc(&ClawInput { rt: 1.0, lt: 0.0, now_s: 10.0 }).unwrap();

        // The clock stepping backward yields dt 0, no motion
        let (pos, report) = ctrl
            .proc(&ClawInput { rt: 1.0, lt: 0.0, now_s: 5.0 })
            .unwrap();
        assert_eq!(pos, DEFAULT_CLAW_POS);
        assert_eq!(report.dt_s, 0.0);

        // The timestamp was still advanced to the new value
        let (_, report) = ctrl
            .proc(&ClawInput { rt: 0.0, lt: 0.0, now_s: 6.0 })
            .unwrap();
        assert_eq!(report.dt_s, 1.0);
    }

    #[test]
    fn test_trigger_noise_below_deadzone_causes_no_drift() {
        let mut ctrl = claw_ctrl();

        ctrl.proc(&ClawInput { rt: 0.04, lt: 0.0, now_s: 0.0 }).unwrap();

        let (pos, report) = ctrl
            .proc(&ClawInput { rt: 0.04, lt: 0.0, now_s: 100.0 })
            .unwrap();
        assert_eq!(pos, DEFAULT_CLAW_POS);
        assert!(!report.moving);
    }

    #[test]
    fn test_opposed_triggers_cancel() {
        let mut ctrl = claw_ctrl();

        ctrl.proc(&ClawInput { rt: 1.0, lt: 1.0, now_s: 0.0 }).unwrap();

        let (pos, _) = ctrl
            .proc(&ClawInput { rt: 1.0, lt: 1.0, now_s: 10.0 })
            .unwrap();
        assert_eq!(pos, DEFAULT_CLAW_POS);
    }
}
