//! # Gamepad Acquisition Module
//!
//! Reads raw absolute-axis events from the controller's evdev node and turns
//! them into [`AxisSample`] batches. One batch corresponds to one burst of
//! events from the device and marks one input-processing cycle for the
//! caller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use evdev::{AbsoluteAxisCode, Device, EventType};
use log::info;

// Internal
use crate::axis_ctrl::{Axis, AxisSample};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Sleep between polls of the device while no events are available.
const POLL_SLEEP: Duration = Duration::from_millis(5);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A handle on the physical controller.
pub struct Gamepad {
    device: Device,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the [`Gamepad`]
#[derive(Debug, thiserror::Error)]
pub enum GamepadError {
    #[error("Could not open gamepad device {0}: {1}")]
    OpenError(String, std::io::Error),

    #[error("Could not configure the gamepad device: {0}")]
    ConfigError(std::io::Error),

    #[error("Could not read events from the gamepad: {0}")]
    ReadError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Gamepad {
    /// Open the controller's evdev node.
    pub fn open(device_path: &str) -> Result<Self, GamepadError> {
        let mut device = Device::open(device_path)
            .map_err(|e| GamepadError::OpenError(device_path.into(), e))?;

        // Nonblocking so the wait for events can also observe the shutdown
        // flag
        device
            .set_nonblocking(true)
            .map_err(GamepadError::ConfigError)?;

        info!(
            "Gamepad opened: {} ({})",
            device.name().unwrap_or("<unnamed device>"),
            device_path
        );

        Ok(Self { device })
    }

    /// Wait for the next batch of events and return the axis samples in it.
    ///
    /// Blocks (in bounded polls) until the device produces at least one
    /// event. Returns `Ok(None)` if shutdown was requested during the wait.
    /// The returned batch may be empty when the burst contained no
    /// absolute-axis events, the caller still treats that as a completed
    /// input cycle.
    pub fn next_batch(
        &mut self,
        shutdown: &AtomicBool
    ) -> Result<Option<Vec<AxisSample>>, GamepadError> {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                return Ok(None);
            }

            match self.device.fetch_events() {
                Ok(events) => {
                    let mut samples = Vec::new();
                    let mut num_events = 0;

                    for event in events {
                        num_events += 1;

                        if event.event_type() == EventType::ABSOLUTE {
                            if let Some(axis) = axis_from_code(event.code()) {
                                samples.push(AxisSample {
                                    axis,
                                    raw: event.value(),
                                });
                            }
                        }
                    }

                    if num_events > 0 {
                        return Ok(Some(samples));
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => (),
                Err(e) => return Err(GamepadError::ReadError(e)),
            }

            thread::sleep(POLL_SLEEP);
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Map an evdev absolute-axis code to a controller axis.
///
/// Unmapped codes (hats, misc axes) are ignored by the caller.
fn axis_from_code(code: u16) -> Option<Axis> {
    if code == AbsoluteAxisCode::ABS_X.0 {
        Some(Axis::Lx)
    }
    else if code == AbsoluteAxisCode::ABS_Y.0 {
        Some(Axis::Ly)
    }
    else if code == AbsoluteAxisCode::ABS_RX.0 {
        Some(Axis::Rx)
    }
    else if code == AbsoluteAxisCode::ABS_RY.0 {
        Some(Axis::Ry)
    }
    else if code == AbsoluteAxisCode::ABS_Z.0 {
        Some(Axis::Lt)
    }
    else if code == AbsoluteAxisCode::ABS_RZ.0 {
        Some(Axis::Rt)
    }
    else {
        None
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_mapping() {
        assert_eq!(axis_from_code(AbsoluteAxisCode::ABS_X.0), Some(Axis::Lx));
        assert_eq!(axis_from_code(AbsoluteAxisCode::ABS_Y.0), Some(Axis::Ly));
        assert_eq!(axis_from_code(AbsoluteAxisCode::ABS_RX.0), Some(Axis::Rx));
        assert_eq!(axis_from_code(AbsoluteAxisCode::ABS_RY.0), Some(Axis::Ry));
        assert_eq!(axis_from_code(AbsoluteAxisCode::ABS_Z.0), Some(Axis::Lt));
        assert_eq!(axis_from_code(AbsoluteAxisCode::ABS_RZ.0), Some(Axis::Rt));

        // Hat axes are not part of the control mapping
        assert_eq!(axis_from_code(AbsoluteAxisCode::ABS_HAT0X.0), None);
    }
}
