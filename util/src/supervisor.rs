//! # External Process Supervisor
//!
//! Supervises an opaque child process, restarting it when it unexpectedly
//! exits. The supervisor knows nothing about what the child does, only the
//! command line used to launch it. Health is checked on a fixed interval
//! rather than every call to [`Supervisor::poll`] to bound the overhead of
//! supervision in tight loops.
//!
//! There is deliberately no restart cap or backoff, a persistently failing
//! child is restarted indefinitely.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{info, warn};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Supervisor over a single child process.
pub struct Supervisor {
    /// The program to launch
    program: String,

    /// Arguments passed to the program
    args: Vec<String>,

    /// Interval between health checks of the child
    check_interval: Duration,

    /// Handle to the running child, `None` if not started or stopped
    child: Option<Child>,

    /// Time of the last health check
    last_check: Instant,

    /// Number of times the child has been restarted after dying
    num_restarts: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur in the [`Supervisor`]
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Could not spawn child process \"{0}\": {1}")]
    SpawnError(String, std::io::Error),
}

/// Outcome of a call to [`Supervisor::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The health check interval has not yet elapsed, no check was made
    Skipped,

    /// The child was checked and found to be running
    Alive,

    /// The child was found dead and a new one was started in its place
    Restarted,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Supervisor {
    /// Create a new supervisor for the given command line.
    ///
    /// The child is not launched until [`Supervisor::start`] is called.
    pub fn new<S: Into<String>>(
        program: S,
        args: Vec<String>,
        check_interval: Duration
    ) -> Self {
        Self {
            program: program.into(),
            args,
            check_interval,
            child: None,
            last_check: Instant::now(),
            num_restarts: 0,
        }
    }

    /// Launch the child process, stopping any previously owned child first.
    ///
    /// The child's stdout and stderr are discarded so that it can never stall
    /// on a full output buffer.
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        // A still-running previous child must not be leaked
        self.stop();

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SupervisorError::SpawnError(self.program.clone(), e))?;

        info!(
            "Started \"{}\" (pid {})",
            self.program,
            child.id()
        );

        self.child = Some(child);
        self.last_check = Instant::now();

        Ok(())
    }

    /// Check whether the owned child process is currently running.
    pub fn is_alive(&mut self) -> bool {
        match self.child {
            Some(ref mut child) => match child.try_wait() {
                // No exit status yet, still running
                Ok(None) => true,
                Ok(Some(_)) => false,
                Err(e) => {
                    warn!("Could not query child process state: {}", e);
                    false
                }
            },
            None => false,
        }
    }

    /// Perform an interval-gated health check, restarting the child if it has
    /// exited.
    ///
    /// If the check interval has not elapsed since the last check this
    /// returns immediately with [`PollOutcome::Skipped`].
    pub fn poll(&mut self) -> Result<PollOutcome, SupervisorError> {
        if self.last_check.elapsed() < self.check_interval {
            return Ok(PollOutcome::Skipped);
        }

        self.last_check = Instant::now();

        if self.is_alive() {
            return Ok(PollOutcome::Alive);
        }

        self.num_restarts += 1;

        warn!(
            "Child process \"{}\" has exited, restarting (restart {})",
            self.program,
            self.num_restarts
        );

        self.start()?;

        Ok(PollOutcome::Restarted)
    }

    /// Request termination of the child process.
    ///
    /// Errors during termination are swallowed, and calling this on an
    /// already stopped supervisor is a no-op.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // The child may already have exited, in which case kill fails
            // harmlessly. The wait reaps the process entry.
            child.kill().ok();
            child.wait().ok();

            info!("Stopped \"{}\"", self.program);
        }
    }

    /// Get the OS process ID of the owned child, if one is running.
    pub fn child_id(&self) -> Option<u32> {
        self.child.as_ref().map(|c| c.id())
    }

    /// Get the number of restarts performed so far.
    pub fn num_restarts(&self) -> u64 {
        self.num_restarts
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_start_and_stop() {
        let mut sup = Supervisor::new(
            "sleep",
            vec![String::from("60")],
            Duration::from_secs(5)
        );

        sup.start().unwrap();
        assert!(sup.is_alive());
        assert!(sup.child_id().is_some());

        sup.stop();
        assert!(!sup.is_alive());
        assert!(sup.child_id().is_none());

        // Stopping twice must not panic
        sup.stop();
    }

    #[test]
    fn test_dead_child_is_restarted() {
        // `true` exits immediately, so the first real poll must restart it
        let mut sup = Supervisor::new(
            "true",
            vec![],
            Duration::from_millis(0)
        );

        sup.start().unwrap();
        let first_id = sup.child_id().unwrap();

        // Give the child time to exit
        let mut restarted = false;
        for _ in 0..100 {
            if sup.poll().unwrap() == PollOutcome::Restarted {
                restarted = true;
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert!(restarted);
        assert!(sup.num_restarts() >= 1);

        // The replacement handle must be distinct from the old one
        assert_ne!(sup.child_id().unwrap(), first_id);

        sup.stop();
    }

    #[test]
    fn test_poll_is_interval_gated() {
        let mut sup = Supervisor::new(
            "sleep",
            vec![String::from("60")],
            Duration::from_secs(3600)
        );

        sup.start().unwrap();

        // Immediately after start the interval cannot have elapsed
        assert_eq!(sup.poll().unwrap(), PollOutcome::Skipped);

        sup.stop();
    }
}
