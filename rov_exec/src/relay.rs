//! # Vehicle Relay Module
//!
//! The relay is the vehicle's half of the command link. It bridges the UDP
//! telegram endpoint to the serial microcontroller and relays the firmware's
//! diagnostic text back into the operator's log, while keeping the video
//! encode pipeline alive.
//!
//! Every step of a loop iteration is bounded (timed-out receive, buffered
//! serial drain, interval-gated health poll) so the command path is never
//! starved by the slower diagnostic or video concerns. Faults inside one
//! iteration are logged and contained, only the shutdown flag ends the
//! relay.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use comms_if::net::{TelegramReceiver, TELEGRAM_BUF_SIZE};
use log::{debug, info, warn};

// Internal
use crate::serial_link::SerialPeer;
use std::sync::atomic::{AtomicBool, Ordering};
use util::supervisor::{PollOutcome, Supervisor};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The vehicle-side relay.
pub struct Relay<S: SerialPeer> {
    receiver: TelegramReceiver,

    serial: S,

    /// Supervisor over the video encode pipeline, `None` when video is
    /// disabled in the parameters
    video: Option<Supervisor>,

    state: RelayState,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Lifecycle states of the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Resources acquired but the loop has not begun
    Starting,

    /// The main loop is processing
    Running,

    /// Shutdown requested, resources being released
    Stopping,

    /// All resources released
    Stopped,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<S: SerialPeer> Relay<S> {
    /// Create a new relay from already-acquired resources.
    ///
    /// Acquisition failures (bind, serial open, pipeline spawn) are fatal
    /// and belong to the caller, the relay itself never runs
    /// half-initialised.
    pub fn new(
        receiver: TelegramReceiver,
        serial: S,
        video: Option<Supervisor>
    ) -> Self {
        Self {
            receiver,
            serial,
            video,
            state: RelayState::Starting,
        }
    }

    /// Run the relay until the shutdown flag is raised.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        self.state = RelayState::Running;
        info!("Relay running");

        let mut buf = [0u8; TELEGRAM_BUF_SIZE];

        while !shutdown.load(Ordering::Relaxed) {
            self.step(&mut buf);
        }

        self.shutdown();
    }

    /// Perform one bounded relay iteration.
    fn step(&mut self, buf: &mut [u8; TELEGRAM_BUF_SIZE]) {
        // ---- TELEGRAM FORWARDING ----

        match self.receiver.recv(buf) {
            Ok(Some(len)) => {
                debug!(
                    "Received telegram: {:?}",
                    String::from_utf8_lossy(&buf[..len])
                );

                // Forwarded verbatim, the firmware owns the grammar
                if let Err(e) = self.serial.forward(&buf[..len]) {
                    warn!("Could not forward telegram to the serial peer: {}", e);
                }
            }
            // No telegram pending, expected on a quiet link
            Ok(None) => (),
            Err(e) => warn!("Telegram receive error: {}", e)
        }

        // ---- FIRMWARE DIAGNOSTICS ----

        let mut diag = Vec::new();
        match self.serial.drain(&mut diag) {
            Ok(0) => (),
            Ok(_) => {
                // Decode errors are replaced, diagnostic text is never
                // allowed to take the relay down
                for line in String::from_utf8_lossy(&diag).lines() {
                    info!("[firmware] {}", line);
                }
            }
            Err(e) => warn!("Serial read error: {}", e)
        }

        // ---- VIDEO SUPERVISION ----

        if let Some(ref mut video) = self.video {
            match video.poll() {
                Ok(PollOutcome::Restarted) => info!("Video encode pipeline restarted"),
                Ok(_) => (),
                Err(e) => warn!("Video pipeline supervision error: {}", e)
            }
        }
    }

    /// Release all owned resources.
    ///
    /// Idempotent, a second call is a no-op. The socket and serial handle
    /// are closed when the relay is dropped.
    pub fn shutdown(&mut self) {
        if self.state == RelayState::Stopped {
            return;
        }

        self.state = RelayState::Stopping;
        info!("Relay stopping");

        if let Some(mut video) = self.video.take() {
            video.stop();
        }

        self.state = RelayState::Stopped;
        info!("Relay stopped");
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use comms_if::net::NetParams;
    use std::net::UdpSocket;

    /// A serial peer that records what the relay does to it.
    struct MockSerial {
        written: Vec<u8>,
        inbound: Vec<u8>,
    }

    impl MockSerial {
        fn new() -> Self {
            Self {
                written: Vec::new(),
                inbound: Vec::new(),
            }
        }
    }

    impl SerialPeer for MockSerial {
        fn forward(&mut self, bytes: &[u8]) -> std::io::Result<()> {
            self.written.extend_from_slice(bytes);
            Ok(())
        }

        fn drain(&mut self, out: &mut Vec<u8>) -> std::io::Result<usize> {
            let len = self.inbound.len();
            out.append(&mut self.inbound);
            Ok(len)
        }
    }

    /// Build a relay listening on an ephemeral loopback port, plus a socket
    /// to feed it with.
    fn loopback_relay() -> (Relay<MockSerial>, UdpSocket, std::net::SocketAddr) {
        let params = NetParams {
            telegram_dest_addr: String::new(),
            telegram_bind_addr: String::from("127.0.0.1:0"),
            recv_timeout_ms: 20,
        };

        let receiver = TelegramReceiver::new(&params).unwrap();
        let addr = receiver.local_addr().unwrap();

        let relay = Relay::new(receiver, MockSerial::new(), None);
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();

        (relay, sender, addr)
    }

    #[test]
    fn test_telegrams_are_forwarded_verbatim() {
        let (mut relay, sender, addr) = loopback_relay();

        // Not valid UTF-8, the relay must not care
        let payload: &[u8] = &[0x00, 0xFF, b'S', b'U', b'R', b'G', b'E', 0xC3, b'\n'];
        sender.send_to(payload, addr).unwrap();

        let mut buf = [0u8; TELEGRAM_BUF_SIZE];
        for _ in 0..50 {
            relay.step(&mut buf);
            if !relay.serial.written.is_empty() {
                break;
            }
        }

        assert_eq!(relay.serial.written.as_slice(), payload);
    }

    #[test]
    fn test_quiet_link_steps_do_nothing() {
        let (mut relay, _sender, _addr) = loopback_relay();

        let mut buf = [0u8; TELEGRAM_BUF_SIZE];
        relay.step(&mut buf);

        assert!(relay.serial.written.is_empty());
    }

    #[test]
    fn test_serial_diagnostics_are_drained() {
        let (mut relay, _sender, _addr) = loopback_relay();

        relay.serial.inbound.extend_from_slice(b"IMU OK\n");

        let mut buf = [0u8; TELEGRAM_BUF_SIZE];
        relay.step(&mut buf);

        assert!(relay.serial.inbound.is_empty());
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (mut relay, _sender, _addr) = loopback_relay();

        relay.shutdown();
        assert_eq!(relay.state, RelayState::Stopped);

        // A second shutdown must not panic or change anything
        relay.shutdown();
        assert_eq!(relay.state, RelayState::Stopped);
    }

    #[test]
    fn test_run_honours_a_raised_shutdown_flag() {
        let (mut relay, _sender, _addr) = loopback_relay();

        let shutdown = AtomicBool::new(true);
        relay.run(&shutdown);

        assert_eq!(relay.state, RelayState::Stopped);
    }
}
