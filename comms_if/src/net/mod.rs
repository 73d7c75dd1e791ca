//! # Network Module
//!
//! This module provides the UDP transport used to carry telegrams from the
//! surface station to the vehicle.
//!
//! The transport is deliberately connectionless, unordered and
//! unacknowledged. Teleoperation control is a streaming-setpoint protocol, a
//! lost telegram is superseded within one control cycle by the next, so
//! reliability machinery would add latency for no benefit.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::time::Duration;

use log::debug;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Size of the receive buffer for a single telegram.
///
/// Telegrams are far smaller than this, anything longer is truncated by the
/// receive call.
pub const TELEGRAM_BUF_SIZE: usize = 1024;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters shared by both executables, loaded from `net.toml`.
#[derive(Debug, Deserialize)]
pub struct NetParams {
    /// Address (IP and port) of the vehicle's telegram endpoint, used by the
    /// surface station as the send destination.
    pub telegram_dest_addr: String,

    /// Address the vehicle binds its telegram endpoint to.
    pub telegram_bind_addr: String,

    /// Upper bound on the time a single receive call may block.
    ///
    /// Units: milliseconds
    pub recv_timeout_ms: u64,
}

/// Fire-only sender for telegrams.
///
/// Each send is a single datagram to the configured vehicle endpoint, with no
/// retry, sequencing or delivery confirmation.
pub struct TelegramSender {
    socket: UdpSocket,
    dest_addr: String,
}

/// Bounded-wait receiver for telegrams on the vehicle.
pub struct TelegramReceiver {
    socket: UdpSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the telegram transport.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Could not create the socket: {0}")]
    SocketCreateError(std::io::Error),

    #[error("Could not bind to {0}: {1}")]
    BindError(String, std::io::Error),

    #[error("Could not configure the socket: {0}")]
    SocketConfigError(std::io::Error),

    #[error("Could not send the telegram: {0}")]
    SendError(std::io::Error),

    #[error("Could not receive from the socket: {0}")]
    RecvError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TelegramSender {
    /// Create a new sender targeting the vehicle endpoint in `params`.
    pub fn new(params: &NetParams) -> Result<Self, NetError> {
        // Bind to an ephemeral local port, the peer never replies on this
        // socket
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(NetError::SocketCreateError)?;

        Ok(Self {
            socket,
            dest_addr: params.telegram_dest_addr.clone(),
        })
    }

    /// Send one telegram, best effort.
    pub fn send(&self, telegram: &[u8]) -> Result<(), NetError> {
        self.socket
            .send_to(telegram, self.dest_addr.as_str())
            .map_err(NetError::SendError)?;

        Ok(())
    }
}

impl TelegramReceiver {
    /// Bind the vehicle's telegram endpoint.
    ///
    /// Receive calls are bounded by `params.recv_timeout_ms` so that the
    /// relay loop is never starved by a silent link.
    pub fn new(params: &NetParams) -> Result<Self, NetError> {
        let socket = UdpSocket::bind(params.telegram_bind_addr.as_str())
            .map_err(|e| NetError::BindError(params.telegram_bind_addr.clone(), e))?;

        socket
            .set_read_timeout(Some(Duration::from_millis(params.recv_timeout_ms)))
            .map_err(NetError::SocketConfigError)?;

        debug!("Telegram receiver bound to {}", params.telegram_bind_addr);

        Ok(Self { socket })
    }

    /// Receive at most one datagram into `buf`.
    ///
    /// Returns `Ok(None)` if nothing arrived within the receive timeout.
    /// Timeouts are expected and are not an error condition.
    pub fn recv(&self, buf: &mut [u8]) -> Result<Option<usize>, NetError> {
        match self.socket.recv_from(buf) {
            Ok((len, _src)) => Ok(Some(len)),
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Ok(None)
            }
            Err(e) => Err(NetError::RecvError(e)),
        }
    }

    /// Get the local address the receiver is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_params() -> NetParams {
        NetParams {
            telegram_dest_addr: String::new(),
            telegram_bind_addr: String::from("127.0.0.1:0"),
            recv_timeout_ms: 20,
        }
    }

    #[test]
    fn test_send_and_receive() {
        let mut params = loopback_params();

        let receiver = TelegramReceiver::new(&params).unwrap();
        params.telegram_dest_addr = receiver.local_addr().unwrap().to_string();

        let sender = TelegramSender::new(&params).unwrap();
        sender.send(b"SURGE 0.000\n").unwrap();

        let mut buf = [0u8; TELEGRAM_BUF_SIZE];
        let mut received = None;

        // Loopback delivery is fast but not instantaneous
        for _ in 0..50 {
            if let Some(len) = receiver.recv(&mut buf).unwrap() {
                received = Some(len);
                break;
            }
        }

        let len = received.expect("datagram was not delivered");
        assert_eq!(&buf[..len], b"SURGE 0.000\n");
    }

    #[test]
    fn test_recv_timeout_is_not_an_error() {
        let params = loopback_params();
        let receiver = TelegramReceiver::new(&params).unwrap();

        let mut buf = [0u8; TELEGRAM_BUF_SIZE];
        assert!(receiver.recv(&mut buf).unwrap().is_none());
    }
}
