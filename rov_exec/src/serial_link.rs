//! # Serial Link Module
//!
//! This module owns the byte-oriented serial connection to the
//! motion-control microcontroller. Telegrams are written to it verbatim, and
//! any bytes the firmware sends back are drained opportunistically as
//! diagnostic text.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::info;
use serialport::{ClearBuffer, SerialPort};

// Internal
use crate::params::RovExecParams;
use std::io::{Read, Write};
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The relay's view of the serial peer.
pub trait SerialPeer {
    /// Write raw telegram bytes to the peer.
    fn forward(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Read all currently buffered inbound bytes, appending them to `out`.
    ///
    /// Returns the number of bytes read. Must not wait for bytes that are
    /// not already buffered.
    fn drain(&mut self, out: &mut Vec<u8>) -> std::io::Result<usize>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The physical serial connection to the microcontroller.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`SerialLink`]
#[derive(Debug, thiserror::Error)]
pub enum SerialLinkError {
    #[error("Could not open serial device {0}: {1}")]
    OpenError(String, serialport::Error),

    #[error("Could not configure the serial device: {0}")]
    ConfigError(serialport::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SerialLink {
    /// Open the serial connection to the microcontroller.
    ///
    /// The DTR line doubles as the microcontroller's auto-reset trigger, so
    /// it is deasserted on open and a settle delay is observed before the
    /// stale input buffer is cleared. Skipping either step leaves the
    /// firmware mid-reset or the link full of boot noise.
    pub fn open(params: &RovExecParams) -> Result<Self, SerialLinkError> {
        let mut port = serialport::new(params.serial_device.as_str(), params.serial_baud)
            .timeout(Duration::from_millis(params.serial_timeout_ms))
            .open()
            .map_err(|e| SerialLinkError::OpenError(params.serial_device.clone(), e))?;

        port.write_data_terminal_ready(false)
            .map_err(SerialLinkError::ConfigError)?;

        std::thread::sleep(Duration::from_secs_f64(params.serial_settle_s));

        port.clear(ClearBuffer::Input)
            .map_err(SerialLinkError::ConfigError)?;

        info!(
            "Serial link open on {} at {} baud",
            params.serial_device,
            params.serial_baud
        );

        Ok(Self { port })
    }
}

impl SerialPeer for SerialLink {
    fn forward(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn drain(&mut self, out: &mut Vec<u8>) -> std::io::Result<usize> {
        let mut total = 0;

        loop {
            let available = self
                .port
                .bytes_to_read()
                .map_err(std::io::Error::from)? as usize;

            if available == 0 {
                break;
            }

            let mut buf = vec![0u8; available];
            let read = self.port.read(&mut buf)?;

            if read == 0 {
                break;
            }

            out.extend_from_slice(&buf[..read]);
            total += read;
        }

        Ok(total)
    }
}
