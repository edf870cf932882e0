//! Serial transport to the earbud case.
//!
//! The case's RFCOMM channel is bound to a serial device node before this
//! tool runs (for example with `rfcomm bind`). Reads happen in a blocking
//! poll loop with a short per-read timeout; the device bursts its replies,
//! so accumulation stops once the channel has stayed quiet for a bounded
//! interval.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use crate::error::CliError;

/// Per-read poll timeout configured on the port.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

const READ_CHUNK: usize = 1024;

/// A blocking serial connection to the case.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open the serial device bound to the case.
    pub fn open(path: &str, baud: u32) -> Result<Self, CliError> {
        let port = serialport::new(path, baud)
            .timeout(POLL_INTERVAL)
            .open()
            .map_err(|source| CliError::SerialOpen {
                port: path.to_string(),
                source,
            })?;
        tracing::debug!(port = path, baud, "serial device open");
        Ok(SerialTransport { port })
    }

    /// Write bytes to the case.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), CliError> {
        tracing::trace!("tx {}", hex::encode(bytes));
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    /// Accumulate received bytes until the channel has been idle for
    /// `quiet`, or until `deadline` elapses.
    ///
    /// Poll timeouts and zero-length reads count as idle ticks, not errors.
    /// Returns whatever arrived, possibly nothing.
    pub fn receive_all(&mut self, quiet: Duration, deadline: Duration) -> Result<Vec<u8>, CliError> {
        let start = Instant::now();
        let mut last_data = Instant::now();
        let mut out = Vec::new();
        let mut buf = [0u8; READ_CHUNK];

        while start.elapsed() < deadline {
            if !out.is_empty() && last_data.elapsed() >= quiet {
                break;
            }
            match self.port.read(&mut buf) {
                Ok(0) => {}
                Ok(n) => {
                    out.extend_from_slice(&buf[..n]);
                    last_data = Instant::now();
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => return Err(e.into()),
            }
        }

        tracing::trace!("rx {}", hex::encode(&out));
        Ok(out)
    }
}
