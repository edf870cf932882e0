//! CLI error type.

use budlink_protocol::EncodeError;
use thiserror::Error;

/// Errors that end a CLI invocation.
#[derive(Error, Debug)]
pub enum CliError {
    /// The serial device could not be opened.
    #[error("failed to open {port}: {source}")]
    SerialOpen {
        /// Device path that was attempted.
        port: String,
        /// Underlying serial error.
        source: serialport::Error,
    },

    /// Reading from or writing to the open port failed.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A message could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A command-line value did not parse.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The interrupt handler for `watch` could not be installed.
    #[error("failed to install interrupt handler: {0}")]
    Interrupt(#[from] ctrlc::Error),
}
