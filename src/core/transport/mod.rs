//! Transport layer
//!
//! The receiver is reached over a serial port (USB-serial on NavSpark
//! boards). Anything implementing `AsyncRead + AsyncWrite` can stand in
//! for it, which is how the link is tested.

mod serial;

pub use serial::{list_ports, open, PortInfo, SerialConfig, SerialFlowControl, SerialParity};

use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Port not found
    #[error("Port not found: {0}")]
    PortNotFound(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
