//! CLI Exit Codes
//!
//! Standard exit codes for CLI operations and automation.

use super::CliError;
use crate::config::ConfigError;
use crate::core::codec::{CodecError, LayoutError};
use crate::core::link::LinkError;
use crate::core::transport::TransportError;
use std::process::ExitCode;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments
    pub const INVALID_ARGS: u8 = 2;

    /// Connection failed
    pub const CONNECTION_FAILED: u8 = 3;

    /// No acknowledgement or reply in time
    pub const TIMEOUT: u8 = 4;

    /// Permission denied
    pub const PERMISSION_DENIED: u8 = 7;

    /// Configuration error
    pub const CONFIG_ERROR: u8 = 8;

    /// Protocol error (encode failure, NACK, link closed)
    pub const PROTOCOL_ERROR: u8 = 9;

    /// Port not found
    pub const PORT_NOT_FOUND: u8 = 14;

    /// Internal error (invalid message catalog)
    pub const INTERNAL_ERROR: u8 = 127;

    /// Exit code for an error returned by a CLI command
    pub fn for_error(err: &anyhow::Error) -> u8 {
        if let Some(err) = err.downcast_ref::<TransportError>() {
            return match err {
                TransportError::PortNotFound(_) => Self::PORT_NOT_FOUND,
                TransportError::PermissionDenied(_) => Self::PERMISSION_DENIED,
                TransportError::InvalidConfiguration(_) => Self::CONFIG_ERROR,
                TransportError::ConnectionFailed(_) | TransportError::IoError(_) => Self::CONNECTION_FAILED,
            };
        }
        if let Some(err) = err.downcast_ref::<LinkError>() {
            return match err {
                LinkError::AckTimeout(_) => Self::TIMEOUT,
                LinkError::Io(_) => Self::CONNECTION_FAILED,
                LinkError::Layout(_) => Self::INTERNAL_ERROR,
                LinkError::Codec(_) | LinkError::Frame(_) | LinkError::Closed => Self::PROTOCOL_ERROR,
            };
        }
        if let Some(err) = err.downcast_ref::<CliError>() {
            return match err {
                CliError::Rejected { .. } => Self::PROTOCOL_ERROR,
                CliError::NoReply { .. } => Self::TIMEOUT,
                CliError::InvalidHex(_) => Self::INVALID_ARGS,
            };
        }
        if err.is::<ConfigError>() {
            return Self::CONFIG_ERROR;
        }
        if err.is::<CodecError>() {
            return Self::PROTOCOL_ERROR;
        }
        if err.is::<LayoutError>() {
            return Self::INTERNAL_ERROR;
        }
        Self::ERROR
    }

    /// Convert to a process exit code
    pub fn exit_code(code: u8) -> ExitCode {
        ExitCode::from(code)
    }
}

/// Exit code description
pub fn exit_code_description(code: u8) -> &'static str {
    match code {
        0 => "Success",
        1 => "General error",
        2 => "Invalid arguments",
        3 => "Connection failed",
        4 => "Timeout",
        7 => "Permission denied",
        8 => "Configuration error",
        9 => "Protocol error",
        14 => "Port not found",
        127 => "Internal error",
        _ => "Unknown error",
    }
}

/// Print exit code table
pub fn print_exit_codes() {
    println!("Exit Codes:");
    for code in [0, 1, 2, 3, 4, 7, 8, 9, 14, 127] {
        println!("  {:>3}  {}", code, exit_code_description(code));
    }
}
