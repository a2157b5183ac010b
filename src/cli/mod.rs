//! CLI Module
//!
//! Provides command-line interface functionality:
//! - Exit codes for automation
//! - Errors specific to CLI workflows

pub mod exit_codes;

pub use exit_codes::{exit_code_description, print_exit_codes, ExitCodes};

use crate::core::reassembler::Acknowledgement;
use std::time::Duration;
use thiserror::Error;

/// CLI workflow errors
#[derive(Error, Debug)]
pub enum CliError {
    /// The receiver answered a command with NACK
    #[error("{command} rejected by receiver ({ack})")]
    Rejected {
        /// Command name
        command: &'static str,
        /// Receiver answer
        ack: Acknowledgement,
    },

    /// The expected reply did not arrive
    #[error("No {expected} reply within {timeout:?}")]
    NoReply {
        /// Expected message name
        expected: &'static str,
        /// Time waited
        timeout: Duration,
    },

    /// Input is not a hex byte string
    #[error("Invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
