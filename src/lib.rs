//! # NavSpark Core Library
//!
//! Binary protocol stack for NavSpark / SkyTraq GNSS receivers:
//! - Frame encoding and a streaming, resynchronizing frame decoder
//! - A declarative message catalog compiled into a validated codec registry
//! - Typed messages with closed enumerations and open flag sets
//! - A reassembler delivering decoded messages over a bounded channel
//! - An async link sending commands and awaiting ACK/NACK
//! - Serial port transport
//!
//! ## Example
//!
//! ```rust,no_run
//! use navspark_core::{Link, LinkConfig, QuerySoftwareVersion, SerialConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let port = navspark_core::core::transport::open(&SerialConfig::new("/dev/ttyUSB0", 115200))?;
//!     let (link, mut messages) = Link::spawn(port, &LinkConfig::default())?;
//!
//!     let ack = link.send_command(&QuerySoftwareVersion::default().into()).await?;
//!     println!("{}", ack);
//!
//!     while let Some(message) = messages.recv().await {
//!         println!("{:?}", message);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{CliError, ExitCodes};
pub use crate::config::{AppConfig, LoggingConfig};
pub use crate::core::codec::{CodecError, Direction, FieldDef, FieldSet, Layout, LayoutError, MessageDescriptor, Value};
pub use crate::core::link::{Link, LinkConfig, LinkError};
pub use crate::core::messages::*;
pub use crate::core::protocol::{encode_frame, Frame, FrameDecoder, FrameError};
pub use crate::core::reassembler::{Acknowledgement, MessageReceiver, Reassembler, ReassemblerStats};
pub use crate::core::registry::Registry;
pub use crate::core::transport::{SerialConfig, SerialFlowControl, SerialParity, TransportError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
