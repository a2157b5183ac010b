//! Core module containing the receiver protocol stack
//!
//! This module provides:
//! - Wire framing and the XOR checksum
//! - A generic field-layout codec
//! - The typed message catalog and the registry built from it
//! - The stream reassembler and the async link driving it
//! - Serial port transport

pub mod codec;
pub mod link;
pub mod messages;
pub mod protocol;
pub mod reassembler;
pub mod registry;
pub mod transport;
