//! Wire protocol
//!
//! Provides the framing layer of the receiver's binary protocol:
//! - XOR checksum
//! - Frame encoding for outbound commands
//! - Streaming frame decoder with resynchronization

pub mod checksum;
pub mod framing;

pub use framing::{encode_frame, Frame, FrameDecoder, FrameError, FrameStats, DEFAULT_MAX_BUFFER};

/// Start-of-frame marker
pub const PREAMBLE: [u8; 2] = [0xA0, 0xA1];

/// End-of-frame marker
pub const TRAILER: [u8; 2] = [0x0D, 0x0A];

/// Message id of an acknowledgement
pub const ACK_ID: u8 = 0x83;

/// Message id of a negative acknowledgement
pub const NACK_ID: u8 = 0x84;

/// Preamble plus length field
pub const HEADER_LEN: usize = 4;

/// Bytes a frame adds around its payload (preamble, length, checksum, trailer)
pub const FRAME_OVERHEAD: usize = HEADER_LEN + 1 + TRAILER.len();

/// Smallest possible frame: a payload holding only the message id
pub const MIN_FRAME_LEN: usize = FRAME_OVERHEAD + 1;

/// Largest payload the 16-bit length field can describe
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;
