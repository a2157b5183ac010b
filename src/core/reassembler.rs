//! Stream reassembler
//!
//! Turns raw receiver bytes into typed [`Message`]s. Frames come out of a
//! [`FrameDecoder`], acknowledgements are published on a watch channel and
//! everything else is decoded through the [`Registry`] and pushed onto a
//! bounded delivery channel.
//!
//! [`Reassembler::feed`] never blocks and never fails. A full delivery
//! channel drops the newest message; bad checksums, unknown type ids and
//! undecodable bodies drop only the frame they belong to.

use crate::core::codec::CodecError;
use crate::core::messages::Message;
use crate::core::protocol::{Frame, FrameDecoder, FrameStats, ACK_ID, NACK_ID};
use crate::core::registry::Registry;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Receiving half of the delivery channel
pub type MessageReceiver = mpsc::Receiver<Message>;

/// Receiving half of the acknowledgement signal
pub type AckReceiver = watch::Receiver<Option<Acknowledgement>>;

/// Receiver response to a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Acknowledgement {
    /// Command accepted, with the echoed command id if present
    Ack(Option<u8>),
    /// Command rejected, with the echoed command id if present
    Nack(Option<u8>),
}

impl Acknowledgement {
    /// Whether the command was accepted
    pub fn is_ack(&self) -> bool {
        matches!(self, Acknowledgement::Ack(_))
    }

    /// Echoed command id
    pub fn message_id(&self) -> Option<u8> {
        match self {
            Acknowledgement::Ack(id) | Acknowledgement::Nack(id) => *id,
        }
    }
}

impl std::fmt::Display for Acknowledgement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (label, id) = match self {
            Acknowledgement::Ack(id) => ("ACK", id),
            Acknowledgement::Nack(id) => ("NACK", id),
        };
        match id {
            Some(id) => write!(f, "{} 0x{:02X}", label, id),
            None => write!(f, "{}", label),
        }
    }
}

/// Reassembly counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReassemblerStats {
    /// Checksum-valid frames
    pub frames: u64,
    /// Messages handed to the delivery channel
    pub delivered: u64,
    /// ACK frames
    pub acks: u64,
    /// NACK frames
    pub nacks: u64,
    /// Frames dropped on checksum mismatch
    pub checksum_errors: u64,
    /// Candidate headers abandoned
    pub resyncs: u64,
    /// Bytes discarded as noise or with rejected frames
    pub bytes_discarded: u64,
    /// Frames with no registered decoder
    pub unknown_types: u64,
    /// Frames whose body failed to decode
    pub decode_errors: u64,
    /// Messages dropped because the channel was full or closed
    pub dropped: u64,
}

impl ReassemblerStats {
    fn absorb(&mut self, framing: FrameStats) {
        self.frames = framing.frames;
        self.checksum_errors = framing.checksum_errors;
        self.resyncs = framing.resyncs;
        self.bytes_discarded = framing.bytes_discarded;
    }
}

/// Byte stream to message reassembler
#[derive(Debug)]
pub struct Reassembler {
    registry: &'static Registry,
    decoder: FrameDecoder,
    messages: mpsc::Sender<Message>,
    acks: watch::Sender<Option<Acknowledgement>>,
    stats: Arc<RwLock<ReassemblerStats>>,
}

impl Reassembler {
    /// Create a reassembler delivering onto existing channels
    pub fn new(
        registry: &'static Registry,
        messages: mpsc::Sender<Message>,
        acks: watch::Sender<Option<Acknowledgement>>,
        max_buffer: usize,
    ) -> Self {
        Self {
            registry,
            decoder: FrameDecoder::with_max_buffer(max_buffer),
            messages,
            acks,
            stats: Arc::new(RwLock::new(ReassemblerStats::default())),
        }
    }

    /// Create a reassembler together with its delivery channel and ack signal
    pub fn channel(
        registry: &'static Registry,
        capacity: usize,
        max_buffer: usize,
    ) -> (Self, MessageReceiver, AckReceiver) {
        let (message_tx, message_rx) = mpsc::channel(capacity.max(1));
        let (ack_tx, ack_rx) = watch::channel(None);
        (Self::new(registry, message_tx, ack_tx, max_buffer), message_rx, ack_rx)
    }

    /// Process a chunk of received bytes
    pub fn feed(&mut self, chunk: &[u8]) {
        let frames = self.decoder.push(chunk);

        let mut delta = ReassemblerStats::default();
        for frame in frames {
            self.dispatch(&frame, &mut delta);
        }

        let mut stats = self.stats.write();
        stats.absorb(self.decoder.stats());
        stats.delivered += delta.delivered;
        stats.acks += delta.acks;
        stats.nacks += delta.nacks;
        stats.unknown_types += delta.unknown_types;
        stats.decode_errors += delta.decode_errors;
        stats.dropped += delta.dropped;
    }

    /// Counters snapshot
    pub fn stats(&self) -> ReassemblerStats {
        *self.stats.read()
    }

    /// Shared handle on the counters
    pub fn shared_stats(&self) -> Arc<RwLock<ReassemblerStats>> {
        Arc::clone(&self.stats)
    }

    /// Bytes waiting for the rest of a frame
    pub fn buffered(&self) -> usize {
        self.decoder.buffered()
    }

    fn dispatch(&self, frame: &Frame, stats: &mut ReassemblerStats) {
        let echoed = frame.body().first().copied();
        match frame.message_id() {
            ACK_ID => {
                tracing::debug!(message_id = ?echoed, "ACK received");
                stats.acks += 1;
                self.acks.send_replace(Some(Acknowledgement::Ack(echoed)));
            }
            NACK_ID => {
                tracing::warn!(message_id = ?echoed, "NACK received");
                stats.nacks += 1;
                self.acks.send_replace(Some(Acknowledgement::Nack(echoed)));
            }
            id => match self.registry.decode(id, frame.body()) {
                Ok(message) => self.deliver(message, stats),
                Err(CodecError::UnknownMessageType(id)) => {
                    tracing::debug!(message_id = id, len = frame.body().len(), "Unknown message type, dropping frame");
                    stats.unknown_types += 1;
                }
                Err(e) => {
                    tracing::warn!(message_id = id, error = %e, "Failed to decode message, dropping frame");
                    stats.decode_errors += 1;
                }
            },
        }
    }

    fn deliver(&self, message: Message, stats: &mut ReassemblerStats) {
        match self.messages.try_send(message) {
            Ok(()) => stats.delivered += 1,
            Err(mpsc::error::TrySendError::Full(message)) => {
                tracing::debug!(message = message.name(), "Delivery channel full, dropping message");
                stats.dropped += 1;
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                tracing::debug!(message = message.name(), "Delivery channel closed, dropping message");
                stats.dropped += 1;
            }
        }
    }
}
