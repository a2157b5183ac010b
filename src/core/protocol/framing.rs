//! Frame encoding and streaming reassembly
//!
//! ```text
//! offset  size  field
//! 0       2     preamble 0xA0 0xA1
//! 2       2     payload length L (big-endian, includes the message id)
//! 4       L     payload: message id followed by the message body
//! 4+L     1     XOR of all payload bytes
//! 5+L     2     trailer 0x0D 0x0A
//! ```

use super::checksum;
use super::{FRAME_OVERHEAD, HEADER_LEN, MAX_PAYLOAD_LEN, MIN_FRAME_LEN, PREAMBLE, TRAILER};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Default bound on buffered bytes while searching for a frame
pub const DEFAULT_MAX_BUFFER: usize = 8 * 1024;

/// Errors building an outbound frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A payload must at least carry the message id
    #[error("Frame payload is empty")]
    EmptyPayload,

    /// Payload does not fit the 16-bit length field
    #[error("Frame payload of {0} bytes exceeds {max} bytes", max = MAX_PAYLOAD_LEN)]
    PayloadTooLarge(usize),
}

/// A checksum-valid frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Message id (first payload byte)
    pub fn message_id(&self) -> u8 {
        self.payload[0]
    }

    /// Payload without the message id
    pub fn body(&self) -> &[u8] {
        &self.payload[1..]
    }

    /// Full payload, message id included
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Size of the frame on the wire
    pub fn wire_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }
}

/// Wrap a payload (message id + body) into a frame
pub fn encode_frame(payload: &[u8]) -> Result<Bytes, FrameError> {
    if payload.is_empty() {
        return Err(FrameError::EmptyPayload);
    }
    let len = u16::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge(payload.len()))?;

    let mut frame = BytesMut::with_capacity(payload.len() + FRAME_OVERHEAD);
    frame.put_slice(&PREAMBLE);
    frame.put_u16(len);
    frame.put_slice(payload);
    frame.put_u8(checksum::xor_checksum(payload));
    frame.put_slice(&TRAILER);
    Ok(frame.freeze())
}

/// Framing counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Valid frames extracted
    pub frames: u64,
    /// Frames dropped on checksum mismatch
    pub checksum_errors: u64,
    /// Candidate headers abandoned (bad length or missing trailer)
    pub resyncs: u64,
    /// Bytes thrown away as noise or as part of rejected frames
    pub bytes_discarded: u64,
}

/// Streaming frame decoder that handles partial data
///
/// Bytes are appended to a rolling buffer; every complete, checksum-valid
/// frame is returned and removed. Partial frames stay buffered verbatim
/// until the rest arrives, wherever the chunk boundary falls.
///
/// The scan is preamble-first and length-aware: after a preamble the
/// declared length fixes where the checksum and trailer must sit. A header
/// whose trailer is not where the length says is abandoned one byte at a
/// time so a spurious preamble inside noise cannot swallow a real frame.
/// A checksum failure discards the whole candidate frame.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
    max_buffer: usize,
    stats: FrameStats,
}

impl FrameDecoder {
    /// Create new decoder
    pub fn new() -> Self {
        Self::with_max_buffer(DEFAULT_MAX_BUFFER)
    }

    /// Create a decoder with a custom bound on buffered bytes
    pub fn with_max_buffer(max_buffer: usize) -> Self {
        let max_buffer = max_buffer.max(MIN_FRAME_LEN);
        Self {
            buffer: BytesMut::with_capacity(max_buffer.min(DEFAULT_MAX_BUFFER)),
            max_buffer,
            stats: FrameStats::default(),
        }
    }

    /// Add data and return complete frames
    pub fn push(&mut self, data: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }

        // Only noise can exceed the bound here: a buffered partial frame is
        // never larger than max_buffer. Keep the last byte, it may be the
        // first half of a preamble.
        if self.buffer.len() > self.max_buffer {
            let excess = self.buffer.len() - 1;
            tracing::warn!(bytes = excess, "No preamble within buffer bound, discarding noise");
            self.discard(excess);
        }

        frames
    }

    /// Bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Framing counters since creation
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    fn next_frame(&mut self) -> Option<Frame> {
        loop {
            if self.buffer.len() < MIN_FRAME_LEN {
                return None;
            }

            let start = find_preamble(&self.buffer)?;
            if start > 0 {
                tracing::debug!(bytes = start, "Skipping bytes ahead of preamble");
                self.discard(start);
                continue;
            }

            let len = usize::from(u16::from_be_bytes([self.buffer[2], self.buffer[3]]));
            if len == 0 {
                tracing::debug!("Zero payload length, resynchronizing");
                self.resync();
                continue;
            }

            let total = len + FRAME_OVERHEAD;
            if total > self.max_buffer {
                tracing::debug!(len, "Declared payload length exceeds buffer bound, resynchronizing");
                self.resync();
                continue;
            }
            if self.buffer.len() < total {
                return None;
            }

            let checksum_at = HEADER_LEN + len;
            if self.buffer[checksum_at + 1..total] != TRAILER {
                tracing::debug!(len, "Trailer missing at declared length, resynchronizing");
                self.resync();
                continue;
            }

            let mut frame = self.buffer.split_to(total);
            let checksum = frame[checksum_at];
            frame.advance(HEADER_LEN);
            frame.truncate(len);

            if !checksum::verify(&frame, checksum) {
                tracing::warn!(
                    message_id = frame[0],
                    len,
                    "Frame checksum mismatch, dropping frame"
                );
                self.stats.checksum_errors += 1;
                self.stats.bytes_discarded += total as u64;
                continue;
            }

            self.stats.frames += 1;
            return Some(Frame { payload: frame.freeze() });
        }
    }

    fn resync(&mut self) {
        self.stats.resyncs += 1;
        self.discard(1);
    }

    fn discard(&mut self, count: usize) {
        self.buffer.advance(count);
        self.stats.bytes_discarded += count as u64;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn find_preamble(data: &[u8]) -> Option<usize> {
    data.windows(PREAMBLE.len()).position(|w| w == PREAMBLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEASUREMENT_TIME: [u8; 17] = [
        0xA0, 0xA1, 0x00, 0x0A, 0xDC, 0x3D, 0x06, 0xED, 0x0B, 0x0C, 0xBC, 0x40, 0x03, 0xE8, 0x1A,
        0x0D, 0x0A,
    ];

    #[test]
    fn test_encode_frame() {
        let frame = encode_frame(&MEASUREMENT_TIME[4..14]).unwrap();
        assert_eq!(&frame[..], &MEASUREMENT_TIME[..]);

        let ack = encode_frame(&[0x83]).unwrap();
        assert_eq!(&ack[..], &[0xA0, 0xA1, 0x00, 0x01, 0x83, 0x83, 0x0D, 0x0A]);
    }

    #[test]
    fn test_encode_frame_limits() {
        assert_eq!(encode_frame(&[]), Err(FrameError::EmptyPayload));
        let big = vec![0u8; MAX_PAYLOAD_LEN + 1];
        assert_eq!(encode_frame(&big), Err(FrameError::PayloadTooLarge(MAX_PAYLOAD_LEN + 1)));
    }

    #[test]
    fn test_whole_frame() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(&MEASUREMENT_TIME);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_id(), 0xDC);
        assert_eq!(frames[0].body(), &MEASUREMENT_TIME[5..14]);
        assert_eq!(frames[0].wire_len(), MEASUREMENT_TIME.len());
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_split_at_every_offset() {
        for split in 1..MEASUREMENT_TIME.len() {
            let mut decoder = FrameDecoder::new();
            assert!(decoder.push(&MEASUREMENT_TIME[..split]).is_empty(), "split {}", split);
            let frames = decoder.push(&MEASUREMENT_TIME[split..]);
            assert_eq!(frames.len(), 1, "split {}", split);
            assert_eq!(frames[0].message_id(), 0xDC);
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        for byte in MEASUREMENT_TIME.iter().chain(MEASUREMENT_TIME.iter()) {
            frames.extend(decoder.push(&[*byte]));
        }
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_noise_before_preamble() {
        let mut data = vec![0x00, 0xFF, 0xA0, 0x0D, 0x0A];
        data.extend_from_slice(&MEASUREMENT_TIME);
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(decoder.stats().bytes_discarded, 5);
    }

    #[test]
    fn test_checksum_failure_then_valid_frame() {
        let mut corrupted = MEASUREMENT_TIME;
        corrupted[7] ^= 0x40;
        let mut data = corrupted.to_vec();
        data.extend_from_slice(&MEASUREMENT_TIME);

        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].body(), &MEASUREMENT_TIME[5..14]);
        assert_eq!(decoder.stats().checksum_errors, 1);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_spurious_header_does_not_swallow_frame() {
        // A preamble in noise claiming 5 payload bytes, directly followed by a real frame
        let mut data = vec![0xA0, 0xA1, 0x00, 0x05, 0x11];
        data.extend_from_slice(&MEASUREMENT_TIME);

        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_id(), 0xDC);
        assert!(decoder.stats().resyncs >= 1);
    }

    #[test]
    fn test_zero_length_resyncs() {
        let mut data = vec![0xA0, 0xA1, 0x00, 0x00, 0x00, 0x0D, 0x0A];
        data.extend_from_slice(&MEASUREMENT_TIME);
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(&data).len(), 1);
    }

    #[test]
    fn test_incomplete_frame_waits() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(&MEASUREMENT_TIME[..12]).is_empty());
        assert_eq!(decoder.buffered(), 12);
        assert_eq!(decoder.stats(), FrameStats::default());
    }

    #[test]
    fn test_noise_is_bounded() {
        let mut decoder = FrameDecoder::with_max_buffer(64);
        decoder.push(&[0x55; 200]);
        assert!(decoder.buffered() <= 64);

        let mut data = vec![0x55; 10];
        data.push(0xA0);
        decoder.push(&data);
        // The trailing 0xA0 survives and completes a preamble with the next chunk
        let frames = decoder.push(&MEASUREMENT_TIME[1..]);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_oversized_length_resyncs() {
        let mut decoder = FrameDecoder::with_max_buffer(64);
        let mut data = vec![0xA0, 0xA1, 0xFF, 0xFF];
        data.extend_from_slice(&MEASUREMENT_TIME);
        let frames = decoder.push(&data);
        assert_eq!(frames.len(), 1);
    }
}
