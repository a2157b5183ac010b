//! MSB-first bit cursor over byte buffers
//!
//! Fields on the wire are big-endian and not always byte sized (some are
//! nibbles), so the engine reads and writes by bit count.

/// Reads big-endian bit fields from a byte slice
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Start reading at the first bit of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bits not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    /// Current bit offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read `bits` (0..=64) as an unsigned value.
    ///
    /// Returns `None` without consuming anything when fewer bits remain or
    /// the width does not fit a `u64`.
    pub fn read(&mut self, bits: usize) -> Option<u64> {
        if bits > 64 || bits > self.remaining() {
            return None;
        }

        let mut value = 0u64;
        let mut left = bits;
        while left > 0 {
            let byte = self.data[self.pos / 8];
            let offset = self.pos % 8;
            let take = (8 - offset).min(left);
            let shift = 8 - offset - take;
            let chunk = (u64::from(byte) >> shift) & ((1u64 << take) - 1);
            value = (value << take) | chunk;
            self.pos += take;
            left -= take;
        }
        Some(value)
    }

    /// Read `bits` as a two's complement signed value
    pub fn read_signed(&mut self, bits: usize) -> Option<i64> {
        let raw = self.read(bits)?;
        Some(sign_extend(raw, bits))
    }

    /// Read `count` whole bytes (need not be byte aligned)
    pub fn read_bytes(&mut self, count: usize) -> Option<Vec<u8>> {
        let bits = count.checked_mul(8)?;
        if bits > self.remaining() {
            return None;
        }
        if self.pos % 8 == 0 {
            let start = self.pos / 8;
            self.pos += bits;
            return Some(self.data[start..start + count].to_vec());
        }
        (0..count)
            .map(|_| self.read(8).map(|b| b as u8))
            .collect()
    }
}

/// Writes big-endian bit fields into a growing buffer
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    pos: usize,
}

impl BitWriter {
    /// Empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty writer with room for `bytes`
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            pos: 0,
        }
    }

    /// Bits written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Write the low `bits` of `value`; bits above the 64th are zero
    pub fn write(&mut self, value: u64, bits: usize) {
        let mut left = bits;
        while left > 0 {
            if self.pos % 8 == 0 {
                self.buf.push(0);
            }
            let offset = self.pos % 8;
            let take = (8 - offset).min(left);
            let chunk = u32::try_from(left - take)
                .ok()
                .and_then(|shift| value.checked_shr(shift))
                .unwrap_or(0)
                & ((1u64 << take) - 1);
            let shift = 8 - offset - take;
            if let Some(last) = self.buf.last_mut() {
                *last |= (chunk as u8) << shift;
            }
            self.pos += take;
            left -= take;
        }
    }

    /// Write whole bytes
    pub fn write_bytes(&mut self, data: &[u8]) {
        if self.pos % 8 == 0 {
            self.buf.extend_from_slice(data);
            self.pos += data.len() * 8;
        } else {
            for &byte in data {
                self.write(u64::from(byte), 8);
            }
        }
    }

    /// Finish, padding a partial last byte with zero bits
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Interpret the low `bits` of `raw` as two's complement
fn sign_extend(raw: u64, bits: usize) -> i64 {
    if bits == 0 {
        return 0;
    }
    if bits >= 64 {
        return raw as i64;
    }
    let sign = 1u64 << (bits - 1);
    if raw & sign != 0 {
        (raw | !((1u64 << bits) - 1)) as i64
    } else {
        raw as i64
    }
}
