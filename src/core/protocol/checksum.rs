//! Frame checksum
//!
//! The receiver protects every payload with a single XOR byte. A frame is
//! intact when the XOR of its payload and the transmitted checksum is zero.

/// XOR of all bytes
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Verify a payload against its transmitted checksum byte
pub fn verify(payload: &[u8], checksum: u8) -> bool {
    xor_checksum(payload) ^ checksum == 0
}
