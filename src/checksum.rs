//! CRC-8 frame checksum.
//!
//! Polynomial `x^8 + x^2 + x + 1` (0x07), seed 0, no input or output reflection,
//! no final xor. This is the catalogued CRC-8/SMBUS algorithm.

use crc::{CRC_8_SMBUS, Crc};

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Computes the checksum of `data`.
///
/// Every call starts from the seed, so no state carries over between frames.
#[inline]
#[must_use]
pub fn checksum(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}
