//! Sampled content fingerprints for pixel data.

use crate::buffer::pixel::PixelBuffer;
use crate::foundation::math::{FNV_OFFSET_BASIS, FNV_PRIME, bit_reverse};

/// Number of bytes [`content_hash`] samples.
pub const SAMPLE_SIZE: u64 = 256;

/// Cheap 64-bit fingerprint of a byte slice.
///
/// Samples 256 bytes at Van der Corput positions and folds them FNV-1 style, so the cost does
/// not grow with the input. Reads past the end (only possible for empty input) count as zero.
pub fn content_hash(bytes: &[u8]) -> u64 {
    let size = bytes.len() as f64;
    let scale = u64::MAX as f64 + 1.0;
    let mut h = FNV_OFFSET_BASIS;
    for i in 1..=SAMPLE_SIZE {
        let j = bit_reverse(i) as f64 / scale;
        let k = (j * size) as usize;
        h = h.wrapping_mul(FNV_PRIME);
        h ^= u64::from(bytes.get(k).copied().unwrap_or(0));
    }
    h
}

/// [`content_hash`] over a buffer's raw bytes.
pub fn buffer_hash(buf: &PixelBuffer) -> u64 {
    content_hash(buf.as_bytes())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/hash.rs"]
mod tests;
