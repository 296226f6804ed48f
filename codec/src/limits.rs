//! Limits for codec-level encoding and decoding.

/// Bytes that must remain in a block window before a measurement is accepted.
///
/// The worst-case encoding of one tuple (five code prefixes, a 32-bit point
/// id XOR, a nine-byte timestamp varint, a five-byte quality varint and a
/// 32-bit value XOR) fits well inside this margin, so an accepted measurement
/// can never overflow the window.
pub const MEASUREMENT_HEADROOM: usize = 100;

/// Codec-specific limits enforced by both the encoder and the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum number of point ids; ids at or above this value are rejected.
    pub max_points: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_points: 1 << 20,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self { max_points: 4096 }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_points: usize::MAX,
        }
    }
}
