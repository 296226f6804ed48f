//! Configurable limits for bounded decoding.

/// Wire-level limits for block decoding.
///
/// Enforced before a block reaches the codec, so a transport handing over an
/// oversized frame is rejected without touching decoder state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum framed block size in bytes, header included.
    pub max_block_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Comfortably above a UDP datagram or a typical TCP payload.
            max_block_bytes: 64 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_block_bytes: 4096,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_block_bytes: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_block_bytes() {
        assert_eq!(Limits::default().max_block_bytes, 64 * 1024);
    }

    #[test]
    fn testing_limits_smaller() {
        assert!(Limits::for_testing().max_block_bytes < Limits::default().max_block_bytes);
    }

    #[test]
    fn unlimited_limits() {
        assert_eq!(Limits::unlimited().max_block_bytes, usize::MAX);
    }
}
