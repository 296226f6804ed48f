//! Block sequence numbers.

use std::fmt;

/// 16-bit block sequence number carried in every frame header.
///
/// Zero is reserved for the first block after a reset; incrementing past
/// `u16::MAX` wraps to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SequenceNumber(u16);

impl SequenceNumber {
    /// Sequence number of the first block after a reset.
    pub const INITIAL: Self = Self(0);

    /// Creates a sequence number from its raw value.
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns `true` for the post-reset sequence number.
    #[must_use]
    pub const fn is_initial(self) -> bool {
        self.0 == 0
    }

    /// Returns the following sequence number, skipping zero on wrap.
    #[must_use]
    pub const fn next(self) -> Self {
        match self.0.wrapping_add(1) {
            0 => Self(1),
            n => Self(n),
        }
    }
}

impl From<u16> for SequenceNumber {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<SequenceNumber> for u16 {
    fn from(seq: SequenceNumber) -> Self {
        seq.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_is_zero() {
        assert!(SequenceNumber::INITIAL.is_initial());
        assert_eq!(SequenceNumber::default(), SequenceNumber::INITIAL);
    }

    #[test]
    fn next_increments() {
        assert_eq!(SequenceNumber::new(0).next().raw(), 1);
        assert_eq!(SequenceNumber::new(41).next().raw(), 42);
    }

    #[test]
    fn next_skips_zero_on_wrap() {
        let seq = SequenceNumber::new(u16::MAX).next();
        assert_eq!(seq.raw(), 1);
        assert!(!seq.is_initial());
    }

    #[test]
    fn conversions() {
        let seq: SequenceNumber = 7u16.into();
        assert_eq!(u16::from(seq), 7);
        assert_eq!(seq.to_string(), "7");
    }
}
