//! Error types for wire format operations.

use std::fmt;

use thiserror::Error;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Decode errors for block framing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Block is too small to contain the frame header.
    #[error("block too small: {actual} bytes, need at least {required}")]
    BlockTooSmall { actual: usize, required: usize },

    /// Unsupported frame version byte.
    #[error("unsupported block version: {found}")]
    UnsupportedVersion { found: u8 },

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    BlockBytes,
}

/// Errors that can occur during encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("buffer too small: need {needed}, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BlockBytes => "block bytes",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display_version() {
        let err = DecodeError::UnsupportedVersion { found: 0x2A };
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn decode_error_display_limits_exceeded() {
        let err = DecodeError::LimitsExceeded {
            kind: LimitKind::BlockBytes,
            limit: 4,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("block bytes"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn encode_error_display() {
        let err = EncodeError::BufferTooSmall {
            needed: 10,
            available: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("buffer too small"));
    }
}
