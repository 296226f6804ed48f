//! Error types for codec operations.

use std::fmt;

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding measurement blocks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Wire format error.
    #[error("wire error: {0}")]
    Wire(#[from] wire::DecodeError),

    /// Bitstream error.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] bitstream::BitError),

    /// A code outside the range valid for the current decode stage.
    ///
    /// The stream is desynchronized from this point on; the caller should
    /// reset both ends rather than skip the block.
    #[error("protocol corruption: {stage} stage received code {code} at byte {position}")]
    ProtocolCorruption {
        stage: DecodeStage,
        code: u8,
        position: usize,
    },

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A block window that does not fit its backing buffer.
    #[error("block window {offset}+{length} exceeds buffer of {buffer_len} bytes")]
    BufferRange {
        offset: usize,
        length: usize,
        buffer_len: usize,
    },

    /// Output buffer is too small.
    #[error("output too small: need {needed}, have {available}")]
    OutputTooSmall { needed: usize, available: usize },

    /// Block sequence number differs from the expected one.
    #[error("block out of sequence: expected {expected}, received {received}")]
    OutOfSequence { expected: u16, received: u16 },
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Points,
}

/// The decode stage that rejected a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Expecting a timestamp code or anything after it.
    Timestamp,
    /// Expecting a quality code or anything after it.
    Quality,
    /// Expecting a value code.
    Value,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Points => "point table",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timestamp => "timestamp",
            Self::Quality => "quality",
            Self::Value => "value",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_corruption_display() {
        let err = CodecError::ProtocolCorruption {
            stage: DecodeStage::Quality,
            code: 3,
            position: 17,
        };
        let msg = err.to_string();
        assert!(msg.contains("quality"));
        assert!(msg.contains("code 3"));
        assert!(msg.contains("17"));
    }

    #[test]
    fn limits_exceeded_display() {
        let err = CodecError::LimitsExceeded {
            kind: LimitKind::Points,
            limit: 16,
            actual: 43,
        };
        let msg = err.to_string();
        assert!(msg.contains("point table"));
        assert!(msg.contains("43"));
    }

    #[test]
    fn bit_errors_convert() {
        let err: CodecError = bitstream::BitError::UnexpectedEof {
            requested: 8,
            available: 0,
        }
        .into();
        assert!(matches!(err, CodecError::Bitstream(_)));
        assert!(err.to_string().starts_with("bitstream error"));
    }

    #[test]
    fn wire_errors_convert() {
        let err: CodecError = wire::DecodeError::UnsupportedVersion { found: 1 }.into();
        assert!(matches!(err, CodecError::Wire(_)));
    }

    #[test]
    fn out_of_sequence_display() {
        let err = CodecError::OutOfSequence {
            expected: 4,
            received: 6,
        };
        assert_eq!(
            err.to_string(),
            "block out of sequence: expected 4, received 6"
        );
    }
}
