//! Block framing: version byte and sequence number ahead of the payload.

use crate::error::{DecodeError, EncodeError, LimitKind, WireResult};
use crate::limits::Limits;
use crate::sequence::SequenceNumber;

/// Frame version byte identifying a TSSC block.
pub const VERSION: u8 = 85;

/// Frame header size in bytes: version plus big-endian sequence number.
pub const HEADER_SIZE: usize = 1 + 2;

/// Header preceding every compressed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Frame version byte.
    pub version: u8,
    /// Sequence number of this block.
    pub sequence: SequenceNumber,
}

impl BlockHeader {
    /// Creates a header at the current version.
    #[must_use]
    pub const fn new(sequence: SequenceNumber) -> Self {
        Self {
            version: VERSION,
            sequence,
        }
    }
}

/// A decoded block frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireBlock<'a> {
    /// Frame header.
    pub header: BlockHeader,
    /// Compressed payload following the header.
    pub payload: &'a [u8],
}

/// Writes `header` to the front of `out`, returning the bytes written.
pub fn encode_header(header: &BlockHeader, out: &mut [u8]) -> Result<usize, EncodeError> {
    if out.len() < HEADER_SIZE {
        return Err(EncodeError::BufferTooSmall {
            needed: HEADER_SIZE,
            available: out.len(),
        });
    }
    out[0] = header.version;
    out[1..HEADER_SIZE].copy_from_slice(&header.sequence.raw().to_be_bytes());
    Ok(HEADER_SIZE)
}

/// Splits a framed block into its header and payload.
pub fn decode_block<'a>(buf: &'a [u8], limits: &Limits) -> WireResult<WireBlock<'a>> {
    if buf.len() < HEADER_SIZE {
        return Err(DecodeError::BlockTooSmall {
            actual: buf.len(),
            required: HEADER_SIZE,
        });
    }
    if buf.len() > limits.max_block_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::BlockBytes,
            limit: limits.max_block_bytes,
            actual: buf.len(),
        });
    }

    let version = buf[0];
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }
    let sequence = SequenceNumber::new(u16::from_be_bytes([buf[1], buf[2]]));

    Ok(WireBlock {
        header: BlockHeader { version, sequence },
        payload: &buf[HEADER_SIZE..],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let mut buf = [0u8; 4];
        let written = encode_header(&BlockHeader::new(SequenceNumber::new(0x1234)), &mut buf).unwrap();
        assert_eq!(written, HEADER_SIZE);
        assert_eq!(buf, [85, 0x12, 0x34, 0]);
    }

    #[test]
    fn encode_header_too_small() {
        let mut buf = [0u8; 2];
        let err = encode_header(&BlockHeader::new(SequenceNumber::INITIAL), &mut buf).unwrap_err();
        assert_eq!(
            err,
            EncodeError::BufferTooSmall {
                needed: 3,
                available: 2
            }
        );
    }

    #[test]
    fn decode_roundtrip() {
        let buf = [85, 0x00, 0x07, 0xAA, 0xBB];
        let block = decode_block(&buf, &Limits::default()).unwrap();
        assert_eq!(block.header, BlockHeader::new(SequenceNumber::new(7)));
        assert_eq!(block.payload, &[0xAA, 0xBB]);
    }

    #[test]
    fn decode_header_only() {
        let block = decode_block(&[85, 0, 0], &Limits::default()).unwrap();
        assert!(block.header.sequence.is_initial());
        assert!(block.payload.is_empty());
    }

    #[test]
    fn decode_too_small() {
        let err = decode_block(&[85, 0], &Limits::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::BlockTooSmall {
                actual: 2,
                required: 3
            }
        );
    }

    #[test]
    fn decode_wrong_version() {
        let err = decode_block(&[84, 0, 1], &Limits::default()).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedVersion { found: 84 });
    }

    #[test]
    fn decode_limits_exceeded() {
        let limits = Limits { max_block_bytes: 4 };
        let err = decode_block(&[85, 0, 1, 0, 0], &limits).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LimitsExceeded {
                kind: LimitKind::BlockBytes,
                limit: 4,
                actual: 5
            }
        ));
    }
}
