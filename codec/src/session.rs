//! Framed encode/decode sessions.
//!
//! A session pairs a codec with the block frame header: the publisher side
//! stamps every block with the encoder's sequence number, and the subscriber
//! side uses those numbers to detect dropped blocks and publisher restarts.

use log::{debug, info, warn};
use wire::{BlockHeader, SequenceNumber, HEADER_SIZE};

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{CodecError, CodecResult};
use crate::limits::{CodecLimits, MEASUREMENT_HEADROOM};
use crate::types::Measurement;

/// Result of framing one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedBlock {
    /// Sequence number written into the frame header.
    pub sequence: SequenceNumber,
    /// Framed block length in bytes, header included.
    pub len: usize,
    /// Number of leading measurements the block holds.
    pub consumed: usize,
}

/// Publisher side: frames measurements into sequenced blocks.
#[derive(Debug, Clone, Default)]
pub struct EncodeSession {
    encoder: Encoder,
}

impl EncodeSession {
    /// Creates a session with default codec limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with custom codec limits.
    #[must_use]
    pub const fn with_limits(limits: CodecLimits) -> Self {
        Self {
            encoder: Encoder::with_limits(limits),
        }
    }

    /// Returns the underlying encoder.
    #[must_use]
    pub const fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Restarts the stream; the next block carries sequence number 0.
    pub fn reset(&mut self) {
        debug!("encode session reset at sequence {}", self.encoder.sequence_number());
        self.encoder.reset();
    }

    /// Encodes as many leading `measurements` as fit into one framed block.
    ///
    /// The caller sends `out[..len]` and passes the remaining
    /// `measurements[consumed..]` to the next call.
    pub fn encode_block(
        &mut self,
        measurements: &[Measurement],
        out: &mut [u8],
    ) -> CodecResult<EncodedBlock> {
        let needed = HEADER_SIZE + MEASUREMENT_HEADROOM;
        if out.len() < needed {
            return Err(CodecError::OutputTooSmall {
                needed,
                available: out.len(),
            });
        }

        let sequence = self.encoder.sequence_number();
        wire::encode_header(&BlockHeader::new(sequence), out).map_err(|_| {
            CodecError::OutputTooSmall {
                needed: HEADER_SIZE,
                available: out.len(),
            }
        })?;

        let length = out.len() - HEADER_SIZE;
        let mut block = self.encoder.begin_block(out, HEADER_SIZE, length)?;
        let mut consumed = 0;
        for measurement in measurements {
            if !block.try_add_measurement(measurement)? {
                break;
            }
            consumed += 1;
        }
        let len = block.finish()?;
        self.encoder.increment_sequence_number();

        debug!("encoded block {sequence}: {consumed} measurements in {len} bytes");
        Ok(EncodedBlock {
            sequence,
            len,
            consumed,
        })
    }
}

fn decode_payload(
    decoder: &mut Decoder,
    payload: &[u8],
    out: &mut Vec<Measurement>,
) -> CodecResult<()> {
    let mut block = decoder.begin_block(payload, 0, payload.len())?;
    while let Some(measurement) = block.try_get_measurement()? {
        out.push(measurement);
    }
    Ok(())
}

/// What a subscriber did with one framed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The block decoded; this many measurements were appended.
    Decoded { measurements: usize },
    /// The block was skipped while waiting for the publisher to restart.
    AwaitingReset,
}

/// Subscriber side: decodes sequenced blocks and tracks synchronization.
#[derive(Debug, Clone, Default)]
pub struct DecodeSession {
    decoder: Decoder,
    limits: wire::Limits,
    awaiting_reset: bool,
}

impl DecodeSession {
    /// Creates a session with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with custom wire and codec limits.
    #[must_use]
    pub const fn with_limits(limits: wire::Limits, codec_limits: CodecLimits) -> Self {
        Self {
            decoder: Decoder::with_limits(codec_limits),
            limits,
            awaiting_reset: false,
        }
    }

    /// Returns the underlying decoder.
    #[must_use]
    pub const fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Returns `true` once the stream lost synchronization and the publisher
    /// should be asked to restart it.
    #[must_use]
    pub const fn needs_reset(&self) -> bool {
        self.awaiting_reset
    }

    /// Clears local state, e.g. after resubscribing.
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.awaiting_reset = false;
    }

    /// Decodes one framed block, appending its measurements to `out`.
    ///
    /// On error nothing from this block is left in `out`. Once synchronization
    /// is lost every block other than a sequence-zero restart is skipped.
    pub fn decode_block(
        &mut self,
        block: &[u8],
        out: &mut Vec<Measurement>,
    ) -> CodecResult<BlockOutcome> {
        let frame = wire::decode_block(block, &self.limits)?;
        let received = frame.header.sequence;
        let expected = self.decoder.sequence_number();

        if self.awaiting_reset {
            // History is out of step with the publisher; only a restart resyncs.
            if !received.is_initial() {
                debug!("skipping block {received} while awaiting reset");
                return Ok(BlockOutcome::AwaitingReset);
            }
            self.decoder.reset();
            self.awaiting_reset = false;
        } else if received != expected {
            if !received.is_initial() {
                warn!("block out of sequence: expected {expected}, received {received}");
                self.awaiting_reset = true;
                return Err(CodecError::OutOfSequence {
                    expected: expected.raw(),
                    received: received.raw(),
                });
            }
            info!("publisher restarted the stream before block {expected}");
            self.decoder.reset();
        }

        let start = out.len();
        if let Err(err) = decode_payload(&mut self.decoder, frame.payload, out) {
            warn!("block {received} failed to decode: {err}");
            out.truncate(start);
            self.awaiting_reset = true;
            return Err(err);
        }
        self.decoder.increment_sequence_number();

        let measurements = out.len() - start;
        debug!("decoded block {received}: {measurements} measurements");
        Ok(BlockOutcome::Decoded { measurements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointId;

    fn sample(count: u32) -> Vec<Measurement> {
        (0..count)
            .map(|i| {
                Measurement::new(
                    PointId::new(i % 8),
                    1_000 + i64::from(i / 8) * 333_333,
                    u32::from(i % 50 == 0),
                    (i as f32 * 0.25).sin(),
                )
            })
            .collect()
    }

    #[test]
    fn encode_block_rejects_tiny_output() {
        let mut session = EncodeSession::new();
        let mut out = [0u8; 102];
        let err = session.encode_block(&sample(1), &mut out).unwrap_err();
        assert_eq!(
            err,
            CodecError::OutputTooSmall {
                needed: 103,
                available: 102
            }
        );
    }

    #[test]
    fn header_carries_sequence() {
        let mut session = EncodeSession::new();
        let mut out = [0u8; 256];
        let first = session.encode_block(&sample(2), &mut out).unwrap();
        assert_eq!(first.sequence, SequenceNumber::INITIAL);
        assert_eq!(&out[..3], &[wire::VERSION, 0, 0]);
        let second = session.encode_block(&sample(2), &mut out).unwrap();
        assert_eq!(second.sequence.raw(), 1);
        assert_eq!(&out[..3], &[wire::VERSION, 0, 1]);
    }

    #[test]
    fn blocks_split_on_headroom() {
        let data = sample(200);
        let mut publisher = EncodeSession::new();
        let mut subscriber = DecodeSession::new();
        let mut out = [0u8; 256];
        let mut decoded = Vec::new();
        let mut rest = data.as_slice();
        let mut blocks = 0;
        while !rest.is_empty() {
            let block = publisher.encode_block(rest, &mut out).unwrap();
            assert!(block.consumed > 0);
            assert!(block.len <= out.len());
            let outcome = subscriber.decode_block(&out[..block.len], &mut decoded).unwrap();
            assert_eq!(
                outcome,
                BlockOutcome::Decoded {
                    measurements: block.consumed
                }
            );
            rest = &rest[block.consumed..];
            blocks += 1;
        }
        assert!(blocks > 1);
        assert_eq!(decoded, data);
    }

    #[test]
    fn dropped_block_requires_reset() {
        let data = sample(64);
        let mut publisher = EncodeSession::new();
        let mut subscriber = DecodeSession::new();
        let mut decoded = Vec::new();

        let mut frames = Vec::new();
        for chunk in data.chunks(16) {
            let mut out = vec![0u8; 1024];
            let block = publisher.encode_block(chunk, &mut out).unwrap();
            out.truncate(block.len);
            frames.push(out);
        }

        subscriber.decode_block(&frames[0], &mut decoded).unwrap();
        let err = subscriber.decode_block(&frames[2], &mut decoded).unwrap_err();
        assert_eq!(
            err,
            CodecError::OutOfSequence {
                expected: 1,
                received: 2
            }
        );
        assert!(subscriber.needs_reset());
        assert_eq!(
            subscriber.decode_block(&frames[3], &mut decoded).unwrap(),
            BlockOutcome::AwaitingReset
        );
        assert_eq!(decoded.len(), 16);

        // Publisher answers the reset request with a fresh stream.
        publisher.reset();
        let mut out = vec![0u8; 1024];
        let block = publisher.encode_block(&data[32..], &mut out).unwrap();
        assert!(block.sequence.is_initial());
        let outcome = subscriber.decode_block(&out[..block.len], &mut decoded).unwrap();
        assert_eq!(outcome, BlockOutcome::Decoded { measurements: 32 });
        assert!(!subscriber.needs_reset());
        assert_eq!(&decoded[16..], &data[32..]);
    }

    #[test]
    fn corrupt_block_discards_partial_output() {
        let data = [
            Measurement::new(PointId::new(42), 100, 0, 1.0),
            Measurement::new(PointId::new(42), 200, 0, 2.0),
            Measurement::new(PointId::new(42), 300, 0, 1.0),
        ];
        let mut publisher = EncodeSession::new();
        let mut out = [0u8; 256];
        let block = publisher.encode_block(&data, &mut out).unwrap();
        assert_eq!(block.len, HEADER_SIZE + 19);
        // The first tuple survives, the second runs out of bytes mid-code.
        let truncated = &out[..HEADER_SIZE + 12];

        let mut subscriber = DecodeSession::new();
        let mut decoded = vec![Measurement::new(PointId::new(99), 0, 0, 0.0)];
        let err = subscriber.decode_block(truncated, &mut decoded).unwrap_err();
        assert!(matches!(err, CodecError::Bitstream(_)));
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].id, PointId::new(99));
        assert!(subscriber.needs_reset());
    }

    #[test]
    fn unknown_version_is_a_wire_error() {
        let mut subscriber = DecodeSession::new();
        let mut decoded = Vec::new();
        let err = subscriber.decode_block(&[1, 0, 0, 0], &mut decoded).unwrap_err();
        assert!(matches!(err, CodecError::Wire(_)));
        assert!(!subscriber.needs_reset());
    }
}
