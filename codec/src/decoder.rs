//! Measurement decoder.

use bitstream::BitReader;
use wire::{CodeWord, SequenceNumber};

use crate::encoder::block_end;
use crate::error::{CodecError, CodecResult, DecodeStage, LimitKind};
use crate::limits::CodecLimits;
use crate::metadata::PointTable;
use crate::payload::read_xor;
use crate::timestamp::TimestampHistory;
use crate::types::{Measurement, PointId};

/// Stateful measurement decoder for one stream; the mirror of
/// [`Encoder`](crate::Encoder).
#[derive(Debug, Clone)]
pub struct Decoder {
    points: PointTable,
    timestamps: TimestampHistory,
    sequence: SequenceNumber,
    limits: CodecLimits,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(CodecLimits::default())
    }

    /// Creates a decoder with custom limits.
    #[must_use]
    pub const fn with_limits(limits: CodecLimits) -> Self {
        Self {
            points: PointTable::new(),
            timestamps: TimestampHistory::new(),
            sequence: SequenceNumber::INITIAL,
            limits,
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Clears all compression history and the sequence number.
    pub fn reset(&mut self) {
        self.points = PointTable::new();
        self.timestamps = TimestampHistory::new();
        self.sequence = SequenceNumber::INITIAL;
    }

    /// Returns the sequence number expected on the next block.
    #[must_use]
    pub const fn sequence_number(&self) -> SequenceNumber {
        self.sequence
    }

    /// Advances the sequence number, skipping zero on wrap.
    pub fn increment_sequence_number(&mut self) {
        self.sequence = self.sequence.next();
    }

    /// Number of distinct points seen since the last reset.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Binds the window `buffer[offset..offset + length]` for one block.
    pub fn begin_block<'a>(
        &'a mut self,
        buffer: &'a [u8],
        offset: usize,
        length: usize,
    ) -> CodecResult<BlockDecoder<'a>> {
        let end = block_end(offset, length, buffer.len())?;
        Ok(BlockDecoder {
            decoder: self,
            reader: BitReader::new(&buffer[offset..end]),
            offset,
            failed: false,
        })
    }
}

/// One block being read by a [`Decoder`].
///
/// Also an iterator over the block's measurements that stops after the first
/// error.
#[derive(Debug)]
pub struct BlockDecoder<'a> {
    decoder: &'a mut Decoder,
    reader: BitReader<'a>,
    offset: usize,
    failed: bool,
}

impl BlockDecoder<'_> {
    /// Absolute offset of the next unread byte in the backing buffer.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.offset + self.reader.position()
    }

    /// Reads the next measurement.
    ///
    /// Returns `Ok(None)` once the window is exhausted or an end-of-stream
    /// code is read.
    pub fn try_get_measurement(&mut self) -> CodecResult<Option<Measurement>> {
        if self.reader.is_empty() {
            return Ok(None);
        }

        let points = &mut self.decoder.points;
        let timestamps = &mut self.decoder.timestamps;
        let reader = &mut self.reader;

        let mut code = points.last_mut().model.read_code(reader)?;
        if code == CodeWord::EndOfStream {
            reader.clear_cache();
            return Ok(None);
        }

        let id_code = code.is_point_id();
        let mut id = points.last_mut().next_point_id;
        if id_code {
            id ^= read_xor(reader, code)?;
        }
        let max_points = self.decoder.limits.max_points;
        if id as usize >= max_points {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::Points,
                limit: max_points,
                actual: id as usize + 1,
            });
        }
        if id_code {
            let last = points.last_mut();
            last.next_point_id = id;
            code = last.model.read_code(reader)?;
            let position = self.offset + reader.position();
            expect_code(code, CodeWord::TimeDelta1Forward, DecodeStage::Timestamp, position)?;
        }
        points.point_mut(id);

        let timestamp = if code.is_timestamp() {
            let timestamp = if code == CodeWord::TimeXor7Bit {
                timestamps.prev1() ^ reader.read_varu64()? as i64
            } else {
                timestamps
                    .resolve(code)
                    .ok_or(CodecError::ProtocolCorruption {
                        stage: DecodeStage::Timestamp,
                        code: code.raw(),
                        position: self.offset + reader.position(),
                    })?
            };
            timestamps.record(timestamp);
            code = points.last_mut().model.read_code(reader)?;
            let position = self.offset + reader.position();
            expect_code(code, CodeWord::Quality2, DecodeStage::Quality, position)?;
            timestamp
        } else {
            timestamps.prev1()
        };

        let quality = if code.is_quality() {
            let quality = if code == CodeWord::Quality2 {
                points.point_mut(id).prev_quality2
            } else {
                reader.read_varu32()?
            };
            points.point_mut(id).push_quality(quality);
            code = points.last_mut().model.read_code(reader)?;
            let position = self.offset + reader.position();
            expect_code(code, CodeWord::Value1, DecodeStage::Value, position)?;
            quality
        } else {
            points.point_mut(id).prev_quality1
        };

        let bits = read_xor(reader, code)?;
        let value = points.point_mut(id).decode_value(code, bits);

        points.set_last(id);
        Ok(Some(Measurement::new(
            PointId::new(id),
            timestamp,
            quality,
            f32::from_bits(value),
        )))
    }
}

impl Iterator for BlockDecoder<'_> {
    type Item = CodecResult<Measurement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.try_get_measurement() {
            Ok(Some(measurement)) => Some(Ok(measurement)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Rejects codes that belong to an earlier stage than `stage`.
fn expect_code(
    code: CodeWord,
    minimum: CodeWord,
    stage: DecodeStage,
    position: usize,
) -> CodecResult<()> {
    if code.raw() < minimum.raw() {
        return Err(CodecError::ProtocolCorruption {
            stage,
            code: code.raw(),
            position,
        });
    }
    Ok(())
}
