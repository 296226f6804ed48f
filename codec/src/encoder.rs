//! Measurement encoder.

use bitstream::BitWriter;
use wire::{CodeWord, SequenceNumber};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::{CodecLimits, MEASUREMENT_HEADROOM};
use crate::metadata::PointTable;
use crate::payload::write_xor;
use crate::timestamp::TimestampHistory;
use crate::types::Measurement;

/// Stateful measurement encoder for one stream.
///
/// Compression history lives here and survives across blocks; each block is
/// written through a [`BlockEncoder`] obtained from [`Encoder::begin_block`].
#[derive(Debug, Clone)]
pub struct Encoder {
    points: PointTable,
    timestamps: TimestampHistory,
    sequence: SequenceNumber,
    limits: CodecLimits,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Creates an encoder with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(CodecLimits::default())
    }

    /// Creates an encoder with custom limits.
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

    /// Returns the sequence number of the next block.
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
        buffer: &'a mut [u8],
        offset: usize,
        length: usize,
    ) -> CodecResult<BlockEncoder<'a>> {
        let end = block_end(offset, length, buffer.len())?;
        Ok(BlockEncoder {
            encoder: self,
            writer: BitWriter::new(&mut buffer[offset..end]),
            offset,
        })
    }
}

/// Validates a block window and returns its end offset.
pub(crate) fn block_end(offset: usize, length: usize, buffer_len: usize) -> CodecResult<usize> {
    offset
        .checked_add(length)
        .filter(|end| *end <= buffer_len)
        .ok_or(CodecError::BufferRange {
            offset,
            length,
            buffer_len,
        })
}

/// One block being written by an [`Encoder`].
#[derive(Debug)]
pub struct BlockEncoder<'a> {
    encoder: &'a mut Encoder,
    writer: BitWriter<'a>,
    offset: usize,
}

impl BlockEncoder<'_> {
    /// Absolute offset of the next byte in the backing buffer.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.offset + self.writer.position()
    }

    /// Bytes left in the window.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.writer.remaining()
    }

    /// Appends one measurement.
    ///
    /// Returns `Ok(false)` without touching any state when fewer than
    /// [`MEASUREMENT_HEADROOM`] bytes remain; finish the block and retry the
    /// measurement in the next one.
    pub fn try_add_measurement(&mut self, measurement: &Measurement) -> CodecResult<bool> {
        let id = measurement.id.raw();
        let max_points = self.encoder.limits.max_points;
        if id as usize >= max_points {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::Points,
                limit: max_points,
                actual: id as usize + 1,
            });
        }
        if self.writer.remaining() < MEASUREMENT_HEADROOM {
            return Ok(false);
        }

        let points = &mut self.encoder.points;
        let timestamps = &mut self.encoder.timestamps;
        let writer = &mut self.writer;

        points.point_mut(id);

        let predicted = points.last_mut().next_point_id;
        if predicted != id {
            let bits = id ^ predicted;
            let code = CodeWord::point_id_xor_for(bits);
            let last = points.last_mut();
            last.model.write_code(code, writer)?;
            write_xor(writer, code, bits)?;
            last.next_point_id = id;
        }

        if let Some(code) = timestamps.code_for(measurement.timestamp) {
            points.last_mut().model.write_code(code, writer)?;
            if code == CodeWord::TimeXor7Bit {
                writer.write_varu64((measurement.timestamp ^ timestamps.prev1()) as u64)?;
            }
            timestamps.record(measurement.timestamp);
        }

        if let Some(code) = points.point_mut(id).quality_code(measurement.quality) {
            points.last_mut().model.write_code(code, writer)?;
            if code == CodeWord::Quality7Bit32 {
                writer.write_varu32(measurement.quality)?;
            }
            points.point_mut(id).push_quality(measurement.quality);
        }

        let (code, bits) = points.point_mut(id).encode_value(measurement.value_bits());
        points.last_mut().model.write_code(code, writer)?;
        write_xor(writer, code, bits)?;

        points.set_last(id);
        Ok(true)
    }

    /// Ends the block and returns the absolute end offset.
    ///
    /// Writes the end-of-stream code and zero-pads the final partial byte.
    pub fn finish(mut self) -> CodecResult<usize> {
        self.encoder
            .points
            .last_mut()
            .model
            .write_code(CodeWord::EndOfStream, &mut self.writer)?;
        let written = self.writer.finish()?;
        Ok(self.offset + written)
    }
}
