//! Bounded writer that interleaves sub-byte codes with whole bytes.

use crate::error::{BitError, BitResult};
use crate::varint;
use crate::BitSink;

/// Largest bit count accepted by a single [`BitWriter::write_bits`] call.
pub const MAX_WRITE_BITS: u8 = 24;

/// A bit-level writer over a fixed caller-provided window.
///
/// Bits are packed MSB-first into a pending cache byte. The first bit of a new
/// cache byte reserves the next byte slot in the window; whole bytes written
/// afterwards land behind that slot. The slot is filled once eight bits have
/// accumulated, so a reader that pulls a fresh byte whenever its own cache runs
/// dry sees the same interleaving.
#[derive(Debug)]
pub struct BitWriter<'a> {
    data: &'a mut [u8],
    position: usize,
    cache: u32,
    cache_bits: u8,
    cache_slot: Option<usize>,
}

impl<'a> BitWriter<'a> {
    /// Creates a writer over `data`, starting at its first byte.
    #[must_use]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            position: 0,
            cache: 0,
            cache_bits: 0,
            cache_slot: None,
        }
    }

    /// Returns the number of bytes claimed so far, including a reserved cache slot.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of unclaimed bytes left in the window.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns the window length in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of bits waiting in the cache (0-7).
    #[must_use]
    pub const fn pending_bits(&self) -> u8 {
        self.cache_bits
    }

    /// Writes the low `bits` bits of `value`, most significant first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > MAX_WRITE_BITS`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    /// Returns [`BitError::BufferOverflow`] if no byte is left for the cache.
    pub fn write_bits(&mut self, value: u32, bits: u8) -> BitResult<()> {
        if bits > MAX_WRITE_BITS {
            return Err(BitError::InvalidBitCount {
                bits,
                max_bits: MAX_WRITE_BITS,
            });
        }
        if bits == 0 {
            return Ok(());
        }
        if value >= 1 << bits {
            return Err(BitError::ValueOutOfRange {
                value: u64::from(value),
                bits,
            });
        }
        if self.cache_slot.is_none() {
            self.cache_slot = Some(self.claim(1)?);
        }
        self.cache = (self.cache << bits) | value;
        self.cache_bits += bits;
        self.drain()
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) -> BitResult<()> {
        self.write_bits(u32::from(value), 1)
    }

    /// Writes one whole byte at the current position.
    pub fn write_u8(&mut self, value: u8) -> BitResult<()> {
        let idx = self.claim(1)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Writes the low `count` bytes of `value`, least significant first.
    pub fn write_le(&mut self, value: u32, count: usize) -> BitResult<()> {
        if count > 4 {
            return Err(BitError::InvalidBitCount {
                bits: u8::try_from(count * 8).unwrap_or(u8::MAX),
                max_bits: 32,
            });
        }
        let start = self.claim(count)?;
        for (shift, slot) in self.data[start..start + count].iter_mut().enumerate() {
            *slot = (value >> (8 * shift)) as u8;
        }
        Ok(())
    }

    /// Writes a 7-bit varint `u32` at the current position.
    pub fn write_varu32(&mut self, value: u32) -> BitResult<()> {
        let written = varint::encode_7bit_u32(value, &mut self.data[self.position..])?;
        self.position += written;
        Ok(())
    }

    /// Writes a 7-bit varint `u64` at the current position.
    pub fn write_varu64(&mut self, value: u64) -> BitResult<()> {
        let written = varint::encode_7bit_u64(value, &mut self.data[self.position..])?;
        self.position += written;
        Ok(())
    }

    /// Pads a partial cache byte with zeros and stores it.
    pub fn flush(&mut self) -> BitResult<()> {
        if self.cache_bits == 0 {
            return Ok(());
        }
        if self.cache_slot.is_none() {
            self.cache_slot = Some(self.claim(1)?);
        }
        self.cache <<= 8 - self.cache_bits;
        self.cache_bits = 8;
        self.drain()
    }

    /// Flushes the cache and returns the number of bytes written.
    pub fn finish(mut self) -> BitResult<usize> {
        self.flush()?;
        Ok(self.position)
    }

    fn drain(&mut self) -> BitResult<()> {
        while self.cache_bits > 7 {
            self.cache_bits -= 8;
            if let Some(slot) = self.cache_slot {
                self.data[slot] = (self.cache >> self.cache_bits) as u8;
            }
            self.cache &= (1 << self.cache_bits) - 1;
            self.cache_slot = if self.cache_bits > 0 {
                Some(self.claim(1)?)
            } else {
                None
            };
        }
        Ok(())
    }

    fn claim(&mut self, count: usize) -> BitResult<usize> {
        let available = self.remaining();
        if count > available {
            return Err(BitError::BufferOverflow {
                attempted: count,
                available,
            });
        }
        let start = self.position;
        self.position += count;
        Ok(start)
    }
}

impl BitSink for BitWriter<'_> {
    fn write_bits(&mut self, value: u32, bits: u8) -> BitResult<()> {
        Self::write_bits(self, value, bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_writer() {
        let mut buf = [0u8; 4];
        let writer = BitWriter::new(&mut buf);
        assert_eq!(writer.position(), 0);
        assert_eq!(writer.finish().unwrap(), 0);
    }

    #[test]
    fn write_single_bit_true() {
        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bit(true).unwrap();
        assert_eq!(writer.pending_bits(), 1);
        assert_eq!(writer.finish().unwrap(), 1);
        // Single bit 1, padded with 7 zeros = 0b1000_0000
        assert_eq!(buf, [0b1000_0000]);
    }

    #[test]
    fn write_partial_byte_with_padding() {
        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0b11010, 5).unwrap();
        assert_eq!(writer.finish().unwrap(), 1);
        assert_eq!(buf, [0b1101_0000]);
    }

    #[test]
    fn write_bits_across_byte_boundary() {
        let mut buf = [0u8; 2];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0b111, 3).unwrap();
        writer.write_bits(0b10101, 5).unwrap();
        writer.write_bits(0b0110, 4).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);
        // 111 10101 | 0110 11 + 00 padding
        assert_eq!(buf, [0b1111_0101, 0b0110_1100]);
    }

    #[test]
    fn first_bit_reserves_slot_ahead_of_bytes() {
        let mut buf = [0u8; 3];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0b1010, 4).unwrap();
        writer.write_u8(0xAB).unwrap();
        writer.write_bits(0b0101, 4).unwrap();
        assert_eq!(writer.pending_bits(), 0);
        assert_eq!(writer.finish().unwrap(), 2);
        assert_eq!(&buf[..2], &[0b1010_0101, 0xAB]);
    }

    #[test]
    fn leftover_bits_reserve_next_slot_immediately() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b0000_0001, 8).unwrap();
        // One byte stored, three bits pending in a freshly reserved slot.
        assert_eq!(writer.position(), 2);
        writer.write_u8(0xEE).unwrap();
        assert_eq!(writer.finish().unwrap(), 3);
        assert_eq!(&buf[..3], &[0b1010_0000, 0b0010_0000, 0xEE]);
    }

    #[test]
    fn exact_byte_releases_slot() {
        let mut buf = [0u8; 3];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bits(0xC3, 8).unwrap();
        writer.write_u8(0x11).unwrap();
        writer.write_bits(0b1, 1).unwrap();
        assert_eq!(writer.finish().unwrap(), 3);
        assert_eq!(buf, [0xC3, 0x11, 0x80]);
    }

    #[test]
    fn write_le_bytes() {
        let mut buf = [0u8; 4];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_le(0x1234_5678, 3).unwrap();
        assert_eq!(writer.finish().unwrap(), 3);
        assert_eq!(&buf[..3], &[0x78, 0x56, 0x34]);
    }

    #[test]
    fn write_varints() {
        let mut buf = [0u8; 8];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_varu32(300).unwrap();
        writer.write_varu64(1).unwrap();
        assert_eq!(writer.finish().unwrap(), 3);
        assert_eq!(&buf[..3], &[0xAC, 0x02, 0x01]);
    }

    #[test]
    fn write_bits_invalid_count() {
        let mut buf = [0u8; 8];
        let mut writer = BitWriter::new(&mut buf);
        let result = writer.write_bits(0, 25);
        assert!(matches!(
            result,
            Err(BitError::InvalidBitCount {
                bits: 25,
                max_bits: 24
            })
        ));
    }

    #[test]
    fn write_bits_value_out_of_range() {
        let mut buf = [0u8; 2];
        let mut writer = BitWriter::new(&mut buf);
        let result = writer.write_bits(16, 4);
        assert!(matches!(
            result,
            Err(BitError::ValueOutOfRange { value: 16, bits: 4 })
        ));
    }

    #[test]
    fn overflow_is_reported() {
        let mut buf = [0u8; 1];
        let mut writer = BitWriter::new(&mut buf);
        writer.write_u8(1).unwrap();
        let err = writer.write_bits(1, 1).unwrap_err();
        assert_eq!(
            err,
            BitError::BufferOverflow {
                attempted: 1,
                available: 0
            }
        );
        let err = writer.write_varu32(u32::MAX).unwrap_err();
        assert!(matches!(err, BitError::BufferOverflow { .. }));
    }
}
