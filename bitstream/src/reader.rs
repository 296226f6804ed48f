//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};
use crate::varint;
use crate::BitSource;

/// A bit-level reader for data produced by [`BitWriter`](crate::BitWriter).
///
/// Bits are consumed MSB-first from a one-byte cache that is refilled from
/// the next unread byte whenever it runs dry. Whole-byte reads bypass the
/// cache. All read operations are bounds-checked and return errors on
/// failure; the reader never panics on malformed input.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    cache: u8,
    cache_bits: u8,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            cache: 0,
            cache_bits: 0,
        }
    }

    /// Returns the index of the next unread byte.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of unread bytes, not counting cached bits.
    #[must_use]
    pub const fn bytes_remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns the number of bits left in the cache (0-7).
    #[must_use]
    pub const fn cached_bits(&self) -> u8 {
        self.cache_bits
    }

    /// Returns `true` if every byte has been consumed and the cache is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.position == self.data.len() && self.cache_bits == 0
    }

    /// Drops any cached bits so the next bit read starts on a fresh byte.
    pub fn clear_cache(&mut self) {
        self.cache = 0;
        self.cache_bits = 0;
    }

    /// Reads a single bit as a boolean.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        if self.cache_bits == 0 {
            self.cache = self.next_byte(1)?;
            self.cache_bits = 8;
        }
        self.cache_bits -= 1;
        Ok((self.cache >> self.cache_bits) & 1 == 1)
    }

    /// Reads up to 32 bits as an unsigned integer, most significant first.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u32> {
        if bits > 32 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 32 });
        }
        let mut value = 0u32;
        for _ in 0..bits {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Reads one whole byte.
    pub fn read_u8(&mut self) -> BitResult<u8> {
        self.next_byte(8)
    }

    /// Reads `count` bytes as a little-endian integer.
    pub fn read_le(&mut self, count: usize) -> BitResult<u32> {
        if count > 4 {
            return Err(BitError::InvalidBitCount {
                bits: u8::try_from(count * 8).unwrap_or(u8::MAX),
                max_bits: 32,
            });
        }
        self.ensure_bytes(count)?;
        let value = self.data[self.position..self.position + count]
            .iter()
            .enumerate()
            .fold(0u32, |acc, (shift, byte)| acc | u32::from(*byte) << (8 * shift));
        self.position += count;
        Ok(value)
    }

    /// Reads a 7-bit varint `u32`.
    pub fn read_varu32(&mut self) -> BitResult<u32> {
        let (value, read) = varint::decode_7bit_u32(&self.data[self.position..])?;
        self.position += read;
        Ok(value)
    }

    /// Reads a 7-bit varint `u64`.
    pub fn read_varu64(&mut self) -> BitResult<u64> {
        let (value, read) = varint::decode_7bit_u64(&self.data[self.position..])?;
        self.position += read;
        Ok(value)
    }

    fn next_byte(&mut self, requested_bits: usize) -> BitResult<u8> {
        self.ensure_bytes(1).map_err(|_| BitError::UnexpectedEof {
            requested: requested_bits,
            available: usize::from(self.cache_bits),
        })?;
        let byte = self.data[self.position];
        self.position += 1;
        Ok(byte)
    }

    fn ensure_bytes(&self, count: usize) -> BitResult<()> {
        let available = self.bytes_remaining();
        if count > available {
            return Err(BitError::UnexpectedEof {
                requested: count * 8,
                available: available * 8,
            });
        }
        Ok(())
    }
}

impl BitSource for BitReader<'_> {
    fn read_bit(&mut self) -> BitResult<bool> {
        Self::read_bit(self)
    }

    fn read_bits(&mut self, bits: u8) -> BitResult<u32> {
        Self::read_bits(self, bits)
    }
}
