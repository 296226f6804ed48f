//! Sub-byte bit packing primitives for the TSSC codec.
//!
//! This crate provides [`BitWriter`] and [`BitReader`] for MSB-first bit packing
//! interleaved with whole bytes, plus the 7-bit varints the codec uses for
//! timestamps and quality flags.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads/writes are bounds-checked against a fixed window.
//! - **No domain knowledge** - This crate knows nothing about measurements or code words.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut buf = [0u8; 8];
//! let mut writer = BitWriter::new(&mut buf);
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_u8(0xAB).unwrap();
//! writer.write_bits(0b01, 2).unwrap();
//! let len = writer.finish().unwrap();
//!
//! let mut reader = BitReader::new(&buf[..len]);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_u8().unwrap(), 0xAB);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b01);
//! ```

mod error;
mod reader;
mod varint;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use varint::{
    decode_7bit_u32, decode_7bit_u64, encode_7bit_u32, encode_7bit_u64, varu32_len, varu64_len,
    MAX_VARU32_LEN, MAX_VARU64_LEN,
};
pub use writer::{BitWriter, MAX_WRITE_BITS};

/// Destination for variable-length code prefixes.
///
/// Code models emit their prefixes through this trait so the same model can
/// drive a real [`BitWriter`] or a counting sink in tests.
pub trait BitSink {
    /// Writes the low `bits` bits of `value`, most significant first.
    fn write_bits(&mut self, value: u32, bits: u8) -> BitResult<()>;
}

/// Source of variable-length code prefixes; the inverse of [`BitSink`].
pub trait BitSource {
    /// Reads a single bit.
    fn read_bit(&mut self) -> BitResult<bool>;

    /// Reads `bits` bits, most significant first.
    fn read_bits(&mut self, bits: u8) -> BitResult<u32>;
}
