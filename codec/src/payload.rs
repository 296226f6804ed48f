//! XOR tier payloads shared by point ids and values.

use bitstream::{BitReader, BitResult, BitWriter};
use wire::CodeWord;

/// Writes the payload of an XOR tier code; other codes carry none.
pub(crate) fn write_xor(writer: &mut BitWriter<'_>, code: CodeWord, bits: u32) -> BitResult<()> {
    let Some(layout) = code.xor_layout() else {
        return Ok(());
    };
    if layout.nibble {
        writer.write_bits(bits & 0xF, 4)?;
        writer.write_le(bits >> 4, layout.bytes)
    } else {
        writer.write_le(bits, layout.bytes)
    }
}

/// Reads the payload of an XOR tier code; other codes yield zero.
pub(crate) fn read_xor(reader: &mut BitReader<'_>, code: CodeWord) -> BitResult<u32> {
    let Some(layout) = code.xor_layout() else {
        return Ok(0);
    };
    if layout.nibble {
        let low = reader.read_bits(4)?;
        Ok(low | reader.read_le(layout.bytes)? << 4)
    } else {
        reader.read_le(layout.bytes)
    }
}
