//! Little-endian base-128 integers.
//!
//! Encoding sets the continuation bit on every group but the last. Decoding
//! never masks continuation bits off; it XORs each group into the accumulator
//! at its shift and then cancels the continuation bits of the preceding groups
//! with a fixed bias. The bias for a `k`-group value is the sum of
//! `1 << (7 * j)` for `j` in `1..k`, which is exactly where those continuation
//! bits land. The largest group is not a 7-bit group: the fifth byte of a
//! `u32` carries the top 4 bits and the ninth byte of a `u64` carries a full
//! 8 bits with no continuation flag.

use crate::error::{BitError, BitResult};

/// Maximum encoded length of a `u32`.
pub const MAX_VARU32_LEN: usize = 5;

/// Maximum encoded length of a `u64`.
pub const MAX_VARU64_LEN: usize = 9;

const BIAS_U32: [u32; MAX_VARU32_LEN] = [0, 0x80, 0x4080, 0x0020_4080, 0x1020_4080];

const BIAS_U64: [u64; MAX_VARU64_LEN] = [
    0,
    0x80,
    0x4080,
    0x0020_4080,
    0x1020_4080,
    0x0008_1020_4080,
    0x0408_1020_4080,
    0x0002_0408_1020_4080,
    0x0102_0408_1020_4080,
];

/// Returns the encoded length of a `u32`.
#[must_use]
pub const fn varu32_len(value: u32) -> usize {
    if value < 1 << 7 {
        1
    } else if value < 1 << 14 {
        2
    } else if value < 1 << 21 {
        3
    } else if value < 1 << 28 {
        4
    } else {
        5
    }
}

/// Returns the encoded length of a `u64`.
#[must_use]
pub const fn varu64_len(value: u64) -> usize {
    let mut len = 1;
    while len < MAX_VARU64_LEN && value >= 1 << (7 * len) {
        len += 1;
    }
    len
}

/// Encodes a `u32` into `out`, returning the number of bytes written.
pub fn encode_7bit_u32(value: u32, out: &mut [u8]) -> BitResult<usize> {
    let len = varu32_len(value);
    ensure_room(len, out.len())?;
    for (index, slot) in out[..len - 1].iter_mut().enumerate() {
        *slot = (value >> (7 * index)) as u8 | 0x80;
    }
    out[len - 1] = (value >> (7 * (len - 1))) as u8;
    Ok(len)
}

/// Encodes a `u64` into `out`, returning the number of bytes written.
pub fn encode_7bit_u64(value: u64, out: &mut [u8]) -> BitResult<usize> {
    let len = varu64_len(value);
    ensure_room(len, out.len())?;
    for (index, slot) in out[..len - 1].iter_mut().enumerate() {
        *slot = (value >> (7 * index)) as u8 | 0x80;
    }
    out[len - 1] = (value >> (7 * (len - 1))) as u8;
    Ok(len)
}

/// Decodes a `u32` from the front of `buf`, returning the value and bytes consumed.
pub fn decode_7bit_u32(buf: &[u8]) -> BitResult<(u32, usize)> {
    let mut value = 0u32;
    for (index, bias) in BIAS_U32[..MAX_VARU32_LEN - 1].iter().enumerate() {
        value ^= u32::from(byte_at(buf, index)?) << (7 * index);
        if value < 1 << (7 * (index + 1)) {
            return Ok((value ^ bias, index + 1));
        }
    }
    value ^= (u32::from(byte_at(buf, MAX_VARU32_LEN - 1)?) << 28) ^ BIAS_U32[MAX_VARU32_LEN - 1];
    Ok((value, MAX_VARU32_LEN))
}

/// Decodes a `u64` from the front of `buf`, returning the value and bytes consumed.
pub fn decode_7bit_u64(buf: &[u8]) -> BitResult<(u64, usize)> {
    let mut value = 0u64;
    for (index, bias) in BIAS_U64[..MAX_VARU64_LEN - 1].iter().enumerate() {
        value ^= u64::from(byte_at(buf, index)?) << (7 * index);
        if value < 1 << (7 * (index + 1)) {
            return Ok((value ^ bias, index + 1));
        }
    }
    value ^= (u64::from(byte_at(buf, MAX_VARU64_LEN - 1)?) << 56) ^ BIAS_U64[MAX_VARU64_LEN - 1];
    Ok((value, MAX_VARU64_LEN))
}

fn byte_at(buf: &[u8], index: usize) -> BitResult<u8> {
    buf.get(index).copied().ok_or(BitError::UnexpectedEof {
        requested: (index + 1) * 8,
        available: buf.len() * 8,
    })
}

const fn ensure_room(needed: usize, available: usize) -> BitResult<()> {
    if needed > available {
        return Err(BitError::BufferOverflow {
            attempted: needed,
            available,
        });
    }
    Ok(())
}
