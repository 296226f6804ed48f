//! The 32 TSSC code words.
//!
//! Every tuple field is introduced by one of these codes. Their integer
//! values are fixed by the protocol and shared with every other TSSC
//! implementation.

use std::fmt;

/// Number of distinct code words; every code fits in five bits.
pub const CODE_COUNT: usize = 32;

/// A TSSC code word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CodeWord {
    EndOfStream = 0,

    PointIdXor4 = 1,
    PointIdXor8 = 2,
    PointIdXor12 = 3,
    PointIdXor16 = 4,
    PointIdXor20 = 5,
    PointIdXor24 = 6,
    PointIdXor32 = 7,

    TimeDelta1Forward = 8,
    TimeDelta2Forward = 9,
    TimeDelta3Forward = 10,
    TimeDelta4Forward = 11,
    TimeDelta1Reverse = 12,
    TimeDelta2Reverse = 13,
    TimeDelta3Reverse = 14,
    TimeDelta4Reverse = 15,
    Timestamp2 = 16,
    TimeXor7Bit = 17,

    Quality2 = 18,
    Quality7Bit32 = 19,

    Value1 = 20,
    Value2 = 21,
    Value3 = 22,
    ValueZero = 23,
    ValueXor4 = 24,
    ValueXor8 = 25,
    ValueXor12 = 26,
    ValueXor16 = 27,
    ValueXor20 = 28,
    ValueXor24 = 29,
    ValueXor28 = 30,
    ValueXor32 = 31,
}

impl CodeWord {
    /// Every code word, indexed by its raw value.
    pub const ALL: [Self; CODE_COUNT] = [
        Self::EndOfStream,
        Self::PointIdXor4,
        Self::PointIdXor8,
        Self::PointIdXor12,
        Self::PointIdXor16,
        Self::PointIdXor20,
        Self::PointIdXor24,
        Self::PointIdXor32,
        Self::TimeDelta1Forward,
        Self::TimeDelta2Forward,
        Self::TimeDelta3Forward,
        Self::TimeDelta4Forward,
        Self::TimeDelta1Reverse,
        Self::TimeDelta2Reverse,
        Self::TimeDelta3Reverse,
        Self::TimeDelta4Reverse,
        Self::Timestamp2,
        Self::TimeXor7Bit,
        Self::Quality2,
        Self::Quality7Bit32,
        Self::Value1,
        Self::Value2,
        Self::Value3,
        Self::ValueZero,
        Self::ValueXor4,
        Self::ValueXor8,
        Self::ValueXor12,
        Self::ValueXor16,
        Self::ValueXor20,
        Self::ValueXor24,
        Self::ValueXor28,
        Self::ValueXor32,
    ];

    /// Returns the code word for a raw value, or `None` above 31.
    #[must_use]
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }

    /// Returns the code word for the low five bits of `raw`.
    #[must_use]
    pub const fn from_bits5(raw: u8) -> Self {
        Self::ALL[(raw & 0x1F) as usize]
    }

    /// Returns the raw protocol value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Returns the histogram index for this code.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for the PointID XOR tiers.
    #[must_use]
    pub const fn is_point_id(self) -> bool {
        matches!(self.raw(), 1..=7)
    }

    /// Returns `true` for the timestamp codes.
    #[must_use]
    pub const fn is_timestamp(self) -> bool {
        matches!(self.raw(), 8..=17)
    }

    /// Returns `true` for the quality codes.
    #[must_use]
    pub const fn is_quality(self) -> bool {
        matches!(self.raw(), 18..=19)
    }

    /// Returns `true` for the value codes.
    #[must_use]
    pub const fn is_value(self) -> bool {
        self.raw() >= 20
    }

    /// Smallest PointID XOR tier covering `bits_changed`.
    #[must_use]
    pub const fn point_id_xor_for(bits_changed: u32) -> Self {
        if bits_changed < 1 << 4 {
            Self::PointIdXor4
        } else if bits_changed < 1 << 8 {
            Self::PointIdXor8
        } else if bits_changed < 1 << 12 {
            Self::PointIdXor12
        } else if bits_changed < 1 << 16 {
            Self::PointIdXor16
        } else if bits_changed < 1 << 20 {
            Self::PointIdXor20
        } else if bits_changed < 1 << 24 {
            Self::PointIdXor24
        } else {
            Self::PointIdXor32
        }
    }

    /// Smallest value XOR tier covering `bits_changed`.
    #[must_use]
    pub const fn value_xor_for(bits_changed: u32) -> Self {
        if bits_changed < 1 << 4 {
            Self::ValueXor4
        } else if bits_changed < 1 << 8 {
            Self::ValueXor8
        } else if bits_changed < 1 << 12 {
            Self::ValueXor12
        } else if bits_changed < 1 << 16 {
            Self::ValueXor16
        } else if bits_changed < 1 << 20 {
            Self::ValueXor20
        } else if bits_changed < 1 << 24 {
            Self::ValueXor24
        } else if bits_changed < 1 << 28 {
            Self::ValueXor28
        } else {
            Self::ValueXor32
        }
    }

    /// Payload layout of an XOR tier, or `None` for every other code.
    #[must_use]
    pub const fn xor_layout(self) -> Option<XorLayout> {
        let (nibble, bytes) = match self {
            Self::PointIdXor4 | Self::ValueXor4 => (true, 0),
            Self::PointIdXor8 | Self::ValueXor8 => (false, 1),
            Self::PointIdXor12 | Self::ValueXor12 => (true, 1),
            Self::PointIdXor16 | Self::ValueXor16 => (false, 2),
            Self::PointIdXor20 | Self::ValueXor20 => (true, 2),
            Self::PointIdXor24 | Self::ValueXor24 => (false, 3),
            Self::ValueXor28 => (true, 3),
            Self::PointIdXor32 | Self::ValueXor32 => (false, 4),
            _ => return None,
        };
        Some(XorLayout { nibble, bytes })
    }
}

/// Payload layout of an XOR tier.
///
/// Odd-nibble tiers carry the low four bits through the bit cache, followed by
/// the remaining bits as little-endian whole bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorLayout {
    /// The low nibble travels as four cached bits.
    pub nibble: bool,
    /// Whole bytes after the nibble, least significant first.
    pub bytes: usize,
}

impl XorLayout {
    /// Total payload width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        (self.bytes as u32) * 8 + if self.nibble { 4 } else { 0 }
    }
}

impl From<CodeWord> for u8 {
    fn from(code: CodeWord) -> Self {
        code.raw()
    }
}

impl fmt::Display for CodeWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({})", self.raw())
    }
}
