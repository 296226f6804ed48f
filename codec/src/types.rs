//! Core types for the codec.

/// A session-local point identifier.
///
/// Point ids are dense run-time indices agreed between one encoder and one
/// decoder; they are not persistent signal identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PointId(u32);

impl PointId {
    /// Creates a new point ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw point ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for PointId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<PointId> for u32 {
    fn from(id: PointId) -> Self {
        id.0
    }
}

/// One telemetry measurement.
///
/// Values compare by bit pattern, so two NaNs with the same payload are equal
/// and `0.0` differs from `-0.0`.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    /// Point identifier.
    pub id: PointId,
    /// Timestamp in 100 ns ticks.
    pub timestamp: i64,
    /// Quality flags.
    pub quality: u32,
    /// Measured value.
    pub value: f32,
}

impl Measurement {
    /// Creates a measurement.
    #[must_use]
    pub const fn new(id: PointId, timestamp: i64, quality: u32, value: f32) -> Self {
        Self {
            id,
            timestamp,
            quality,
            value,
        }
    }

    /// Returns the raw IEEE-754 bit pattern of the value.
    #[must_use]
    pub fn value_bits(&self) -> u32 {
        self.value.to_bits()
    }
}

impl PartialEq for Measurement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.timestamp == other.timestamp
            && self.quality == other.quality
            && self.value.to_bits() == other.value.to_bits()
    }
}

impl Eq for Measurement {}
