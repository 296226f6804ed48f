//! Session-wide timestamp history.
//!
//! Timestamps are shared by every point in a stream: most tuples repeat the
//! previous timestamp or step from it by one of a few recurring intervals.

use wire::CodeWord;

const FORWARD: [CodeWord; 4] = [
    CodeWord::TimeDelta1Forward,
    CodeWord::TimeDelta2Forward,
    CodeWord::TimeDelta3Forward,
    CodeWord::TimeDelta4Forward,
];

const REVERSE: [CodeWord; 4] = [
    CodeWord::TimeDelta1Reverse,
    CodeWord::TimeDelta2Reverse,
    CodeWord::TimeDelta3Reverse,
    CodeWord::TimeDelta4Reverse,
];

/// The last two timestamps and the four smallest distinct steps seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TimestampHistory {
    prev1: i64,
    prev2: i64,
    /// Ascending; unused slots hold `i64::MAX`.
    deltas: [i64; 4],
}

impl Default for TimestampHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampHistory {
    pub(crate) const fn new() -> Self {
        Self {
            prev1: 0,
            prev2: 0,
            deltas: [i64::MAX; 4],
        }
    }

    pub(crate) const fn prev1(&self) -> i64 {
        self.prev1
    }

    /// Returns the code for `timestamp`, or `None` if it repeats the last one.
    ///
    /// `TimeXor7Bit` means the caller must follow the code with the varint of
    /// `timestamp ^ prev1`.
    pub(crate) fn code_for(&self, timestamp: i64) -> Option<CodeWord> {
        if timestamp == self.prev1 {
            return None;
        }
        if timestamp == self.prev2 {
            return Some(CodeWord::Timestamp2);
        }
        let hit = if self.prev1 < timestamp {
            FORWARD
                .iter()
                .zip(self.deltas)
                .find(|(_, delta)| self.prev1.wrapping_add(*delta) == timestamp)
        } else {
            REVERSE
                .iter()
                .zip(self.deltas)
                .find(|(_, delta)| self.prev1.wrapping_sub(*delta) == timestamp)
        };
        Some(hit.map_or(CodeWord::TimeXor7Bit, |(code, _)| *code))
    }

    /// Resolves a delta or `Timestamp2` code; `None` for any other code.
    pub(crate) fn resolve(&self, code: CodeWord) -> Option<i64> {
        if code == CodeWord::Timestamp2 {
            return Some(self.prev2);
        }
        if let Some(slot) = FORWARD.iter().position(|c| *c == code) {
            return Some(self.prev1.wrapping_add(self.deltas[slot]));
        }
        REVERSE
            .iter()
            .position(|c| *c == code)
            .map(|slot| self.prev1.wrapping_sub(self.deltas[slot]))
    }

    /// Records a timestamp that differs from the last one.
    pub(crate) fn record(&mut self, timestamp: i64) {
        // A step of exactly i64::MIN has no magnitude and is not tracked.
        if let Some(delta) = self.prev1.wrapping_sub(timestamp).checked_abs() {
            self.insert_delta(delta);
        }
        self.prev2 = self.prev1;
        self.prev1 = timestamp;
    }

    fn insert_delta(&mut self, delta: i64) {
        if delta >= self.deltas[3] || self.deltas[..3].contains(&delta) {
            return;
        }
        let slot = self.deltas.iter().position(|d| delta < *d).unwrap_or(3);
        self.deltas.copy_within(slot..3, slot + 1);
        self.deltas[slot] = delta;
    }
}
