//! Per-point history and the point table shared by encoder and decoder.

use wire::CodeWord;

use crate::model::CodeModel;

/// History kept for one point id.
#[derive(Debug, Clone)]
pub(crate) struct PointMetadata {
    /// Id expected after this point; starts at `id + 1`.
    pub(crate) next_point_id: u32,
    pub(crate) prev_quality1: u32,
    pub(crate) prev_quality2: u32,
    /// Most recent value bit patterns, newest first.
    pub(crate) values: [u32; 3],
    pub(crate) model: CodeModel,
}

impl PointMetadata {
    pub(crate) const fn new(next_point_id: u32) -> Self {
        Self {
            next_point_id,
            prev_quality1: 0,
            prev_quality2: 0,
            values: [0; 3],
            model: CodeModel::new(),
        }
    }

    /// State for a point first seen as `id`, predicting `id + 1` next.
    pub(crate) const fn for_point(id: u32) -> Self {
        Self::new(id.wrapping_add(1))
    }

    /// Returns the quality code for `quality`, or `None` if it repeats.
    pub(crate) fn quality_code(&self, quality: u32) -> Option<CodeWord> {
        if quality == self.prev_quality1 {
            None
        } else if quality == self.prev_quality2 {
            Some(CodeWord::Quality2)
        } else {
            Some(CodeWord::Quality7Bit32)
        }
    }

    pub(crate) fn push_quality(&mut self, quality: u32) {
        self.prev_quality2 = self.prev_quality1;
        self.prev_quality1 = quality;
    }

    /// Chooses the value code for `raw` and rolls it into the history.
    ///
    /// Returns the code plus the XOR against the previous value for the
    /// XOR tiers (zero otherwise).
    pub(crate) fn encode_value(&mut self, raw: u32) -> (CodeWord, u32) {
        if raw == self.values[0] {
            (CodeWord::Value1, 0)
        } else if raw == self.values[1] {
            self.values.swap(0, 1);
            (CodeWord::Value2, 0)
        } else if raw == self.values[2] {
            self.values.rotate_right(1);
            (CodeWord::Value3, 0)
        } else if raw == 0 {
            self.push_value(0);
            (CodeWord::ValueZero, 0)
        } else {
            let bits = raw ^ self.values[0];
            self.push_value(raw);
            (CodeWord::value_xor_for(bits), bits)
        }
    }

    /// Resolves a value code, applying `xor` for the XOR tiers.
    pub(crate) fn decode_value(&mut self, code: CodeWord, xor: u32) -> u32 {
        match code {
            CodeWord::Value1 => {}
            CodeWord::Value2 => self.values.swap(0, 1),
            CodeWord::Value3 => self.values.rotate_right(1),
            CodeWord::ValueZero => self.push_value(0),
            _ => self.push_value(self.values[0] ^ xor),
        }
        self.values[0]
    }

    fn push_value(&mut self, raw: u32) {
        self.values.rotate_right(1);
        self.values[0] = raw;
    }
}

/// Dense point storage indexed by id, plus the active point.
///
/// Codes are always written with the model of the point that was active when
/// the tuple started. Before the first tuple that is a seed point which never
/// appears in the table.
#[derive(Debug, Clone)]
pub(crate) struct PointTable {
    seed: PointMetadata,
    points: Vec<Option<Box<PointMetadata>>>,
    last: Option<usize>,
}

impl Default for PointTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PointTable {
    pub(crate) const fn new() -> Self {
        Self {
            seed: PointMetadata::new(0),
            points: Vec::new(),
            last: None,
        }
    }

    /// Returns the active point, or the seed before the first tuple.
    pub(crate) fn last_mut(&mut self) -> &mut PointMetadata {
        match self.last {
            Some(index) => match self.points.get_mut(index) {
                Some(Some(point)) => point,
                _ => &mut self.seed,
            },
            None => &mut self.seed,
        }
    }

    /// Returns the point for `id`, creating it on first sight.
    pub(crate) fn point_mut(&mut self, id: u32) -> &mut PointMetadata {
        let index = id as usize;
        if index >= self.points.len() {
            self.points.resize_with(index + 1, || None);
        }
        self.points[index].get_or_insert_with(|| Box::new(PointMetadata::for_point(id)))
    }

    pub(crate) fn set_last(&mut self, id: u32) {
        self.last = Some(id as usize);
    }

    /// Number of distinct points seen.
    pub(crate) fn len(&self) -> usize {
        self.points.iter().filter(|point| point.is_some()).count()
    }
}
