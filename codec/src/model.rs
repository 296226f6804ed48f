//! Adaptive per-point code model.
//!
//! Each point carries a small statistics window over the codes written while
//! it was the active point. At fixed checkpoints the window picks whichever
//! of four prefix layouts would have encoded it in the fewest bits, so codes
//! a point uses constantly shrink to one, two or three bits.
//!
//! Encoder and decoder run the same model over the same code sequence, so
//! both sides switch layouts after exactly the same code.

use std::fmt;

use bitstream::{BitResult, BitSink, BitSource};
use log::trace;
use wire::{CodeWord, CODE_COUNT};

/// Prefix layout used to write a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeMode {
    /// Every code as five raw bits.
    Raw,
    /// One hot code as `1`; any other code as `0` plus five bits.
    OneHot(CodeWord),
    /// Hot codes as `1` and `01`; any other code as `00` plus five bits.
    TwoHot(CodeWord, CodeWord),
    /// Hot codes as `1`, `01` and `001`; any other code as `000` plus five bits.
    ThreeHot(CodeWord, CodeWord, CodeWord),
}

impl CodeMode {
    /// Returns the protocol mode number (1-4).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Raw => 1,
            Self::OneHot(..) => 2,
            Self::TwoHot(..) => 3,
            Self::ThreeHot(..) => 4,
        }
    }

    /// Returns the number of bits this layout spends on `code`.
    #[must_use]
    pub fn cost(self, code: CodeWord) -> u32 {
        match self {
            Self::Raw => 5,
            Self::OneHot(h1) => {
                if code == h1 {
                    1
                } else {
                    6
                }
            }
            Self::TwoHot(h1, h2) => match code {
                c if c == h1 => 1,
                c if c == h2 => 2,
                _ => 7,
            },
            Self::ThreeHot(h1, h2, h3) => match code {
                c if c == h1 => 1,
                c if c == h2 => 2,
                c if c == h3 => 3,
                _ => 8,
            },
        }
    }
}

impl fmt::Display for CodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "mode 1"),
            Self::OneHot(h1) => write!(f, "mode 2 [{h1}]"),
            Self::TwoHot(h1, h2) => write!(f, "mode 3 [{h1}, {h2}]"),
            Self::ThreeHot(h1, h2, h3) => write!(f, "mode 4 [{h1}, {h2}, {h3}]"),
        }
    }
}

/// Adaptation checkpoints: after more than 5 codes, then more than 20, then
/// every time more than 100 have been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Startup {
    First,
    Second,
    Steady,
}

/// Adaptive code model owned by one point.
#[derive(Debug, Clone)]
pub struct CodeModel {
    mode: CodeMode,
    startup: Startup,
    sent: u8,
    stats: [u8; CODE_COUNT],
}

impl Default for CodeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeModel {
    /// Creates a model primed for a point that mostly repeats its values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: CodeMode::ThreeHot(CodeWord::Value1, CodeWord::Value2, CodeWord::Value3),
            startup: Startup::First,
            sent: 0,
            stats: [0; CODE_COUNT],
        }
    }

    /// Returns the current prefix layout.
    #[must_use]
    pub const fn mode(&self) -> CodeMode {
        self.mode
    }

    /// Writes `code` with the current layout, then updates the statistics.
    pub fn write_code<S: BitSink + ?Sized>(
        &mut self,
        code: CodeWord,
        sink: &mut S,
    ) -> BitResult<()> {
        let raw = u32::from(code.raw());
        match self.mode {
            CodeMode::Raw => sink.write_bits(raw, 5)?,
            CodeMode::OneHot(h1) => {
                if code == h1 {
                    sink.write_bits(1, 1)?;
                } else {
                    sink.write_bits(raw, 6)?;
                }
            }
            CodeMode::TwoHot(h1, h2) => {
                if code == h1 {
                    sink.write_bits(1, 1)?;
                } else if code == h2 {
                    sink.write_bits(1, 2)?;
                } else {
                    sink.write_bits(raw, 7)?;
                }
            }
            CodeMode::ThreeHot(h1, h2, h3) => {
                if code == h1 {
                    sink.write_bits(1, 1)?;
                } else if code == h2 {
                    sink.write_bits(1, 2)?;
                } else if code == h3 {
                    sink.write_bits(1, 3)?;
                } else {
                    sink.write_bits(raw, 8)?;
                }
            }
        }
        self.record(code);
        Ok(())
    }

    /// Reads one code with the current layout, then updates the statistics.
    pub fn read_code<S: BitSource + ?Sized>(&mut self, source: &mut S) -> BitResult<CodeWord> {
        let code = match self.mode {
            CodeMode::Raw => read_raw(source)?,
            CodeMode::OneHot(h1) => {
                if source.read_bit()? {
                    h1
                } else {
                    read_raw(source)?
                }
            }
            CodeMode::TwoHot(h1, h2) => {
                if source.read_bit()? {
                    h1
                } else if source.read_bit()? {
                    h2
                } else {
                    read_raw(source)?
                }
            }
            CodeMode::ThreeHot(h1, h2, h3) => {
                if source.read_bit()? {
                    h1
                } else if source.read_bit()? {
                    h2
                } else if source.read_bit()? {
                    h3
                } else {
                    read_raw(source)?
                }
            }
        };
        self.record(code);
        Ok(code)
    }

    fn record(&mut self, code: CodeWord) {
        self.sent += 1;
        self.stats[code.index()] += 1;

        match self.startup {
            Startup::First if self.sent > 5 => {
                self.startup = Startup::Second;
                self.adapt();
            }
            Startup::Second if self.sent > 20 => {
                self.startup = Startup::Steady;
                self.adapt();
            }
            Startup::Steady if self.sent > 100 => self.adapt(),
            _ => {}
        }
    }

    /// Picks the cheapest layout for the statistics window and clears it.
    fn adapt(&mut self) {
        // Ascending scan with strict comparisons: on equal counts the lower
        // code keeps the better rank.
        let mut ranked = [
            (CodeWord::EndOfStream, 0u32),
            (CodeWord::PointIdXor4, 0),
            (CodeWord::PointIdXor8, 0),
        ];
        let mut total = 0u32;
        for (code, slot) in CodeWord::ALL.iter().zip(self.stats.iter_mut()) {
            let count = u32::from(std::mem::take(slot));
            total += count;
            if count > ranked[2].1 {
                if count > ranked[0].1 {
                    ranked = [(*code, count), ranked[0], ranked[1]];
                } else if count > ranked[1].1 {
                    ranked = [ranked[0], (*code, count), ranked[1]];
                } else {
                    ranked[2] = (*code, count);
                }
            }
        }

        let [(code1, count1), (code2, count2), (code3, count3)] = ranked;
        let candidates = [
            (CodeMode::Raw, total * 5),
            (CodeMode::OneHot(code1), count1 + (total - count1) * 6),
            (
                CodeMode::TwoHot(code1, code2),
                count1 + count2 * 2 + (total - count1 - count2) * 7,
            ),
            (
                CodeMode::ThreeHot(code1, code2, code3),
                count1 + count2 * 2 + count3 * 3 + (total - count1 - count2 - count3) * 8,
            ),
        ];

        // First minimum wins, so ties go to the lower mode.
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1 < best.1 {
                best = *candidate;
            }
        }

        if best.0 != self.mode {
            trace!(
                "code model switched from {} to {} after {} codes",
                self.mode,
                best.0,
                self.sent
            );
        }
        self.mode = best.0;
        self.sent = 0;
    }
}

fn read_raw<S: BitSource + ?Sized>(source: &mut S) -> BitResult<CodeWord> {
    let raw = source.read_bits(5)?;
    Ok(CodeWord::from_bits5(raw as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::{BitReader, BitWriter};

    /// Counts bits instead of storing them.
    #[derive(Default)]
    struct CountingSink {
        bits: u32,
    }

    impl BitSink for CountingSink {
        fn write_bits(&mut self, _value: u32, bits: u8) -> BitResult<()> {
            self.bits += u32::from(bits);
            Ok(())
        }
    }

    fn feed(model: &mut CodeModel, codes: &[CodeWord]) -> u32 {
        let mut sink = CountingSink::default();
        for code in codes {
            model.write_code(*code, &mut sink).unwrap();
        }
        sink.bits
    }

    #[test]
    fn initial_mode_favours_repeated_values() {
        let model = CodeModel::new();
        assert_eq!(model.mode().number(), 4);
        assert_eq!(model.mode().cost(CodeWord::Value1), 1);
        assert_eq!(model.mode().cost(CodeWord::Value2), 2);
        assert_eq!(model.mode().cost(CodeWord::Value3), 3);
        assert_eq!(model.mode().cost(CodeWord::TimeXor7Bit), 8);
    }

    #[test]
    fn prefix_bit_patterns() {
        let cases = [
            (CodeMode::Raw, CodeWord::ValueXor32, 0b11111u32, 5u8),
            (CodeMode::OneHot(CodeWord::Value1), CodeWord::Value1, 0b1, 1),
            (CodeMode::OneHot(CodeWord::Value1), CodeWord::Quality2, 0b01_0010, 6),
            (CodeMode::TwoHot(CodeWord::Value1, CodeWord::Value2), CodeWord::Value2, 0b01, 2),
            (CodeMode::TwoHot(CodeWord::Value1, CodeWord::Value2), CodeWord::Value3, 0b001_0110, 7),
            (
                CodeMode::ThreeHot(CodeWord::Value1, CodeWord::Value2, CodeWord::Value3),
                CodeWord::Value3,
                0b001,
                3,
            ),
        ];
        for (mode, code, pattern, bits) in cases {
            let mut model = CodeModel::new();
            model.mode = mode;
            let mut buf = [0u8; 2];
            let mut writer = BitWriter::new(&mut buf);
            model.write_code(code, &mut writer).unwrap();
            writer.finish().unwrap();

            let mut reader = BitReader::new(&buf);
            assert_eq!(reader.read_bits(bits).unwrap(), pattern, "{mode} {code}");
        }
    }

    #[test]
    fn adaptation_schedule() {
        // First switch after the sixth code.
        let mut model = CodeModel::new();
        feed(&mut model, &[CodeWord::TimeXor7Bit; 5]);
        assert_eq!(model.mode().number(), 4);
        feed(&mut model, &[CodeWord::TimeXor7Bit]);
        assert_eq!(model.mode(), CodeMode::OneHot(CodeWord::TimeXor7Bit));

        // Second switch after 21 more codes.
        feed(&mut model, &[CodeWord::Quality2; 20]);
        assert_eq!(model.mode(), CodeMode::OneHot(CodeWord::TimeXor7Bit));
        feed(&mut model, &[CodeWord::Quality2]);
        assert_eq!(model.mode(), CodeMode::OneHot(CodeWord::Quality2));

        // Steady state: every 101 codes.
        feed(&mut model, &[CodeWord::ValueZero; 100]);
        assert_eq!(model.mode(), CodeMode::OneHot(CodeWord::Quality2));
        feed(&mut model, &[CodeWord::ValueZero]);
        assert_eq!(model.mode(), CodeMode::OneHot(CodeWord::ValueZero));
    }

    #[test]
    fn uniform_codes_fall_back_to_raw() {
        let mut model = CodeModel::new();
        let codes: Vec<CodeWord> = CodeWord::ALL.iter().copied().cycle().take(6).collect();
        feed(&mut model, &codes);
        // Six distinct codes: raw costs 30, every hot layout costs more.
        assert_eq!(model.mode(), CodeMode::Raw);
    }

    #[test]
    fn ties_prefer_lower_mode_and_lower_code() {
        let mut model = CodeModel::new();
        // Two codes with three hits each: raw 30, one-hot 21, two-hot 9, three-hot 9.
        feed(
            &mut model,
            &[
                CodeWord::Value3,
                CodeWord::Value2,
                CodeWord::Value3,
                CodeWord::Value2,
                CodeWord::Value3,
                CodeWord::Value2,
            ],
        );
        assert_eq!(model.mode(), CodeMode::TwoHot(CodeWord::Value2, CodeWord::Value3));
    }

    #[test]
    fn statistics_reset_after_adaptation() {
        let mut model = CodeModel::new();
        feed(&mut model, &[CodeWord::Quality2; 6]);
        assert!(model.stats.iter().all(|count| *count == 0));
        assert_eq!(model.sent, 0);
    }

    #[test]
    fn reader_tracks_writer() {
        let codes: Vec<CodeWord> = (0..400usize)
            .map(|i| match i % 10 {
                0 => CodeWord::ALL[(i / 10) % CODE_COUNT],
                1 | 2 => CodeWord::Value2,
                _ => CodeWord::Value1,
            })
            .collect();

        let mut buf = vec![0u8; codes.len()];
        let mut writer = BitWriter::new(&mut buf);
        let mut encoder_model = CodeModel::new();
        let mut modes = Vec::with_capacity(codes.len());
        for code in &codes {
            encoder_model.write_code(*code, &mut writer).unwrap();
            modes.push(encoder_model.mode());
        }
        let len = writer.finish().unwrap();

        let mut reader = BitReader::new(&buf[..len]);
        let mut decoder_model = CodeModel::new();
        for (code, mode) in codes.iter().zip(&modes) {
            assert_eq!(decoder_model.read_code(&mut reader).unwrap(), *code);
            assert_eq!(decoder_model.mode(), *mode);
        }
    }

    #[test]
    fn skewed_stream_is_cheaper_than_raw() {
        let codes: Vec<CodeWord> = (0..1000)
            .map(|i| if i % 20 == 0 { CodeWord::ValueXor8 } else { CodeWord::Value1 })
            .collect();
        let mut model = CodeModel::new();
        let bits = feed(&mut model, &codes);
        assert!(bits * 2 < 5 * codes.len() as u32, "{bits} bits");
    }
}
