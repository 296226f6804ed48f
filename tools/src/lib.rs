//! Encoding, decoding and inspection tools for TSSC block streams.
//!
//! This crate backs the `tssc-tools` binary:
//!
//! - Encode JSON measurement records into framed blocks
//! - Decode a block stream back into records
//! - Inspect per-block sizes, sequence numbers and compression ratios
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use anyhow::{anyhow, bail, Context, Result};
use codec::{
    BlockOutcome, CodecLimits, DecodeSession, EncodeSession, Measurement, PointId, WireLimits,
    MEASUREMENT_HEADROOM,
};
use serde::{Deserialize, Serialize};

/// Uncompressed size of one tuple: id, timestamp, quality and value.
pub const RAW_MEASUREMENT_BYTES: usize = 4 + 8 + 4 + 4;

/// JSON form of one measurement.
///
/// `value_bits` carries the exact IEEE-754 pattern and wins over `value` when
/// both are present; `value` alone is enough for hand-written input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub id: u32,
    pub timestamp: i64,
    #[serde(default)]
    pub quality: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_bits: Option<u32>,
}

impl MeasurementRecord {
    /// Converts the record into a codec measurement.
    pub fn to_measurement(&self) -> Result<Measurement> {
        let value = match (self.value_bits, self.value) {
            (Some(bits), _) => f32::from_bits(bits),
            (None, Some(value)) => value,
            (None, None) => bail!("record for point {} has no value", self.id),
        };
        Ok(Measurement::new(
            PointId::new(self.id),
            self.timestamp,
            self.quality,
            value,
        ))
    }
}

impl From<&Measurement> for MeasurementRecord {
    fn from(measurement: &Measurement) -> Self {
        Self {
            id: measurement.id.raw(),
            timestamp: measurement.timestamp,
            quality: measurement.quality,
            value: measurement.value.is_finite().then_some(measurement.value),
            value_bits: Some(measurement.value_bits()),
        }
    }
}

/// Summary of one block in a stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockReport {
    pub version: u8,
    pub sequence: u16,
    pub bytes: usize,
    pub measurements: usize,
    pub distinct_points: usize,
    /// Smallest and largest decoded timestamp.
    pub timestamp_range: Option<(i64, i64)>,
    /// Set when the block could not be decoded in stream order.
    pub error: Option<String>,
}

impl BlockReport {
    /// Compressed bytes per measurement, or `None` for an empty block.
    pub fn bytes_per_measurement(&self) -> Option<f64> {
        (self.measurements > 0).then(|| self.bytes as f64 / self.measurements as f64)
    }

    /// Raw tuple size over framed block size.
    pub fn compression_ratio(&self) -> Option<f64> {
        self.bytes_per_measurement()
            .map(|bytes| RAW_MEASUREMENT_BYTES as f64 / bytes)
    }
}

/// Summary of a whole block stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub blocks: Vec<BlockReport>,
    pub total_bytes: usize,
    pub total_measurements: usize,
}

impl InspectReport {
    /// Uncompressed over compressed size, or `None` when nothing was decoded.
    pub fn compression_ratio(&self) -> Option<f64> {
        (self.total_bytes > 0 && self.total_measurements > 0).then(|| {
            (self.total_measurements * RAW_MEASUREMENT_BYTES) as f64 / self.total_bytes as f64
        })
    }
}

/// Encodes records into framed blocks of at most `block_size` bytes.
pub fn encode_records(
    records: &[MeasurementRecord],
    block_size: usize,
    limits: &CodecLimits,
) -> Result<Vec<Vec<u8>>> {
    let minimum = wire::HEADER_SIZE + MEASUREMENT_HEADROOM;
    if block_size < minimum {
        bail!("block size {block_size} is below the minimum of {minimum} bytes");
    }
    let measurements = records
        .iter()
        .map(MeasurementRecord::to_measurement)
        .collect::<Result<Vec<_>>>()?;

    let mut session = EncodeSession::with_limits(limits.clone());
    let mut scratch = vec![0u8; block_size];
    let mut blocks = Vec::new();
    let mut pending = measurements.as_slice();
    loop {
        let block = session
            .encode_block(pending, &mut scratch)
            .with_context(|| format!("encode block {}", blocks.len()))?;
        blocks.push(scratch[..block.len].to_vec());
        pending = &pending[block.consumed..];
        if pending.is_empty() {
            break;
        }
    }
    Ok(blocks)
}

/// Decodes a block stream in order; any block that fails aborts the decode.
pub fn decode_blocks(
    blocks: &[Vec<u8>],
    wire_limits: &WireLimits,
    limits: &CodecLimits,
) -> Result<Vec<MeasurementRecord>> {
    let mut session = DecodeSession::with_limits(wire_limits.clone(), limits.clone());
    let mut out = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        match session
            .decode_block(block, &mut out)
            .with_context(|| format!("decode block {index}"))?
        {
            BlockOutcome::Decoded { .. } => {}
            BlockOutcome::AwaitingReset => {
                return Err(anyhow!("block {index} skipped while awaiting a stream reset"));
            }
        }
    }
    Ok(out.iter().map(MeasurementRecord::from).collect())
}

/// Decodes a block stream and reports per-block statistics.
///
/// Unlike [`decode_blocks`] this keeps going after a failure, so the report
/// shows where a stream lost synchronization and where it recovered.
pub fn inspect_blocks(
    blocks: &[Vec<u8>],
    wire_limits: &WireLimits,
    limits: &CodecLimits,
) -> InspectReport {
    let mut session = DecodeSession::with_limits(wire_limits.clone(), limits.clone());
    let mut reports = Vec::with_capacity(blocks.len());
    let mut out = Vec::new();
    for block in blocks {
        let (version, sequence) = wire::decode_block(block, wire_limits)
            .map(|frame| (frame.header.version, frame.header.sequence.raw()))
            .unwrap_or_default();
        out.clear();
        let error = match session.decode_block(block, &mut out) {
            Ok(BlockOutcome::Decoded { .. }) => None,
            Ok(BlockOutcome::AwaitingReset) => Some("awaiting reset".to_string()),
            Err(err) => Some(err.to_string()),
        };
        let distinct_points = out
            .iter()
            .map(|measurement| measurement.id)
            .collect::<BTreeSet<_>>()
            .len();
        let timestamp_range = out
            .iter()
            .map(|measurement| measurement.timestamp)
            .fold(None, |range, timestamp| match range {
                None => Some((timestamp, timestamp)),
                Some((low, high)) => Some((i64::min(low, timestamp), i64::max(high, timestamp))),
            });
        reports.push(BlockReport {
            version,
            sequence,
            bytes: block.len(),
            measurements: out.len(),
            distinct_points,
            timestamp_range,
            error,
        });
    }
    InspectReport {
        total_bytes: reports.iter().map(|report| report.bytes).sum(),
        total_measurements: reports.iter().map(|report| report.measurements).sum(),
        blocks: reports,
    }
}

/// Renders records one per line.
pub fn format_records_pretty(records: &[MeasurementRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let value = record
            .value_bits
            .map(f32::from_bits)
            .or(record.value)
            .unwrap_or(f32::NAN);
        let _ = writeln!(
            out,
            "point {:>6}  ts {:>20}  quality 0x{:08x}  value {}",
            record.id, record.timestamp, record.quality, value
        );
    }
    out
}
