use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use codec::{BlockOutcome, CodecLimits, DecodeSession, EncodeSession, Measurement, WireLimits};
use log::{debug, info};
use serde::Serialize;
use simbench::{generate, ScenarioConfig, SerdeMeasurement, FRAME_TICKS};

#[derive(Parser)]
#[command(
    name = "simbench",
    version,
    about = "TSSC simulation benchmark harness"
)]
struct Cli {
    /// Number of simulated points per frame.
    #[arg(long, default_value_t = 64)]
    points: u32,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 300)]
    frames: u32,
    /// Frame cadence in 100 ns ticks.
    #[arg(long, default_value_t = FRAME_TICKS)]
    interval_ticks: i64,
    /// Maximum timestamp jitter per frame in 100 ns ticks.
    #[arg(long, default_value_t = 0)]
    jitter: i64,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Optional burst event cadence in frames.
    #[arg(long)]
    burst_every: Option<u32>,
    /// Framed block size in bytes.
    #[arg(long, default_value_t = 1400)]
    block_bytes: usize,
    /// Output directory for summary.json.
    #[arg(long, default_value = "target/simbench")]
    out_dir: PathBuf,
    /// Fail if p95 block size exceeds this value.
    #[arg(long)]
    max_p95_block_bytes: Option<u64>,
    /// Fail if average compressed bits per measurement exceed this value.
    #[arg(long)]
    max_bits_per_measurement: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let limits = CodecLimits::default();
    let wire_limits = WireLimits::default();

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create output dir {}", cli.out_dir.display()))?;

    let config = ScenarioConfig {
        points: cli.points,
        frames: cli.frames,
        interval_ticks: cli.interval_ticks,
        jitter_ticks: cli.jitter,
        seed: cli.seed,
        burst_every: cli.burst_every,
    };
    let feed = generate(&config);
    info!("generated {} measurements", feed.len());

    let mut summary = Summary::new(&config, cli.block_bytes);
    summary.bincode_bytes_total = encode_bincode(&feed)? as u64;

    let frame_len = config.points as usize;
    let blocks = encode_feed(&feed, frame_len, cli.block_bytes, &limits, &mut summary)?;
    let decoded = decode_feed(&blocks, &wire_limits, &limits, &mut summary)?;
    if decoded != feed {
        anyhow::bail!("decoded feed does not match the generated feed");
    }

    summary.finalize();
    summary.assert_budgets(cli.max_p95_block_bytes, cli.max_bits_per_measurement)?;
    write_summary_json(&cli.out_dir, &summary)?;
    info!(
        "{} blocks, {:.2} bits per measurement, {:.2}x vs raw",
        summary.block_count, summary.bits_per_measurement, summary.compression_ratio
    );

    Ok(())
}

fn write_summary_json(out_dir: &Path, summary: &Summary) -> Result<()> {
    let path = out_dir.join("summary.json");
    let contents = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Encodes the feed one frame at a time, as a publisher would send it.
fn encode_feed(
    feed: &[Measurement],
    frame_len: usize,
    block_bytes: usize,
    limits: &CodecLimits,
    summary: &mut Summary,
) -> Result<Vec<Vec<u8>>> {
    let mut session = EncodeSession::with_limits(limits.clone());
    let mut buf = vec![0u8; block_bytes];
    let mut blocks = Vec::new();
    for frame in feed.chunks(frame_len.max(1)) {
        let mut pending = frame;
        while !pending.is_empty() {
            let start = Instant::now();
            let block = session
                .encode_block(pending, &mut buf)
                .context("encode block")?;
            summary.encode_us.push(start.elapsed().as_micros() as u64);
            debug!(
                "block {}: {} measurements in {} bytes",
                block.sequence, block.consumed, block.len
            );

            summary.block_sizes.push(block.len as u64);
            summary.encoded_bytes_total += block.len as u64;
            blocks.push(buf[..block.len].to_vec());
            pending = &pending[block.consumed..];
        }
    }
    summary.block_count = blocks.len() as u32;
    Ok(blocks)
}

fn decode_feed(
    blocks: &[Vec<u8>],
    wire_limits: &WireLimits,
    limits: &CodecLimits,
    summary: &mut Summary,
) -> Result<Vec<Measurement>> {
    let mut session = DecodeSession::with_limits(wire_limits.clone(), limits.clone());
    let mut out = Vec::new();
    for block in blocks {
        let start = Instant::now();
        let outcome = session.decode_block(block, &mut out).context("decode block")?;
        summary.decode_us.push(start.elapsed().as_micros() as u64);
        if outcome == BlockOutcome::AwaitingReset {
            anyhow::bail!("decoder lost synchronization on an in-order stream");
        }
    }
    Ok(out)
}

fn encode_bincode(feed: &[Measurement]) -> Result<usize> {
    let records: Vec<SerdeMeasurement> = feed.iter().map(SerdeMeasurement::from).collect();
    let bytes = bincode::serialize(&records).context("bincode feed")?;
    Ok(bytes.len())
}

/// Uncompressed size of one tuple: id, timestamp, quality and value.
const RAW_MEASUREMENT_BYTES: u64 = 4 + 8 + 4 + 4;

#[derive(Debug, Serialize)]
struct Summary {
    points: u32,
    frames: u32,
    interval_ticks: i64,
    jitter_ticks: i64,
    seed: u64,
    burst_every: Option<u32>,
    block_bytes: usize,
    measurements: u64,
    block_count: u32,
    raw_bytes_total: u64,
    encoded_bytes_total: u64,
    bincode_bytes_total: u64,
    avg_block_bytes: u64,
    p95_block_bytes: u64,
    bits_per_measurement: f64,
    compression_ratio: f64,
    bincode_ratio: f64,
    avg_encode_us: u64,
    p95_encode_us: u64,
    avg_decode_us: u64,
    p95_decode_us: u64,
    #[serde(skip)]
    block_sizes: Vec<u64>,
    #[serde(skip)]
    encode_us: Vec<u64>,
    #[serde(skip)]
    decode_us: Vec<u64>,
}

impl Summary {
    fn new(config: &ScenarioConfig, block_bytes: usize) -> Self {
        let measurements = u64::from(config.points) * u64::from(config.frames);
        Self {
            points: config.points,
            frames: config.frames,
            interval_ticks: config.interval_ticks,
            jitter_ticks: config.jitter_ticks,
            seed: config.seed,
            burst_every: config.burst_every,
            block_bytes,
            measurements,
            block_count: 0,
            raw_bytes_total: measurements * RAW_MEASUREMENT_BYTES,
            encoded_bytes_total: 0,
            bincode_bytes_total: 0,
            avg_block_bytes: 0,
            p95_block_bytes: 0,
            bits_per_measurement: 0.0,
            compression_ratio: 0.0,
            bincode_ratio: 0.0,
            avg_encode_us: 0,
            p95_encode_us: 0,
            avg_decode_us: 0,
            p95_decode_us: 0,
            block_sizes: Vec::new(),
            encode_us: Vec::new(),
            decode_us: Vec::new(),
        }
    }

    fn finalize(&mut self) {
        if self.block_count > 0 {
            self.avg_block_bytes = self.encoded_bytes_total / u64::from(self.block_count);
            self.p95_block_bytes = p95(&mut self.block_sizes);
        }
        if self.measurements > 0 {
            self.bits_per_measurement =
                (self.encoded_bytes_total * 8) as f64 / self.measurements as f64;
        }
        if self.encoded_bytes_total > 0 {
            self.compression_ratio = self.raw_bytes_total as f64 / self.encoded_bytes_total as f64;
            self.bincode_ratio = self.bincode_bytes_total as f64 / self.encoded_bytes_total as f64;
        }
        if !self.encode_us.is_empty() {
            let total: u64 = self.encode_us.iter().sum();
            self.avg_encode_us = total / self.encode_us.len() as u64;
            self.p95_encode_us = p95(&mut self.encode_us);
        }
        if !self.decode_us.is_empty() {
            let total: u64 = self.decode_us.iter().sum();
            self.avg_decode_us = total / self.decode_us.len() as u64;
            self.p95_decode_us = p95(&mut self.decode_us);
        }
    }

    fn assert_budgets(&self, max_p95: Option<u64>, max_bits: Option<f64>) -> Result<()> {
        if let Some(max_p95) = max_p95 {
            if self.p95_block_bytes > max_p95 {
                anyhow::bail!(
                    "p95 block bytes {} exceeds budget {}",
                    self.p95_block_bytes,
                    max_p95
                );
            }
        }
        if let Some(max_bits) = max_bits {
            if self.bits_per_measurement > max_bits {
                anyhow::bail!(
                    "{:.2} bits per measurement exceeds budget {}",
                    self.bits_per_measurement,
                    max_bits
                );
            }
        }
        Ok(())
    }
}

fn p95(values: &mut [u64]) -> u64 {
    values.sort_unstable();
    let idx = ((values.len() as f64) * 0.95).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}
