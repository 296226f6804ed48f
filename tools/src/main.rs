use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::{CodecLimits, WireLimits};
use glob::Pattern;
use log::info;
use tssc_tools::{
    decode_blocks, encode_records, format_records_pretty, inspect_blocks, InspectReport,
    MeasurementRecord,
};

const BLOCK_EXTENSION: &str = "bin";

#[derive(Parser)]
#[command(
    name = "tssc-tools",
    version,
    about = "TSSC block stream encoding and inspection tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode JSON measurement records into a directory of block files.
    Encode {
        /// JSON array of measurement records.
        input: PathBuf,
        /// Directory that receives one file per block.
        #[arg(long)]
        out: PathBuf,
        /// Maximum framed block size in bytes.
        #[arg(long, default_value_t = 1400)]
        block_bytes: usize,
    },
    /// Decode a block stream into measurement records.
    Decode {
        /// A block file, or a directory of block files decoded in name order.
        path: PathBuf,
        /// Optional glob filter when decoding a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Inspect block sizes, sequence numbers and compression ratios.
    Inspect {
        /// A block file, or a directory of block files decoded in name order.
        path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected blocks.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of printed blocks (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Encode {
            input,
            out,
            block_bytes,
        } => {
            let contents = fs::read_to_string(&input)
                .with_context(|| format!("read records {}", input.display()))?;
            let records: Vec<MeasurementRecord> =
                serde_json::from_str(&contents).context("parse records json")?;
            let blocks = encode_records(&records, block_bytes, &CodecLimits::default())?;
            fs::create_dir_all(&out).with_context(|| format!("create dir {}", out.display()))?;
            for (index, block) in blocks.iter().enumerate() {
                let path = out.join(format!("block-{index:06}.{BLOCK_EXTENSION}"));
                fs::write(&path, block).with_context(|| format!("write {}", path.display()))?;
            }
            let total: usize = blocks.iter().map(Vec::len).sum();
            info!(
                "encoded {} measurements into {} blocks ({total} bytes)",
                records.len(),
                blocks.len()
            );
        }
        Command::Decode { path, glob, format } => {
            let blocks = read_blocks(&path, glob.as_deref())?;
            let records =
                decode_blocks(&blocks, &WireLimits::default(), &CodecLimits::default())?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&records).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_records_pretty(&records));
                }
            }
        }
        Command::Inspect {
            path,
            glob,
            sort,
            limit,
            json,
        } => {
            let entries = collect_block_entries(&path, glob.as_deref())?;
            let blocks = entries
                .iter()
                .map(|entry| {
                    fs::read(&entry.path)
                        .with_context(|| format!("read block {}", entry.path.display()))
                })
                .collect::<Result<Vec<_>>>()?;
            let report = inspect_blocks(&blocks, &WireLimits::default(), &CodecLimits::default());
            if json {
                let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                println!("{json}");
            } else {
                print_inspect_report(&entries, &report, sort, limit);
            }
        }
    }
    Ok(())
}

struct BlockEntry {
    path: PathBuf,
    size: u64,
}

fn read_blocks(path: &Path, glob: Option<&str>) -> Result<Vec<Vec<u8>>> {
    collect_block_entries(path, glob)?
        .iter()
        .map(|entry| {
            fs::read(&entry.path).with_context(|| format!("read block {}", entry.path.display()))
        })
        .collect()
}

/// Lists block files in stream order (by file name).
fn collect_block_entries(path: &Path, glob: Option<&str>) -> Result<Vec<BlockEntry>> {
    if !path.is_dir() {
        let size = fs::metadata(path)
            .with_context(|| format!("stat {}", path.display()))?
            .len();
        return Ok(vec![BlockEntry {
            path: path.to_path_buf(),
            size,
        }]);
    }

    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("read dir {}", path.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = match &pattern {
            Some(pattern) => {
                pattern.matches_path(&path)
                    || path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| pattern.matches(name))
            }
            None => path
                .extension()
                .is_some_and(|extension| extension == BLOCK_EXTENSION),
        };
        if !matches {
            continue;
        }
        let size = entry.metadata()?.len();
        entries.push(BlockEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn print_inspect_report(
    entries: &[BlockEntry],
    report: &InspectReport,
    sort: Option<InspectSort>,
    limit: Option<usize>,
) {
    let mut rows: Vec<_> = entries.iter().zip(&report.blocks).collect();
    if let Some(InspectSort::Size) = sort {
        rows.sort_by(|a, b| b.0.size.cmp(&a.0.size).then_with(|| a.0.path.cmp(&b.0.path)));
    }
    if let Some(limit) = limit.or(sort.map(|InspectSort::Size| 10)) {
        rows.truncate(limit);
    }

    for (entry, block) in rows {
        let density = block
            .bytes_per_measurement()
            .map_or_else(|| "n/a".to_string(), |value| format!("{value:.2} B/measurement"));
        let ratio = block
            .compression_ratio()
            .map_or_else(String::new, |ratio| format!(", {ratio:.2}x vs raw"));
        println!(
            "{}: version {} seq {} {} bytes, {} measurements over {} points ({density}{ratio})",
            entry.path.display(),
            block.version,
            block.sequence,
            block.bytes,
            block.measurements,
            block.distinct_points
        );
        if let Some((first, last)) = block.timestamp_range {
            println!("  timestamps: {first}..={last}");
        }
        if let Some(error) = &block.error {
            println!("  error: {error}");
        }
    }

    println!(
        "total: {} blocks, {} bytes, {} measurements",
        report.blocks.len(),
        report.total_bytes,
        report.total_measurements
    );
    if let Some(ratio) = report.compression_ratio() {
        println!("compression ratio: {ratio:.2}x");
    }
}
