//! Geddon CLI - Command-line tool for AYGP archives and M5K textures.
//!
//! This is the main entry point for the Geddon command-line application.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use geddon::m5k::{convert_folder_parallel, find_files, locate};
use geddon::prelude::*;

/// Geddon - AYGP archive and M5K texture extraction tool
#[derive(Parser)]
#[command(name = "geddon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unpack an AYGP archive
    AygpExtract {
        /// Path to the AYGP file
        #[arg(short, long, env = "INPUT_AYGP")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,
    },

    /// List contents of an AYGP archive
    AygpList {
        /// Path to the AYGP file
        #[arg(short, long, env = "INPUT_AYGP")]
        input: PathBuf,
    },

    /// Convert every M5K container under a folder to PNG
    M5kConvert {
        /// Folder to search
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        input: PathBuf,

        /// Extension of the containers, without the dot
        #[arg(short, long, default_value = "m5k")]
        extension: String,

        /// Replace existing PNG files
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        overwrite: bool,
    },

    /// Show the pixel block header of an M5K container
    M5kInfo {
        /// Input M5K file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::AygpExtract { input, output } => {
            cmd_aygp_extract(&input, &output)?;
        }
        Commands::AygpList { input } => {
            cmd_aygp_list(&input)?;
        }
        Commands::M5kConvert {
            input,
            extension,
            overwrite,
        } => {
            cmd_m5k_convert(&input, M5kBatchOptions { extension, overwrite })?;
        }
        Commands::M5kInfo { input } => {
            cmd_m5k_info(&input)?;
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn cmd_aygp_extract(input: &Path, output: &Path) -> Result<()> {
    println!("Opening AYGP archive: {}", input.display());

    let start = Instant::now();
    let mut archive = AygpArchive::open(input).context("Failed to open AYGP archive")?;
    let count = archive.entries().context("Failed to read archive tree")?.len();

    println!("Found {} files in {:?}", count, start.elapsed());
    println!("Extracting to {}...", output.display());

    let pb = progress_bar(count)?;
    let start = Instant::now();
    let stats = archive
        .unpack_with_progress(output, |_| pb.inc(1))
        .context("Failed to unpack archive")?;

    pb.finish_with_message("Done");
    println!(
        "Extracted {} files in {} folders ({} bytes) in {:?}",
        stats.files,
        stats.folders,
        stats.bytes,
        start.elapsed()
    );

    Ok(())
}

fn cmd_aygp_list(input: &Path) -> Result<()> {
    let mut archive = AygpArchive::open(input).context("Failed to open AYGP archive")?;
    let entries = archive.entries().context("Failed to read archive tree")?;

    let mut total = 0u64;
    for entry in &entries {
        println!("{:>12} {}", entry.size, entry.name());
        total += u64::from(entry.size);
    }

    println!("\nTotal: {} entries, {} bytes", entries.len(), total);

    Ok(())
}

fn cmd_m5k_convert(input: &Path, options: M5kBatchOptions) -> Result<()> {
    println!("Scanning {} for .{} files", input.display(), options.extension);

    let count = find_files(input, &options.extension)
        .context("Failed to scan input folder")?
        .len();
    let pb = progress_bar(count)?;

    let start = Instant::now();
    let report = convert_folder_parallel(input, &options, |_| pb.inc(1))
        .context("Failed to convert folder")?;

    pb.finish_with_message("Done");

    for (path, error) in &report.failed {
        eprintln!("Error converting {}: {}", path.display(), error);
    }
    println!(
        "Converted {} textures in {:?} ({} without texture, {} empty, {} skipped, {} errors)",
        report.written.len(),
        start.elapsed(),
        report.no_texture,
        report.empty,
        report.skipped,
        report.failed.len()
    );

    Ok(())
}

fn cmd_m5k_info(input: &Path) -> Result<()> {
    let mut cursor = MappedCursor::open(input).context("Failed to open M5K file")?;

    let Some(block) = locate(&mut cursor).context("Failed to scan M5K file")? else {
        println!("No pixel block found");
        return Ok(());
    };

    println!("Header offset:   {:#x}", block.header_offset);
    println!("Data offset:     {:#x}", block.data_offset);
    println!("Tags:            {} / {}", block.tag_a, block.tag_b);
    println!("Dimensions:      {}x{}", block.width, block.height);
    println!("Compressed size: {}", block.compressed_size);
    println!("Decoded size:    {}", block.pixel_len());

    Ok(())
}
