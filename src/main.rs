//! Main entry point for the assetzip CLI application.
//!
//! Each subcommand maps onto one bundle operation: `pack` builds and saves
//! a bundle, `list` and `extract` read one through the archive store, and
//! `load` runs a best-effort bulk decode through the resource cache.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::FmtSubscriber;

use assetzip::bundle::{ArchiveBuilder, ArchiveStore, CompressionLevel, ResourceCache};
use assetzip::cli::Command;
use assetzip::decode::ProbeDecoder;
use assetzip::io::{open_source, save_archive};
use assetzip::zip::ZipExtractor;
use assetzip::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    match &cli.command {
        Command::Pack {
            sources,
            out_dir,
            name,
            level,
        } => pack(sources, Path::new(out_dir), name, *level, &cli).await,
        Command::List { archive, verbose } => list(archive, *verbose).await,
        Command::Extract {
            archive,
            names,
            extract_dir,
        } => extract(archive, names, Path::new(extract_dir), &cli).await,
        Command::Load { archive, names } => load(archive, names, &cli).await,
    }
}

/// Read a whole bundle from a local path or HTTP URL.
async fn fetch_archive(location: &str) -> Result<Vec<u8>> {
    let source = open_source(location)?;
    source.read_all(location).await
}

/// Fetch every source, pack them into one bundle and save it.
async fn pack(sources: &[String], out_dir: &Path, name: &str, level: u32, cli: &Cli) -> Result<()> {
    let mut builder = ArchiveBuilder::with_level(CompressionLevel::new(level)?);

    for location in sources {
        let source = open_source(location)?;
        let entry = builder.add_from_source(source.as_ref(), location).await?;
        if !cli.is_quiet() {
            println!("    adding: {}", entry);
        }
    }

    let blob = builder.build()?;
    let path = save_archive(out_dir, name, &blob).await?;

    if !cli.is_very_quiet() {
        println!(
            "{} entries, {} -> {}",
            builder.len(),
            format_size(blob.len() as u64),
            path.display()
        );
    }

    Ok(())
}

/// List files in the bundle.
///
/// Supports two output formats:
/// - Simple format: Just file names, one per line
/// - Verbose format (`-v`): Table with sizes, compression ratio and method
async fn list(location: &str, verbose: bool) -> Result<()> {
    let blob = fetch_archive(location).await?;
    let entries = ZipExtractor::new(&blob).list_files()?;

    if !verbose {
        for entry in &entries {
            println!("{}", entry.file_name);
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:>6}  {:>10}  {:>5}  Name",
        "Length", "Method", "Size", "Cmpr"
    );
    println!("{}", "-".repeat(50));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        println!(
            "{:>10}  {:>6}  {:>10}  {:>4}%  {}",
            entry.uncompressed_size,
            entry.compression_method.name(),
            entry.compressed_size,
            entry.ratio(),
            entry.file_name
        );

        if !entry.is_directory {
            total_uncompressed += entry.uncompressed_size;
            total_compressed += entry.compressed_size;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(50));
    let total_ratio = if total_uncompressed > 0 && total_compressed < total_uncompressed {
        100 - (total_compressed * 100 / total_uncompressed)
    } else {
        0
    };
    println!(
        "{:>10}  {:>6}  {:>10}  {:>4}%  {} files",
        total_uncompressed, "", total_compressed, total_ratio, file_count
    );

    Ok(())
}

/// Extract entries through the archive store, skipping missing names.
async fn extract(location: &str, names: &[String], extract_dir: &Path, cli: &Cli) -> Result<()> {
    let mut store = ArchiveStore::new();
    store.set_archive(fetch_archive(location).await?);

    let names = if names.is_empty() {
        store.entry_names()?
    } else {
        names.to_vec()
    };

    let mut skipped = 0usize;
    for name in &names {
        let Some(data) = store.extract(name)? else {
            skipped += 1;
            continue;
        };

        let output_path = output_path(extract_dir, name);
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&output_path, data).await?;

        if !cli.is_quiet() {
            println!("  extracting: {}", name);
        }
    }

    if skipped > 0 && !cli.is_very_quiet() {
        eprintln!("{} of {} entries not found", skipped, names.len());
    }

    Ok(())
}

/// Decode entries through the resource cache and print the report.
async fn load(location: &str, names: &[String], cli: &Cli) -> Result<()> {
    let mut cache = ResourceCache::new(ProbeDecoder::new());
    cache.set_archive(fetch_archive(location).await?);

    let names = if names.is_empty() {
        cache.store().entry_names()?
    } else {
        names.to_vec()
    };

    let report = cache.preload(&names)?;

    if !cli.is_very_quiet() {
        println!("loaded {} of {} assets", report.loaded, names.len());
        for name in &report.skipped {
            println!("  skipped: {}", name);
        }
    }

    Ok(())
}

/// Where an entry lands on disk. Path components that could escape
/// `extract_dir` are dropped.
fn output_path(extract_dir: &Path, name: &str) -> PathBuf {
    let relative: PathBuf = Path::new(name)
        .components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect();
    extract_dir.join(relative)
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
