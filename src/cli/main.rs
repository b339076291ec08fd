use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use exif_transfer::{config, exif, format, transfer};

#[derive(Parser, Debug)]
#[command(
    name = "exif-transfer",
    version,
    about = "Copy GPS and date EXIF metadata from one photo to many — JPEG, PNG, TIFF, and HEIC/HEIF"
)]
struct Cli {
    /// Source image carrying the GPS data
    #[arg(value_name = "SOURCE", required_unless_present_any = ["init", "show_gps"])]
    source: Option<PathBuf>,

    /// Target image files or directories
    #[arg(value_name = "TARGET")]
    targets: Vec<PathBuf>,

    /// Also copy DateTimeOriginal, DateTimeDigitized, and DateTime
    #[arg(long = "copy-date")]
    copy_date: bool,

    /// Replace existing GPS data instead of skipping those targets
    #[arg(long)]
    overwrite: bool,

    /// Create a .bak copy of each target before modifying it
    #[arg(long)]
    backup: bool,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Print GPS coordinates of the given files and exit
    #[arg(long = "show-gps", value_name = "PATH", num_args = 1..)]
    show_gps: Vec<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Handle --show-gps
    if !cli.show_gps.is_empty() {
        let images = format::collect_targets(&cli.show_gps);
        if images.is_empty() {
            anyhow::bail!("No supported image files found in the specified paths.");
        }
        for image_path in &images {
            print_gps(image_path);
        }
        return Ok(());
    }

    let Some(source) = cli.source else {
        anyhow::bail!("No source image specified. Use --help for usage.");
    };

    // Load config, then layer CLI flags on top
    let config = config::Config::load(cli.config.as_deref())?;
    let mut options = config.options;
    if cli.copy_date {
        options.copy_date = true;
    }
    if cli.overwrite {
        options.overwrite_existing_gps = true;
    }
    if cli.backup {
        options.backup_originals = true;
    }

    let targets = format::collect_targets(&cli.targets);
    if targets.is_empty() {
        anyhow::bail!("No supported target files found in the specified paths.");
    }

    log::info!("Found {} target(s)", targets.len());

    let mut on_progress = |done: usize, total: usize, path: &str| {
        if !path.is_empty() {
            log::debug!("[{done}/{total}] {path}");
        }
    };

    let summary = match transfer::transfer(&source, &targets, &options, Some(&mut on_progress)) {
        Ok(summary) => summary,
        Err(e) => anyhow::bail!("Error: {e}"),
    };

    for failure in &summary.failed {
        log::error!(
            "  {}: {}",
            failure.path.display(),
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    println!("{}", summary.message);

    if summary.success_count == 0 && summary.skipped_count == 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print the GPS coordinate of a single file, or a dimmed placeholder.
fn print_gps(path: &std::path::Path) {
    match exif::read_gps_decimal(path) {
        Ok(Some((lat, lon))) => {
            println!("{BOLD}{}{RESET} : {lat:.6}, {lon:.6}", path.display());
        }
        Ok(None) => {
            println!("{BOLD}{}{RESET} : {DIM}(no GPS data){RESET}", path.display());
        }
        Err(e) => {
            log::error!("Failed to read {}: {e}", path.display());
        }
    }
}
