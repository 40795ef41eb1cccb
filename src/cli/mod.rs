//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod extract;
mod info;
mod pack;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, ShpConfig};

/// Exit codes for the shp binary
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Check if a path has a PNG extension.
pub fn is_png_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Find all PNG files directly inside a directory, sorted by path.
pub fn find_png_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(paths) = glob(&format!("{}/*.png", glob::Pattern::escape(&dir.display().to_string()))) {
        files.extend(paths.filter_map(Result::ok));
    }
    files.sort();
    files
}

/// shp - Inspect, extract and build SHP sprite containers
#[derive(Parser)]
#[command(name = "shp")]
#[command(about = "shp - Inspect, extract and build SHP delta-compressed sprite containers")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a shp.toml config file (discovered automatically if omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the canvas size and header table of a container
    Info {
        /// SHP file to inspect
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a container and write its frames as grayscale index PNGs
    Extract {
        /// SHP file to extract
        input: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
        scale: Option<u8>,

        /// Write a single spritesheet instead of one PNG per frame
        #[arg(long)]
        sheet: bool,

        /// Number of spritesheet columns (default: all frames in one row)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        columns: Option<u32>,
    },

    /// Build a container from grayscale index PNGs
    Pack {
        /// PNG files or directories of PNG files, in frame order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output SHP file (defaults to [pack] out in shp.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reload the written container and compare every frame
        #[arg(long, conflicts_with = "no_verify")]
        verify: bool,

        /// Skip the post-write verification
        #[arg(long)]
        no_verify: bool,
    },

    /// Fully decode containers and report whether they are valid
    Verify {
        /// SHP files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Install the logger used by the binary.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

/// Load the config file and apply command-line overrides.
fn resolve_config(path: Option<&Path>, overrides: &CliOverrides) -> Result<ShpConfig, ExitCode> {
    match load_config(path) {
        Ok(mut config) => {
            merge_cli_overrides(&mut config, overrides);
            Ok(config)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_INVALID_ARGS))
        }
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input, json } => info::run_info(&input, json),
        Commands::Verify { files } => info::run_verify(&files),
        Commands::Extract { input, output, scale, sheet, columns } => {
            let overrides = CliOverrides {
                out: output,
                scale,
                sheet: sheet.then_some(true),
                columns,
                ..Default::default()
            };
            match resolve_config(cli.config.as_deref(), &overrides) {
                Ok(config) => extract::run_extract(&input, &config.extract),
                Err(code) => code,
            }
        }
        Commands::Pack { inputs, output, verify, no_verify } => {
            let verify = match (verify, no_verify) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let overrides = CliOverrides { pack_out: output, verify, ..Default::default() };
            match resolve_config(cli.config.as_deref(), &overrides) {
                Ok(config) => pack::run_pack(&inputs, &config.pack),
                Err(code) => code,
            }
        }
    }
}
