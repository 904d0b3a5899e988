//! Command-line interface for Deepspire
//!
//! Supports both graphical (default) and headless modes.

use clap::Parser;
use std::path::PathBuf;

/// Top-down action RPG prototype
#[derive(Parser, Debug)]
#[command(name = "deepspire")]
#[command(about = "Top-down action RPG prototype")]
#[command(version)]
pub struct Args {
    /// Run in headless mode with the specified JSON config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Output path for the session log (headless mode only)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum session duration in seconds, overriding the config value
    /// (headless mode only)
    #[arg(long, value_name = "SECONDS")]
    pub max_duration: Option<f32>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
