// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "snapcam")]
#[command(about = "Minimal still-photo capture with aspect-fill framing")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List {
        /// Serve this image file as the camera instead of the test pattern
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Take a photo, cropped to fill the configured viewport
    Photo {
        /// Serve this image file as the camera instead of the test pattern
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (default: ~/Pictures/Snapcam)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Viewport width in pixels
        #[arg(long)]
        viewport_width: Option<f64>,

        /// Viewport height in pixels
        #[arg(long)]
        viewport_height: Option<f64>,

        /// Capture deadline in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Save as PNG instead of JPEG
        #[arg(long)]
        png: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=snapcam=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { input } => cli::list_cameras(input),
        Commands::Photo {
            input,
            output,
            viewport_width,
            viewport_height,
            timeout,
            png,
        } => cli::take_photo(cli::PhotoArgs {
            input,
            output,
            viewport_width,
            viewport_height,
            timeout,
            png,
        }),
    }
}
