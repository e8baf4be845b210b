// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "retro-camera")]
#[command(about = "Film-look filter pipeline for a retro camera")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the looks in the catalog
    Looks,

    /// Composite a single image file
    Apply(cli::ApplyArgs),

    /// Run a simulated live session over an image and capture a still
    Preview {
        /// Image used as every camera frame
        #[arg(short, long)]
        input: PathBuf,

        /// Look name (e.g. "Portra 400")
        #[arg(short, long, default_value = "None")]
        look: String,

        /// Number of frames to feed before capturing
        #[arg(short, long, default_value = "30")]
        frames: u32,

        /// Treat frames as coming from the front camera
        #[arg(long)]
        front: bool,

        /// Directory for the captured still (default: from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration back to disk
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=retro_camera=trace, RUST_LOG=info
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
        Commands::Looks => cli::list_looks(),
        Commands::Apply(args) => cli::apply(args),
        Commands::Preview {
            input,
            look,
            frames,
            front,
            output,
        } => cli::preview(input, &look, frames, front, output),
        Commands::Config { save } => cli::show_config(save),
    }
}
