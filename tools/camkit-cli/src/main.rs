//! camkit CLI: drive capture sessions from the command line.
//!
//! Usage:
//!   camkit constraints [OPTIONS]   Print the merged capture request
//!   camkit probe [OPTIONS]         Open a session and report its tracks
//!   camkit photo [OPTIONS]         Capture a still frame to a file
//!   camkit record [OPTIONS]        Record for a fixed time to a file
//!
//! All commands run against the synthetic device layer.

use std::path::PathBuf;

use camkit_common::config::AppConfig;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "camkit",
    about = "Camera capture sessions: constraints, torch, photos, and recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/camkit/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Viewport width used for the default aspect ratio
    #[arg(long, global = true, default_value = "1280")]
    viewport_width: f64,

    /// Viewport height used for the default aspect ratio
    #[arg(long, global = true, default_value = "720")]
    viewport_height: f64,

    /// Constraint overrides as a JSON object
    #[arg(long = "override", global = true)]
    overrides: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the constraint tree a session would request
    Constraints,

    /// Open a session, report tracks and light controls, then close it
    Probe {
        /// Also switch the light on and off
        #[arg(long)]
        toggle_light: bool,
    },

    /// Capture one still frame
    Photo {
        /// Output file path
        #[arg(short, long, default_value = "photo.webp")]
        output: PathBuf,

        /// Synthetic feed width
        #[arg(long, default_value = "640")]
        width: u32,

        /// Synthetic feed height
        #[arg(long, default_value = "480")]
        height: u32,
    },

    /// Record video for a fixed duration
    Record {
        /// Output file path
        #[arg(short, long, default_value = "recording.webm")]
        output: PathBuf,

        /// Recording duration in seconds
        #[arg(long, default_value = "3.0")]
        secs: f64,

        /// Start muted
        #[arg(long)]
        muted: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    camkit_common::logging::init_logging(&config.logging);

    let request = commands::SessionRequest::parse(
        cli.overrides.as_deref(),
        cli.viewport_width,
        cli.viewport_height,
    )?;

    match cli.command {
        Commands::Constraints => commands::constraints::run(&config, &request),
        Commands::Probe { toggle_light } => {
            commands::probe::run(&config, &request, toggle_light).await
        }
        Commands::Photo {
            output,
            width,
            height,
        } => commands::photo::run(&config, &request, output, width, height).await,
        Commands::Record {
            output,
            secs,
            muted,
        } => commands::record::run(&config, &request, output, secs, muted).await,
    }
}
