//! Lumen CLI - Batch product-photo adjustment pipeline.
//!
//! Lumen applies one set of adjustments uniformly across a folder of product
//! photos and packages the results for download.
//!
//! # Usage
//!
//! ```bash
//! # Process a folder with a style preset
//! lumen process ./photos/ --style white-bg --preset web-optimized
//!
//! # Manual sliders, background removal, PNG output
//! lumen process shoe.jpg --brightness 20 --sharpen 1.2 --remove-background
//!
//! # List presets
//! lumen presets
//!
//! # View configuration
//! lumen config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Lumen - Batch product-photo adjustment pipeline.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Process images: adjust, resize, and package into an archive
    Process(cli::process::ProcessArgs),

    /// List size and style presets
    Presets(cli::presets::PresetsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match lumen_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `lumen config path`."
            );
            lumen_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Lumen v{}", lumen_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Presets(args) => cli::presets::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
