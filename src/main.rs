use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catchcast::cli::commands;
use catchcast::config::engine::EngineConfig;

#[derive(Parser)]
#[command(name = "catchcast")]
#[command(about = "Scores fishing conditions per species and picks the best time window")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "catchcast.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every species against one environment snapshot
    Score {
        /// Path to a snapshot JSON file
        #[arg(short, long)]
        snapshot: String,
    },

    /// Score an hourly series of snapshots and report each species' peak hour
    Forecast {
        /// Path to a JSON array of snapshots
        #[arg(short, long)]
        snapshots: String,
    },

    /// Load species profiles and weights and report invalid entries
    Validate,
}

fn init_logging(config: &EngineConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries results; logs go to stderr.
    if config.log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match EngineConfig::from_file(Path::new(&cli.config)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config);

    let outcome = match cli.command {
        Commands::Score { snapshot } => commands::score(&config, &snapshot),
        Commands::Forecast { snapshots } => commands::forecast(&config, &snapshots),
        Commands::Validate => commands::validate(&config),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
