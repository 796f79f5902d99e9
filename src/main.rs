//! issn-probe - Verify journal ISSNs against their landing pages
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use issn_probe::cli::{commands, Cli, Commands};
use issn_probe::config::ConfigManager;
use issn_probe::error::ProbeResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ProbeResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = config_manager.load().await?;

    // 0 = warn (progress only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("issn_probe=warn"),
        1 => EnvFilter::new("issn_probe=info"),
        _ => EnvFilter::new("issn_probe=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    debug!("Configuration loaded from {}", config_manager.path().display());

    if let Some(dir) = cli.cache_dir {
        config.cache.dir = Some(dir);
    }

    match cli.command {
        Commands::Match(args) => commands::probe(args, &config).await,
        Commands::Lookup(args) => commands::lookup(args, &config).await,
        Commands::Validate(args) => commands::validate(args).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
        Commands::Cache(args) => commands::cache(args, &config).await,
    }
}
