//! stmbench - Structural topic model workbench
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use stmbench::cli::commands;
use stmbench::cli::{Cli, Commands};
use stmbench::config::{Config, ConfigManager};
use stmbench::error::{BenchError, BenchResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BenchResult<ExitCode> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| BenchError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let mut config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;
    cli.overrides.apply(&mut config);

    init_logging(cli.verbose, &config);
    debug!("Using config: {}", config_manager.path().display());
    if let Some(ref path) = local_config_path {
        debug!("Merged local config: {}", path.display());
    }

    match cli.command {
        Commands::Corpus(args) => commands::corpus(args, &config).await,
        Commands::Fit => commands::fit(&config).await,
        Commands::Plot => commands::plot(&config).await,
        Commands::Status => commands::status(&config).await.map(|()| ExitCode::SUCCESS),
        Commands::Cache(args) => commands::cache(args, &config)
            .await
            .map(|()| ExitCode::SUCCESS),
        Commands::Config(args) => commands::config(args, &config, &config_manager)
            .await
            .map(|()| ExitCode::SUCCESS),
    }
}

/// 0 = warn (spinners only), 1 = info, 2+ = debug; RUST_LOG wins when set
fn init_logging(verbose: u8, config: &Config) {
    let default = match verbose {
        0 => "stmbench=warn",
        1 => "stmbench=info",
        _ => "stmbench=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}
