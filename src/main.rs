//! swcache - Offline cache worker
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use swcache::cli::{Cli, Commands};
use swcache::config::{Config, ConfigManager};
use swcache::error::SwResult;
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

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("swcache=warn"),
        1 => EnvFilter::new("swcache=info"),
        _ => EnvFilter::new("swcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}

async fn run() -> SwResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    swcache::ui::init_theme();
    debug!("Config: {}", config_manager.path().display());

    // Config commands work without a state directory
    if let Commands::Config(args) = cli.command {
        return swcache::cli::commands::config(args, &config, &config_manager).await;
    }

    ConfigManager::ensure_state_dirs(&config).await?;

    match cli.command {
        Commands::Config(_) => unreachable!("Config handled above"),
        Commands::Install => swcache::cli::commands::install(&config).await,
        Commands::Activate => swcache::cli::commands::activate(&config).await,
        Commands::Fetch(args) => swcache::cli::commands::fetch(args, &config).await,
        Commands::Message(args) => swcache::cli::commands::message(args, &config).await,
        Commands::Push(args) => swcache::cli::commands::push(args, &config).await,
        Commands::Click(args) => swcache::cli::commands::click(args, &config).await,
        Commands::Status => swcache::cli::commands::status(&config).await,
        Commands::Cache(args) => swcache::cli::commands::cache(args, &config).await,
    }
}
