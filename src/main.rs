use clap::Parser;
use eln_backup::cli::commands::{EXIT_CONFIG_ERROR, EXIT_FATAL};
use eln_backup::cli::Cli;
use eln_backup::config::load_config;
use eln_backup::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Optional; a missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(config.application.log_level.as_str());
    let logging_guard = match init_logging(log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_CONFIG_ERROR);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "eln-backup");

    let exit_code = match cli.backup.execute(config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors, flush file logs first
    drop(logging_guard);
    process::exit(exit_code);
}
