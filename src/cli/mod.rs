//! CLI interface and argument parsing

pub mod commands;

use clap::Parser;

/// eln-backup - back up an ELN data hub to local disk and S3
#[derive(Parser, Debug)]
#[command(name = "eln-backup")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional configuration file
    #[arg(short, long, env = "ELN_BACKUP_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ELN_BACKUP_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub backup: commands::backup::BackupArgs,
}
