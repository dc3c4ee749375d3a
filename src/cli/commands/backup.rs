//! Backup command implementation
//!
//! Exports everything to `--outdir`, then mirrors `--outdir` to `--s3dir`.

use super::{exit_code_for, EXIT_AUTH_ERROR, EXIT_CONFIG_ERROR};
use crate::adapters::auth::{AuthProvider, TokenFileAuth};
use crate::adapters::nucleus::{DataHubApi, NucleusClient};
use crate::adapters::sync::{MirrorOutcome, S3Mirror};
use crate::config::BackupConfig;
use crate::core::export::{BackupCoordinator, BackupLayout, BackupSummary, ExportOptions, Phase};
use crate::log_error_with_context;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for a backup run
#[derive(Args, Debug, Clone)]
pub struct BackupArgs {
    /// Backup directory; a sub directory is created with the current date/time
    #[arg(long, value_name = "DIR")]
    pub outdir: PathBuf,

    /// Mirror the backup directory to this S3 prefix when complete
    #[arg(long, value_name = "S3_URL")]
    pub s3dir: Option<String>,

    /// Concurrent fetches per phase (default: min(8, CPU count))
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl BackupArgs {
    /// Apply command-line overrides to the loaded configuration
    pub fn apply_overrides(&self, config: &mut BackupConfig) {
        if let Some(workers) = self.workers {
            tracing::info!(workers, "Overriding worker count from CLI");
            config.export.max_workers = workers;
            config.export.file_workers = workers;
        }
        if self.no_progress {
            config.export.show_progress = false;
        }
    }

    /// Execute the backup against the configured platform
    pub async fn execute(&self, mut config: BackupConfig) -> anyhow::Result<i32> {
        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let auth = match TokenFileAuth::from_config(&config.api) {
            Ok(auth) => Arc::new(auth),
            Err(e) => {
                log_error_with_context!(&e, "Failed to locate token store");
                eprintln!("{e}");
                return Ok(exit_code_for(&e));
            }
        };

        if !auth.tokens_exist() {
            tracing::info!(path = %auth.path().display(), "No stored tokens, authenticating");
            if let Err(e) = auth.authenticate() {
                log_error_with_context!(&e, "Authentication failed");
                eprintln!("Authentication failed: {e}");
                return Ok(EXIT_AUTH_ERROR);
            }
        }

        let client = match auth
            .credentials()
            .and_then(|credentials| NucleusClient::new(&config.api, credentials))
        {
            Ok(client) => client,
            Err(e) => {
                log_error_with_context!(&e, "Failed to create API client");
                eprintln!("{e}");
                return Ok(exit_code_for(&e));
            }
        };

        self.run(&config, Arc::new(client), auth).await
    }

    /// Run the phases and the mirror step with the given collaborators
    ///
    /// Returns the process exit code.
    pub async fn run(
        &self,
        config: &BackupConfig,
        api: Arc<dyn DataHubApi>,
        auth: Arc<dyn AuthProvider>,
    ) -> anyhow::Result<i32> {
        let layout = BackupLayout::new(&self.outdir);
        println!("Backing up to {} ...", layout.run_dir().display());

        let coordinator =
            BackupCoordinator::new(api, auth, layout, ExportOptions::from_config(&config.export));

        let summary = match coordinator.execute().await {
            Ok(summary) => summary,
            Err(e) => {
                log_error_with_context!(&e, "Backup failed");
                eprintln!("Backup failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        summary.log_summary();
        print_summary(&summary);

        let mirror = S3Mirror::from_config(&config.sync);
        let outcome = mirror
            .mirror(&self.outdir, self.s3dir.as_deref())
            .await?;

        if outcome == MirrorOutcome::ToolMissing {
            println!("{} not found. Skipping S3 backup.", mirror.tool());
        }

        Ok(outcome.exit_code())
    }
}

fn print_summary(summary: &BackupSummary) {
    println!();
    println!("Backup Summary:");
    for phase in &summary.phases {
        match phase.phase {
            Phase::Files => println!(
                "  {:<11} {} listed, {} downloaded, {} skipped ({} MB)",
                phase.phase,
                phase.listed,
                phase.exported,
                phase.skipped,
                phase.bytes_downloaded / 1_000_000
            ),
            _ => println!(
                "  {:<11} {} listed, {} exported",
                phase.phase, phase.listed, phase.exported
            ),
        }
    }
    println!("  Duration:   {:.2}s", summary.duration.as_secs_f64());
    println!();
}
