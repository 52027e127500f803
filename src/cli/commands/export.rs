//! Export command implementation
//!
//! This module implements the `export` command: a full load of payment
//! orders created before the cutoff followed by an incremental load of
//! those created after it.

use crate::cli::commands::resolve_config;
use crate::core::export::{ExportCoordinator, ExportSummary};
use crate::domain::{Cutoff, EtlError};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Override the cutoff (RFC 3339, e.g. 2024-06-01T00:00:00Z)
    #[arg(long, value_name = "TIMESTAMP")]
    pub cutoff: Option<Cutoff>,

    /// Override the output CSV path
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Dry run mode - extract and transform without writing the output file
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let (mut config, source) = match resolve_config(config_path) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("{}", diagnostic(&e));
                return Ok(e.exit_code());
            }
        };
        tracing::debug!(source = %source, "Configuration loaded");

        if let Some(cutoff) = self.cutoff {
            tracing::info!(cutoff = %cutoff, "Overriding cutoff from CLI");
            config.export.cutoff = cutoff;
        }

        if let Some(output) = &self.output {
            tracing::info!(output = %output.display(), "Overriding output path from CLI");
            config.export.output_path = output.clone();
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("{}", diagnostic(&EtlError::Configuration(e)));
            return Ok(2);
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - The output file will not be written");
            println!();
        }

        let coordinator = ExportCoordinator::new(&config, shutdown_signal);

        println!("🚀 Starting export...");
        println!("  Cutoff: {}", config.export.cutoff);
        println!("  Output: {}", config.export.output_path.display());
        println!();

        match coordinator.execute_export().await {
            Ok(summary) => {
                print_summary(&summary);
                Ok(0)
            }
            Err(e) => {
                if matches!(e, EtlError::Interrupted(_)) {
                    println!();
                    println!("⚠️  Export interrupted before completion.");
                    println!("   The output file holds only the loads that finished.");
                }
                eprintln!("{}", diagnostic(&e));
                Ok(e.exit_code())
            }
        }
    }
}

/// One-line diagnostic naming the error kind, the failing phase and the cause
///
/// e.g. `[ConnectionError] connect failed: Failed to connect to source: ...`
pub fn diagnostic(err: &EtlError) -> String {
    format!("❌ [{}] {}", err.kind(), err)
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("📊 Export Summary:");
    println!("  Cutoff: {}", summary.cutoff);
    println!("  Output: {}", summary.output_path.display());
    println!(
        "  Full load: {} documents, {}",
        summary.full_load.documents,
        summary.full_load.outcome()
    );
    println!(
        "  Incremental load: {} documents, {}",
        summary.incremental_load.documents,
        summary.incremental_load.outcome()
    );
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if summary.dry_run {
        println!("✅ Dry run completed - no file was written");
    } else if summary.is_empty() {
        println!("✅ Nothing to export - output file left untouched");
    } else {
        println!("✅ Export completed successfully!");
    }
}
