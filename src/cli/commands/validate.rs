//! Validate config command implementation
//!
//! This module implements the `validate-config` command.

use crate::cli::commands::resolve_config;
use crate::config::redact_uri;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates; the summary never shows credentials.
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!(config_path = ?config_path, "Validating configuration");

        println!(
            "🔍 Validating configuration: {}",
            config_path.unwrap_or("(default)")
        );
        println!();

        let (config, source) = match resolve_config(config_path) {
            Ok(loaded) => loaded,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Loaded From: {source}");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  Source URI: {}",
            redact_uri(config.source.uri.expose_secret().as_ref())
        );
        println!("  Database: {}", config.source.database);
        println!("  Collection: {}", config.source.collection);
        println!(
            "  Connect Timeout: {}s",
            config.source.connect_timeout_seconds
        );
        println!("  Cutoff: {}", config.export.cutoff);
        println!("  Output Path: {}", config.export.output_path.display());
        println!();

        Ok(0)
    }
}
