//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::commands::DEFAULT_CONFIG_PATH;
use clap::Args;
use std::fs;
use std::path::Path;

/// Sample configuration written by `init`
pub const SAMPLE_CONFIG: &str = r#"# payorders-etl configuration
# MongoDB payment orders to CSV

[application]
log_level = "info"  # trace | debug | info | warn | error
dry_run = false

[source]
# Connection string; keep credentials in the environment or a .env file
uri = "${SOURCE_URI}"
database = "payments"
collection = "payment_orders"
connect_timeout_seconds = 10

[export]
# Orders created before the cutoff form the full load, orders created
# after it the incremental load. An order created exactly at the cutoff
# is in neither.
cutoff = "2024-06-01T00:00:00Z"
output_path = "payment_orders.csv"
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing payorders-etl configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, SAMPLE_CONFIG) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set SOURCE_URI in your environment or a .env file");
                println!("  3. Validate configuration: payorders-etl validate-config");
                println!("  4. Run export: payorders-etl export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }
}
