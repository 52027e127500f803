//! Configuration management.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation, with an environment-only fallback for container deployments.
//!
//! # Overview
//!
//! Configuration supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment overrides (`SOURCE_URI`, `SOURCE_DB`, `TARGET_COLLECTION`,
//!   `PAYORDERS_*`)
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use payorders_etl::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("payorders.toml")?;
//!
//! println!("Database: {}", config.source.database);
//! println!("Collection: {}", config.source.collection);
//! println!("Cutoff: {}", config.export.cutoff);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! uri = "${SOURCE_URI}"
//! database = "payments"
//! collection = "payment_orders"
//!
//! [export]
//! cutoff = "2024-06-01T00:00:00Z"
//! output_path = "payment_orders.csv"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{config_from_env, load_config};
pub use schema::{ApplicationConfig, EtlConfig, ExportConfig, LoggingConfig, SourceConfig};
pub use secret::{redact_uri, secret_string, SecretString, SecretValue};
