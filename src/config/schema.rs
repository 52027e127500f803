//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.

use crate::config::SecretString;
use crate::domain::Cutoff;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source document store
    pub source: SourceConfig,

    /// Export settings
    pub export: ExportConfig,
}

impl EtlConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (extract and transform, never write the output file)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Source document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// MongoDB connection string
    /// Stored securely in memory and automatically zeroized on drop
    pub uri: SecretString,

    /// Database name
    pub database: String,

    /// Collection holding payment orders
    pub collection: String,

    /// Server selection / connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// Application name reported to the server
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let uri = self.uri.expose_secret();
        if uri.is_empty() {
            return Err("source.uri cannot be empty".to_string());
        }

        if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
            return Err("source.uri must start with mongodb:// or mongodb+srv://".to_string());
        }

        if self.database.trim().is_empty() {
            return Err("source.database cannot be empty".to_string());
        }

        if self.collection.trim().is_empty() {
            return Err("source.collection cannot be empty".to_string());
        }

        if self.connect_timeout_seconds == 0 || self.connect_timeout_seconds > 300 {
            return Err(format!(
                "source.connect_timeout_seconds must be between 1 and 300, got {}",
                self.connect_timeout_seconds
            ));
        }

        Ok(())
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Point in time splitting the full load from the incremental load
    pub cutoff: Cutoff,

    /// Output CSV file
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_path.as_os_str().is_empty() {
            return Err("export.output_path cannot be empty".to_string());
        }

        if self.output_path.file_name().is_none() || self.output_path.is_dir() {
            return Err(format!(
                "export.output_path must name a file, got '{}'",
                self.output_path.display()
            ));
        }

        Ok(())
    }
}

/// Logging configuration
///
/// Built from command-line flags, not the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Log rotation (daily or hourly)
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    /// Validates the logging configuration
    pub fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid log rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("log directory cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

// Default value functions
pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn default_connect_timeout_seconds() -> u64 {
    10
}

pub(crate) fn default_app_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

pub(crate) fn default_output_path() -> PathBuf {
    PathBuf::from("payment_orders.csv")
}

fn default_log_path() -> String {
    "./logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use std::str::FromStr;

    fn valid_config() -> EtlConfig {
        EtlConfig {
            application: ApplicationConfig::default(),
            source: SourceConfig {
                uri: secret_string("mongodb://localhost:27017".to_string()),
                database: "payments".to_string(),
                collection: "payment_orders".to_string(),
                connect_timeout_seconds: default_connect_timeout_seconds(),
                app_name: default_app_name(),
            },
            export: ExportConfig {
                cutoff: Cutoff::from_str("2024-06-01T00:00:00Z").unwrap(),
                output_path: default_output_path(),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = valid_config();
        config.application.log_level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Invalid log_level"));
    }

    #[test]
    fn test_uri_scheme_required() {
        let mut config = valid_config();
        config.source.uri = secret_string("postgres://localhost".to_string());
        assert!(config.validate().unwrap_err().contains("mongodb://"));

        config.source.uri = secret_string("mongodb+srv://cluster0.example.net".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_collection_rejected() {
        let mut config = valid_config();
        config.source.collection = "  ".to_string();
        assert!(config.validate().unwrap_err().contains("source.collection"));
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = valid_config();
        config.source.connect_timeout_seconds = 0;
        assert!(config.validate().is_err());
        config.source.connect_timeout_seconds = 301;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_path_must_name_file() {
        let mut config = valid_config();
        config.export.output_path = PathBuf::new();
        assert!(config.validate().is_err());

        let dir = tempfile::TempDir::new().unwrap();
        config.export.output_path = dir.path().to_path_buf();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut logging = LoggingConfig::default();
        assert!(logging.validate().is_ok());
        logging.local_rotation = "size".to_string();
        assert!(logging.validate().is_err());
    }
}
