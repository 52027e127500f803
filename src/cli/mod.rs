//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use crate::config::LoggingConfig;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// payorders-etl - MongoDB payment orders to CSV
#[derive(Parser, Debug)]
#[command(name = "payorders-etl")]
#[command(version, about, long_about = None)]
#[command(author = "payorders-etl Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to payorders.toml if present,
    /// otherwise the environment)
    #[arg(short, long, env = "PAYORDERS_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PAYORDERS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for JSON log files; file logging is off without it
    #[arg(long, value_name = "DIR", env = "PAYORDERS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log file rotation
    #[arg(long, value_enum, default_value_t = LogRotation::Daily)]
    pub log_rotation: LogRotation,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// File logging settings derived from the flags
    pub fn logging_config(&self) -> LoggingConfig {
        match &self.log_dir {
            Some(dir) => LoggingConfig {
                local_enabled: true,
                local_path: dir.to_string_lossy().to_string(),
                local_rotation: self.log_rotation.as_str().to_string(),
            },
            None => LoggingConfig {
                local_rotation: self.log_rotation.as_str().to_string(),
                ..LoggingConfig::default()
            },
        }
    }
}

/// Log file rotation period
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogRotation {
    Daily,
    Hourly,
}

impl LogRotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogRotation::Daily => "daily",
            LogRotation::Hourly => "hourly",
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export payment orders to CSV (full load, then incremental load)
    Export(commands::export::ExportArgs),

    /// Validate configuration
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
