//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod export;
pub mod init;
pub mod validate;

use crate::config::{config_from_env, load_config, EtlConfig};
use crate::domain::Result;
use std::path::Path;

/// Configuration file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "payorders.toml";

/// Load configuration for a command
///
/// An explicit path must exist. Without one, `payorders.toml` in the working
/// directory is used if present, otherwise configuration comes from the
/// environment alone. Returns the configuration and where it came from.
pub fn resolve_config(config_path: Option<&str>) -> Result<(EtlConfig, String)> {
    match config_path {
        Some(path) => Ok((load_config(path)?, path.to_string())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Ok((
            load_config(DEFAULT_CONFIG_PATH)?,
            DEFAULT_CONFIG_PATH.to_string(),
        )),
        None => Ok((config_from_env()?, "environment".to_string())),
    }
}
