//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{
    default_app_name, default_connect_timeout_seconds, default_output_path, ApplicationConfig,
    EtlConfig, ExportConfig, SourceConfig,
};
use super::secret::secret_string;
use crate::domain::errors::EtlError;
use crate::domain::result::Result;
use crate::domain::Cutoff;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Connection string variable
pub const ENV_SOURCE_URI: &str = "SOURCE_URI";
/// Database name variable
pub const ENV_SOURCE_DB: &str = "SOURCE_DB";
/// Collection name variable
pub const ENV_TARGET_COLLECTION: &str = "TARGET_COLLECTION";
/// Cutoff timestamp variable (RFC 3339)
pub const ENV_EXPORT_CUTOFF: &str = "PAYORDERS_EXPORT_CUTOFF";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into EtlConfig
/// 4. Applies environment variable overrides
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, the TOML is malformed, a
/// referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use payorders_etl::config::loader::load_config;
///
/// let config = load_config("payorders.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<EtlConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EtlError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        EtlError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: EtlConfig = toml::from_str(&contents)
        .map_err(|e| EtlError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        EtlError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Builds configuration from environment variables alone
///
/// `SOURCE_URI`, `SOURCE_DB`, `TARGET_COLLECTION` and
/// `PAYORDERS_EXPORT_CUTOFF` are required; everything else takes its
/// default and may be overridden the same way as with a config file.
///
/// # Errors
///
/// Returns an error naming every missing required variable, or if
/// validation fails.
pub fn config_from_env() -> Result<EtlConfig> {
    let required = [
        ENV_SOURCE_URI,
        ENV_SOURCE_DB,
        ENV_TARGET_COLLECTION,
        ENV_EXPORT_CUTOFF,
    ];
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| std::env::var(name).map(|v| v.is_empty()).unwrap_or(true))
        .collect();

    if !missing.is_empty() {
        return Err(EtlError::Configuration(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )));
    }

    let cutoff = parse_cutoff(&std::env::var(ENV_EXPORT_CUTOFF).unwrap_or_default())?;

    let mut config = EtlConfig {
        application: ApplicationConfig::default(),
        source: SourceConfig {
            uri: secret_string(std::env::var(ENV_SOURCE_URI).unwrap_or_default()),
            database: std::env::var(ENV_SOURCE_DB).unwrap_or_default(),
            collection: std::env::var(ENV_TARGET_COLLECTION).unwrap_or_default(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            app_name: default_app_name(),
        },
        export: ExportConfig {
            cutoff,
            output_path: default_output_path(),
        },
    };

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        EtlError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| EtlError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(EtlError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides
///
/// The source variables use plain names (`SOURCE_URI`, `SOURCE_DB`,
/// `TARGET_COLLECTION`); everything else uses the
/// `PAYORDERS_<SECTION>_<KEY>` pattern.
fn apply_env_overrides(config: &mut EtlConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PAYORDERS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("PAYORDERS_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Source overrides
    if let Ok(val) = std::env::var(ENV_SOURCE_URI) {
        if !val.is_empty() {
            config.source.uri = secret_string(val);
        }
    }
    if let Ok(val) = std::env::var(ENV_SOURCE_DB) {
        if !val.is_empty() {
            config.source.database = val;
        }
    }
    if let Ok(val) = std::env::var(ENV_TARGET_COLLECTION) {
        if !val.is_empty() {
            config.source.collection = val;
        }
    }
    if let Ok(val) = std::env::var("PAYORDERS_SOURCE_CONNECT_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.source.connect_timeout_seconds = timeout;
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var(ENV_EXPORT_CUTOFF) {
        config.export.cutoff = parse_cutoff(&val)?;
    }
    if let Ok(val) = std::env::var("PAYORDERS_EXPORT_OUTPUT_PATH") {
        config.export.output_path = PathBuf::from(val);
    }

    Ok(())
}

fn parse_cutoff(value: &str) -> Result<Cutoff> {
    value
        .parse::<Cutoff>()
        .map_err(|e| EtlError::Configuration(format!("{ENV_EXPORT_CUTOFF}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("PAYORDERS_LOADER_TEST_VAR", "test_value");
        let input = "uri = \"${PAYORDERS_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "uri = \"test_value\"\n");
        std::env::remove_var("PAYORDERS_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("PAYORDERS_LOADER_MISSING_VAR");
        let input = "uri = \"${PAYORDERS_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("PAYORDERS_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("PAYORDERS_LOADER_COMMENTED_VAR");
        let input = "# uri = \"${PAYORDERS_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(EtlError::Configuration(_))));
    }

    #[test]
    fn test_parse_cutoff_error_names_variable() {
        let err = parse_cutoff("not-a-date").unwrap_err();
        assert!(err.to_string().contains(ENV_EXPORT_CUTOFF));
    }
}
