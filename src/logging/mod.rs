//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Console output with configurable level (overridable with `RUST_LOG`)
//! - JSON file logs with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use payorders_etl::logging::init_logging;
//! use payorders_etl::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(rows = 42, "Batch written");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of a pipeline phase
///
/// # Example
///
/// ```no_run
/// use payorders_etl::log_phase_start;
/// use payorders_etl::domain::Phase;
///
/// log_phase_start!(Phase::FullLoad);
/// ```
#[macro_export]
macro_rules! log_phase_start {
    ($phase:expr) => {
        tracing::info!(phase = %$phase, "Starting phase");
    };
}

/// Log the completion of a pipeline phase
///
/// # Example
///
/// ```no_run
/// use payorders_etl::log_phase_complete;
/// use payorders_etl::domain::Phase;
/// use std::time::Duration;
///
/// log_phase_complete!(Phase::FullLoad, 120, 120, Duration::from_millis(350));
/// ```
#[macro_export]
macro_rules! log_phase_complete {
    ($phase:expr, $documents:expr, $rows:expr, $duration:expr) => {
        tracing::info!(
            phase = %$phase,
            documents = $documents,
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Phase completed"
        );
    };
}
