//! Domain error types
//!
//! This module defines the error hierarchy for the payment order export.
//! All errors are domain-specific and don't expose third-party types.

use std::fmt;
use thiserror::Error;

/// Pipeline phase an error surfaced in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Acquiring the source connection
    Connect,
    /// Historical extraction and the create-mode write
    FullLoad,
    /// Incremental extraction and the append-mode write
    IncrementalLoad,
    /// Releasing the source connection
    Disconnect,
}

impl Phase {
    /// Stable lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Connect => "connect",
            Phase::FullLoad => "full_load",
            Phase::IncrementalLoad => "incremental_load",
            Phase::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type
///
/// This is the primary error type used throughout the crate.
/// It wraps the per-component errors and records which phase failed.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document store errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Row coercion errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Output file errors
    #[error("Write error: {0}")]
    Sink(#[from] SinkError),

    /// An error annotated with the phase it aborted
    #[error("{phase} failed: {source}")]
    PhaseFailed {
        phase: Phase,
        #[source]
        source: Box<EtlError>,
    },

    /// The run was stopped by a shutdown signal
    #[error("Export interrupted before {0}")]
    Interrupted(Phase),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Error classification used for diagnostics and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Connection,
    Query,
    Transform,
    Write,
    Interrupted,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Connection => "ConnectionError",
            ErrorKind::Query => "QueryError",
            ErrorKind::Transform => "TransformError",
            ErrorKind::Write => "WriteError",
            ErrorKind::Interrupted => "Interrupted",
            ErrorKind::Other => "Error",
        };
        f.write_str(name)
    }
}

impl EtlError {
    /// Wrap this error with the phase that was running
    ///
    /// Already-annotated errors and interruptions are returned unchanged.
    pub fn in_phase(self, phase: Phase) -> Self {
        match self {
            EtlError::PhaseFailed { .. } | EtlError::Interrupted(_) => self,
            other => EtlError::PhaseFailed {
                phase,
                source: Box::new(other),
            },
        }
    }

    /// Phase the error was raised in, if known
    pub fn phase(&self) -> Option<Phase> {
        match self {
            EtlError::PhaseFailed { phase, .. } => Some(*phase),
            EtlError::Interrupted(phase) => Some(*phase),
            _ => None,
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EtlError::Configuration(_) => ErrorKind::Configuration,
            EtlError::Source(e) => e.kind(),
            EtlError::Transform(_) => ErrorKind::Transform,
            EtlError::Sink(_) => ErrorKind::Write,
            EtlError::PhaseFailed { source, .. } => source.kind(),
            EtlError::Interrupted(_) => ErrorKind::Interrupted,
            EtlError::Other(_) => ErrorKind::Other,
        }
    }

    /// Process exit code for this error
    ///
    /// 2 = configuration, 4 = connection, 130 = interrupted, 5 = any other fatal error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Configuration => 2,
            ErrorKind::Connection => 4,
            ErrorKind::Interrupted => 130,
            _ => 5,
        }
    }
}

/// Document store errors
///
/// Errors that occur when talking to the source database.
/// These errors don't expose driver types.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection string could not be parsed
    #[error("Invalid connection string: {0}")]
    InvalidUri(String),

    /// Failed to reach the server
    #[error("Failed to connect to source: {0}")]
    ConnectionFailed(String),

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Query execution or cursor iteration failed
    #[error("Query failed on {collection}: {message}")]
    QueryFailed { collection: String, message: String },

    /// Releasing the client failed
    #[error("Failed to close source connection: {0}")]
    CloseFailed(String),
}

impl SourceError {
    fn kind(&self) -> ErrorKind {
        match self {
            SourceError::QueryFailed { .. } => ErrorKind::Query,
            SourceError::InvalidUri(_)
            | SourceError::ConnectionFailed(_)
            | SourceError::AuthenticationFailed(_)
            | SourceError::CloseFailed(_) => ErrorKind::Connection,
        }
    }
}

/// Row coercion errors
///
/// Any of these aborts the whole batch; rows are never skipped.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The value has no numeric interpretation
    #[error("document {index}: field '{field}' is not numeric (found {found})")]
    NotNumeric {
        index: usize,
        field: &'static str,
        found: String,
    },

    /// Infinite floating point value
    #[error("document {index}: field '{field}' is not finite ({value})")]
    NotFinite {
        index: usize,
        field: &'static str,
        value: f64,
    },

    /// Floored value does not fit the output column
    #[error("document {index}: field '{field}' is out of range ({value})")]
    OutOfRange {
        index: usize,
        field: &'static str,
        value: f64,
    },
}

/// Output file errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// Creating or replacing the output file failed
    #[error("Failed to create {path}: {message}")]
    CreateFailed { path: String, message: String },

    /// Appending to the output file failed
    #[error("Failed to append to {path}: {message}")]
    AppendFailed { path: String, message: String },

    /// A row could not be encoded as CSV
    #[error("Failed to encode row: {0}")]
    EncodeFailed(String),
}

// Conversion from toml parse errors
impl From<toml::de::Error> for EtlError {
    fn from(err: toml::de::Error) -> Self {
        EtlError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for SinkError {
    fn from(err: csv::Error) -> Self {
        SinkError::EncodeFailed(err.to_string())
    }
}
