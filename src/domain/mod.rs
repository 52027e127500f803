//! Domain models and types.
//!
//! The domain layer provides:
//! - **Order models** ([`PaymentOrderRecord`], [`PaymentOrderRow`])
//! - **The cutoff marker** ([`Cutoff`]) partitioning full and incremental loads
//! - **Error types** ([`EtlError`], [`SourceError`], [`TransformError`], [`SinkError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, EtlError>`]. Errors raised inside
//! a pipeline phase are annotated with that [`Phase`], and [`EtlError::kind`]
//! classifies them for diagnostics:
//!
//! ```rust
//! use payorders_etl::domain::{ErrorKind, EtlError, Phase, SourceError};
//!
//! let err = EtlError::from(SourceError::ConnectionFailed("timed out".into()))
//!     .in_phase(Phase::Connect);
//! assert_eq!(err.kind(), ErrorKind::Connection);
//! assert_eq!(err.exit_code(), 4);
//! ```

pub mod cutoff;
pub mod errors;
pub mod order;
pub mod result;

// Re-export commonly used types for convenience
pub use cutoff::Cutoff;
pub use errors::{ErrorKind, EtlError, Phase, SinkError, SourceError, TransformError};
pub use order::{PaymentOrderRecord, PaymentOrderRow, TimestampField};
pub use result::Result;
