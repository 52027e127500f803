//! CSV sink
//!
//! Writes normalized payment order rows to a local CSV file, either
//! replacing it (full load) or appending to it (incremental load).

pub mod writer;

pub use writer::{CsvSink, WriteMode};
