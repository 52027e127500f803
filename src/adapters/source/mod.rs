//! Source abstraction layer
//!
//! This module provides a trait-based abstraction for the document store
//! the export reads from.

pub mod factory;
pub mod traits;

pub use factory::create_source_connector;
pub use traits::{SourceConnection, SourceConnector};
