//! External system integrations.
//!
//! - [`source`] - Source abstraction layer (trait-based)
//! - [`mongodb`] - MongoDB implementation
//! - [`memory`] - In-memory implementation for tests and offline runs
//! - [`sink`] - CSV file writer
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies so the export pipeline can be
//! exercised against the in-memory source.
//!
//! ```rust,no_run
//! use payorders_etl::adapters::memory::InMemoryConnector;
//! use payorders_etl::adapters::source::SourceConnector;
//! use bson::doc;
//!
//! # async fn example() -> payorders_etl::domain::Result<()> {
//! let connector = InMemoryConnector::new(vec![doc! { "status": "paid" }]);
//! let connection = connector.connect().await?;
//! let documents = connection.find(doc! {}, doc! {}).await?;
//! assert_eq!(documents.len(), 1);
//! connection.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod mongodb;
pub mod sink;
pub mod source;
