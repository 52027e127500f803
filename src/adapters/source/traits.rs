//! Source abstraction traits
//!
//! This module defines the traits a document store adapter implements to
//! feed the export. The coordinator only ever sees these traits, so the
//! MongoDB driver and the in-memory store are interchangeable.

use crate::domain::Result;
use async_trait::async_trait;
use bson::Document;

/// Opens connections to a document store
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Connect and bind to the configured database and collection
    ///
    /// # Errors
    ///
    /// Returns a connection-kind error if the server cannot be reached or
    /// rejects the credentials.
    async fn connect(&self) -> Result<Box<dyn SourceConnection>>;

    /// Human-readable target with credentials redacted, for logs
    fn describe(&self) -> String;
}

/// A live connection bound to one collection
#[async_trait]
pub trait SourceConnection: Send + Sync {
    /// Database the connection is bound to
    fn database_name(&self) -> &str;

    /// Collection queries run against
    fn collection_name(&self) -> &str;

    /// Run a filtered, projected query
    ///
    /// Results come back in storage order and fully materialized.
    ///
    /// # Arguments
    ///
    /// * `filter` - Query filter document
    /// * `projection` - Field projection document
    ///
    /// # Errors
    ///
    /// Returns a query-kind error if the query cannot be executed or the
    /// cursor fails mid-iteration.
    async fn find(&self, filter: Document, projection: Document) -> Result<Vec<Document>>;

    /// Release the connection
    ///
    /// Called exactly once on every exit path after a successful connect.
    async fn close(&self) -> Result<()>;
}
