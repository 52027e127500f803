//! MongoDB client implementation
//!
//! This module provides the connector and connection for reading payment
//! orders from MongoDB.

use crate::adapters::source::traits::{SourceConnection, SourceConnector};
use crate::config::schema::SourceConfig;
use crate::config::secret::redact_uri;
use crate::domain::{Result, SourceError};
use async_trait::async_trait;
use bson::{doc, Document};
use futures::stream::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection};
use std::time::Duration;

/// Opens MongoDB connections for the configured collection
pub struct MongoConnector {
    /// Configuration
    config: SourceConfig,
}

impl MongoConnector {
    /// Create a new connector
    ///
    /// Nothing is contacted until [`SourceConnector::connect`].
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    async fn client_options(&self) -> Result<ClientOptions> {
        use secrecy::ExposeSecret;

        let uri: &str = self.config.uri.expose_secret().as_ref();
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| SourceError::InvalidUri(format!("{}: {}", redact_uri(uri), e.kind)))?;

        let timeout = Duration::from_secs(self.config.connect_timeout_seconds);
        options.app_name = Some(self.config.app_name.clone());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        Ok(options)
    }
}

#[async_trait]
impl SourceConnector for MongoConnector {
    async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
        let options = self.client_options().await?;
        let client = Client::with_options(options)
            .map_err(|e| SourceError::ConnectionFailed(e.kind.to_string()))?;

        let database = client.database(&self.config.database);

        // The driver connects lazily; ping so unreachable servers and bad
        // credentials fail here rather than on the first query.
        if let Err(e) = database.run_command(doc! { "ping": 1 }, None).await {
            client.shutdown().await;
            return Err(connect_error(&e).into());
        }

        tracing::info!(
            target_uri = %self.describe(),
            "Connected to MongoDB"
        );

        let collection = database.collection::<Document>(&self.config.collection);

        Ok(Box::new(MongoConnection {
            client,
            collection,
            database_name: self.config.database.clone(),
            collection_name: self.config.collection.clone(),
        }))
    }

    fn describe(&self) -> String {
        use secrecy::ExposeSecret;

        format!(
            "{} ({}.{})",
            redact_uri(self.config.uri.expose_secret().as_ref()),
            self.config.database,
            self.config.collection
        )
    }
}

/// A MongoDB connection bound to one collection
pub struct MongoConnection {
    client: Client,
    collection: Collection<Document>,
    database_name: String,
    collection_name: String,
}

#[async_trait]
impl SourceConnection for MongoConnection {
    fn database_name(&self) -> &str {
        &self.database_name
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    async fn find(&self, filter: Document, projection: Document) -> Result<Vec<Document>> {
        tracing::debug!(
            collection = %self.collection_name,
            filter = %filter,
            "Running find"
        );

        let options = FindOptions::builder().projection(projection).build();
        let cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(|e| self.query_error(&e))?;

        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| self.query_error(&e))?;

        Ok(documents)
    }

    async fn close(&self) -> Result<()> {
        // Client is a handle over shared state; shutting down a clone
        // closes the underlying pool.
        self.client.clone().shutdown().await;
        tracing::debug!(database = %self.database_name, "MongoDB client shut down");
        Ok(())
    }
}

impl MongoConnection {
    fn query_error(&self, err: &mongodb::error::Error) -> SourceError {
        SourceError::QueryFailed {
            collection: self.collection_name.clone(),
            message: err.kind.to_string(),
        }
    }
}

fn connect_error(err: &mongodb::error::Error) -> SourceError {
    match err.kind.as_ref() {
        ErrorKind::Authentication { message, .. } => {
            SourceError::AuthenticationFailed(message.clone())
        }
        other => SourceError::ConnectionFailed(other.to_string()),
    }
}
