//! Source extraction
//!
//! The cutoff splits the collection into two disjoint windows on
//! `createdAt`: the historical set strictly before it and the incremental
//! set strictly after it. A document created exactly at the cutoff belongs
//! to neither window.

use crate::adapters::source::SourceConnection;
use crate::domain::order::fields;
use crate::domain::{Cutoff, Result};
use bson::{doc, Document};

/// Which side of the cutoff to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedAtWindow {
    /// `createdAt < cutoff`, rounded up to the next stored millisecond
    Before(Cutoff),
    /// `createdAt > cutoff`, rounded down to the stored millisecond
    After(Cutoff),
}

impl CreatedAtWindow {
    /// Query filter selecting this window
    pub fn filter(&self) -> Document {
        match self {
            CreatedAtWindow::Before(cutoff) => {
                doc! { (fields::CREATED_AT): { "$lt": cutoff.upper_bound() } }
            }
            CreatedAtWindow::After(cutoff) => {
                doc! { (fields::CREATED_AT): { "$gt": cutoff.lower_bound() } }
            }
        }
    }
}

/// Projection restricting results to the exported fields, `_id` excluded
pub fn projection() -> Document {
    let mut projection = doc! { "_id": 0 };
    for field in fields::ALL {
        projection.insert(field, 1);
    }
    projection
}

/// Reads both load windows from an open connection
pub struct Extractor<'a> {
    connection: &'a dyn SourceConnection,
    cutoff: Cutoff,
}

impl<'a> Extractor<'a> {
    pub fn new(connection: &'a dyn SourceConnection, cutoff: Cutoff) -> Self {
        Self { connection, cutoff }
    }

    /// Documents created before the cutoff, in storage order
    pub async fn historical(&self) -> Result<Vec<Document>> {
        self.read(CreatedAtWindow::Before(self.cutoff)).await
    }

    /// Documents created after the cutoff, in storage order
    pub async fn incremental(&self) -> Result<Vec<Document>> {
        self.read(CreatedAtWindow::After(self.cutoff)).await
    }

    async fn read(&self, window: CreatedAtWindow) -> Result<Vec<Document>> {
        let documents = self
            .connection
            .find(window.filter(), projection())
            .await?;

        tracing::debug!(
            collection = %self.connection.collection_name(),
            window = ?window,
            documents = documents.len(),
            "Extracted documents"
        );

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryConnector;
    use crate::adapters::source::SourceConnector;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn cutoff() -> Cutoff {
        Cutoff::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
    }

    fn created(day: u32, month: u32) -> bson::DateTime {
        bson::DateTime::from_chrono(Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_window_filters() {
        let before = CreatedAtWindow::Before(cutoff()).filter();
        let after = CreatedAtWindow::After(cutoff()).filter();

        let at = cutoff().to_bson();
        assert_eq!(before, doc! { "createdAt": { "$lt": at } });
        assert_eq!(after, doc! { "createdAt": { "$gt": at } });
    }

    #[test]
    fn test_projection_excludes_id_and_lists_fields() {
        let projection = projection();
        assert_eq!(projection.get_i32("_id").unwrap(), 0);
        for field in fields::ALL {
            assert_eq!(projection.get_i32(field).unwrap(), 1);
        }
        assert_eq!(projection.len(), fields::ALL.len() + 1);
    }

    #[tokio::test]
    async fn test_windows_are_disjoint_and_skip_exact_cutoff() {
        let connector = InMemoryConnector::new(vec![
            doc! { "_id": 1, "trackingnumber": "old", "createdAt": created(1, 5) },
            doc! { "_id": 2, "trackingnumber": "exact", "createdAt": cutoff().to_bson() },
            doc! { "_id": 3, "trackingnumber": "new", "createdAt": created(2, 6) },
            doc! { "_id": 4, "trackingnumber": "undated" },
        ]);
        let connection = connector.connect().await.unwrap();
        let extractor = Extractor::new(connection.as_ref(), cutoff());

        let historical = extractor.historical().await.unwrap();
        let incremental = extractor.incremental().await.unwrap();

        assert_eq!(historical.len(), 1);
        assert_eq!(historical[0].get_str("trackingnumber").unwrap(), "old");
        assert!(historical[0].get("_id").is_none());

        assert_eq!(incremental.len(), 1);
        assert_eq!(incremental[0].get_str("trackingnumber").unwrap(), "new");
    }

    #[tokio::test]
    async fn test_sub_millisecond_cutoff_keeps_neighbours() {
        let cutoff = Cutoff::from_str("2024-06-01T00:00:00.0005Z").unwrap();
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let connector = InMemoryConnector::new(vec![
            doc! { "trackingnumber": "older", "createdAt": bson::DateTime::from_chrono(base) },
            doc! {
                "trackingnumber": "newer",
                "createdAt": bson::DateTime::from_millis(base.timestamp_millis() + 1),
            },
        ]);
        let connection = connector.connect().await.unwrap();
        let extractor = Extractor::new(connection.as_ref(), cutoff);

        let historical = extractor.historical().await.unwrap();
        let incremental = extractor.incremental().await.unwrap();

        assert_eq!(historical.len(), 1);
        assert_eq!(historical[0].get_str("trackingnumber").unwrap(), "older");
        assert_eq!(incremental.len(), 1);
        assert_eq!(incremental[0].get_str("trackingnumber").unwrap(), "newer");
    }
}
