//! In-memory document store
//!
//! Evaluates the same filter and projection documents the MongoDB adapter
//! sends, over a fixed vector of documents kept in storage order. Supports
//! equality plus the `$eq`, `$ne`, `$lt`, `$lte`, `$gt` and `$gte` operators,
//! and inclusion or exclusion projections.

use crate::adapters::source::traits::{SourceConnection, SourceConnector};
use crate::domain::{Result, SourceError};
use async_trait::async_trait;
use bson::{Bson, Document};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Connector over an in-memory collection
#[derive(Clone)]
pub struct InMemoryConnector {
    documents: Arc<Vec<Document>>,
    database: String,
    collection: String,
    closed: Arc<AtomicUsize>,
}

impl InMemoryConnector {
    /// Create a connector serving `documents` in the given order
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: Arc::new(documents),
            database: "memory".to_string(),
            collection: "payment_orders".to_string(),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of connections opened by this connector that have been closed
    pub fn closed_count(&self) -> usize {
        self.closed.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl SourceConnector for InMemoryConnector {
    async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
        Ok(Box::new(InMemoryConnection {
            documents: Arc::clone(&self.documents),
            database: self.database.clone(),
            collection: self.collection.clone(),
            closed: Arc::clone(&self.closed),
        }))
    }

    fn describe(&self) -> String {
        format!(
            "memory ({}.{}, {} documents)",
            self.database,
            self.collection,
            self.documents.len()
        )
    }
}

/// Connection over an in-memory collection
pub struct InMemoryConnection {
    documents: Arc<Vec<Document>>,
    database: String,
    collection: String,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl SourceConnection for InMemoryConnection {
    fn database_name(&self) -> &str {
        &self.database
    }

    fn collection_name(&self) -> &str {
        &self.collection
    }

    async fn find(&self, filter: Document, projection: Document) -> Result<Vec<Document>> {
        let mut results = Vec::new();
        for document in self.documents.iter() {
            let matched = matches(document, &filter).map_err(|message| {
                SourceError::QueryFailed {
                    collection: self.collection.clone(),
                    message,
                }
            })?;
            if matched {
                results.push(project(document, &projection));
            }
        }
        Ok(results)
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }
}

/// Evaluate a filter document against a document
///
/// # Errors
///
/// Returns a message for operators this store does not implement.
pub fn matches(document: &Document, filter: &Document) -> std::result::Result<bool, String> {
    for (field, condition) in filter {
        let value = document.get(field);
        let matched = match condition {
            Bson::Document(ops) if is_operator_document(ops) => {
                let mut all = true;
                for (op, operand) in ops {
                    if !apply_operator(value, op, operand)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            expected => value
                .map(|v| compare(v, expected) == Some(Ordering::Equal))
                .unwrap_or(matches!(expected, Bson::Null)),
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn is_operator_document(doc: &Document) -> bool {
    !doc.is_empty() && doc.keys().all(|k| k.starts_with('$'))
}

fn apply_operator(value: Option<&Bson>, op: &str, operand: &Bson) -> std::result::Result<bool, String> {
    let ordering = value.and_then(|v| compare(v, operand));
    let result = match op {
        "$eq" => ordering == Some(Ordering::Equal),
        "$ne" => ordering != Some(Ordering::Equal),
        "$lt" => ordering == Some(Ordering::Less),
        "$lte" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        "$gt" => ordering == Some(Ordering::Greater),
        "$gte" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        other => return Err(format!("unsupported query operator '{other}'")),
    };
    Ok(result)
}

/// Compare two values the way a range query does
///
/// Values of different type brackets never compare, so a string
/// `createdAt` matches neither side of a datetime cutoff.
fn compare(left: &Bson, right: &Bson) -> Option<Ordering> {
    match (left, right) {
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.cmp(b)),
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        (a, b) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => (a == b).then_some(Ordering::Equal),
        },
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Apply a projection document
///
/// With any included field, only included fields (and `_id` unless it is
/// excluded) are kept, in document order. Otherwise excluded fields are
/// dropped.
pub fn project(document: &Document, projection: &Document) -> Document {
    if projection.is_empty() {
        return document.clone();
    }

    let include_id = projection.get("_id").map(is_truthy).unwrap_or(true);
    let included: Vec<&str> = projection
        .iter()
        .filter(|(k, v)| k.as_str() != "_id" && is_truthy(v))
        .map(|(k, _)| k.as_str())
        .collect();

    let mut out = Document::new();
    for (key, value) in document {
        let keep = if key == "_id" {
            include_id
        } else if included.is_empty() {
            projection.get(key).map(is_truthy).unwrap_or(true)
        } else {
            included.contains(&key.as_str())
        };
        if keep {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(v) => *v != 0,
        Bson::Int64(v) => *v != 0,
        Bson::Double(v) => *v != 0.0,
        Bson::Null => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::{TimeZone, Utc};

    fn at(day: u32) -> bson::DateTime {
        bson::DateTime::from_chrono(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_range_operators_on_dates() {
        let document = doc! { "createdAt": at(10) };

        assert!(matches(&document, &doc! { "createdAt": { "$lt": at(11) } }).unwrap());
        assert!(!matches(&document, &doc! { "createdAt": { "$lt": at(10) } }).unwrap());
        assert!(matches(&document, &doc! { "createdAt": { "$lte": at(10) } }).unwrap());
        assert!(matches(&document, &doc! { "createdAt": { "$gt": at(9) } }).unwrap());
        assert!(!matches(&document, &doc! { "createdAt": { "$gt": at(10) } }).unwrap());
        assert!(matches(&document, &doc! { "createdAt": { "$gte": at(10) } }).unwrap());
    }

    #[test]
    fn test_missing_field_never_matches_range() {
        let document = doc! { "trackingnumber": "T-1" };
        assert!(!matches(&document, &doc! { "createdAt": { "$lt": at(10) } }).unwrap());
        assert!(!matches(&document, &doc! { "createdAt": { "$gt": at(10) } }).unwrap());
    }

    #[test]
    fn test_type_mismatch_never_matches_range() {
        let document = doc! { "createdAt": "2024-01-05" };
        assert!(!matches(&document, &doc! { "createdAt": { "$lt": at(10) } }).unwrap());
        assert!(!matches(&document, &doc! { "createdAt": { "$gt": at(1) } }).unwrap());
    }

    #[test]
    fn test_equality_and_numeric_brackets() {
        let document = doc! { "status": "paid", "noOfItems": 3 };
        assert!(matches(&document, &doc! { "status": "paid" }).unwrap());
        assert!(matches(&document, &doc! { "noOfItems": 3.0 }).unwrap());
        assert!(!matches(&document, &doc! { "status": "failed" }).unwrap());
    }

    #[test]
    fn test_unsupported_operator_is_error() {
        let document = doc! { "status": "paid" };
        let err = matches(&document, &doc! { "status": { "$regex": "^p" } }).unwrap_err();
        assert!(err.contains("$regex"));
    }

    #[test]
    fn test_inclusion_projection_drops_id_and_extra_fields() {
        let document = doc! { "_id": 1, "createdAt": at(1), "secret": "x", "status": "paid" };
        let projected = project(&document, &doc! { "_id": 0, "createdAt": 1, "status": 1 });

        assert_eq!(projected, doc! { "createdAt": at(1), "status": "paid" });
    }

    #[test]
    fn test_inclusion_projection_keeps_id_by_default() {
        let document = doc! { "_id": 1, "status": "paid", "other": 2 };
        let projected = project(&document, &doc! { "status": 1 });
        assert_eq!(projected, doc! { "_id": 1, "status": "paid" });
    }

    #[test]
    fn test_exclusion_projection() {
        let document = doc! { "_id": 1, "status": "paid", "other": 2 };
        let projected = project(&document, &doc! { "other": 0 });
        assert_eq!(projected, doc! { "_id": 1, "status": "paid" });
    }

    #[tokio::test]
    async fn test_find_preserves_storage_order_and_counts_close() {
        let connector = InMemoryConnector::new(vec![
            doc! { "n": 3, "createdAt": at(3) },
            doc! { "n": 1, "createdAt": at(1) },
            doc! { "n": 2, "createdAt": at(2) },
        ]);
        let connection = connector.connect().await.unwrap();

        let found = connection
            .find(doc! { "createdAt": { "$gt": at(1) } }, doc! { "n": 1, "_id": 0 })
            .await
            .unwrap();
        assert_eq!(found, vec![doc! { "n": 3 }, doc! { "n": 2 }]);

        assert_eq!(connector.closed_count(), 0);
        connection.close().await.unwrap();
        assert_eq!(connector.closed_count(), 1);
    }
}
