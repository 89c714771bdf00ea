// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Document and blob store abstractions.
//!
//! The platform keeps its records in a hierarchical document store: top-level collections such as
//! `users` or `videos`, and dependent subcollections such as `videos/{id}/comments`. Every
//! component in this crate talks to storage through [`DocumentStore`] and [`BlobStore`] so the
//! Postgres-backed adapters and the in-memory ones are interchangeable.

mod fs;
mod memory;
mod postgres;
mod subscription;

pub use fs::FsBlobStore;
pub use memory::{MemoryBlobStore, MemoryDocumentStore};
pub use postgres::PgDocumentStore;
pub use subscription::{subscribe_collection, CollectionSubscription};

use std::cmp::Ordering;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::StoreError;

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    collection: String,
    id: String,
}

impl DocPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path of a subcollection nested under this document
    pub fn child_collection(&self, name: &str) -> String {
        format!("{}/{}/{}", self.collection, self.id, name)
    }

    pub fn child(&self, name: &str, id: impl Into<String>) -> DocPath {
        DocPath::new(self.child_collection(name), id)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A stored document: its id plus the JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Decode the body into a typed record, filling in `id` when the body does not carry it
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        if let Value::Object(map) = &mut data {
            map.entry("id")
                .or_insert_with(|| Value::String(self.id.clone()));
        }
        Ok(serde_json::from_value(data)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Equality filters, optional ordering on one field and an optional limit.
///
/// Documents lacking the ordering field are excluded from ordered results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, data: &Value) -> bool {
        let filters_match = self
            .filters
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected));
        let has_order_field = match &self.order_by {
            Some(order) => data.get(&order.field).map_or(false, |v| !v.is_null()),
            None => true,
        };
        filters_match && has_order_field
    }

    /// Filter, stable-sort and truncate documents given in insertion order
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut docs: Vec<Document> = docs.into_iter().filter(|d| self.matches(&d.data)).collect();

        if let Some(order) = &self.order_by {
            docs.sort_by(|a, b| {
                let ord = compare_values(&a.data[&order.field], &b.data[&order.field]);
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            docs.truncate(limit);
        }
        docs
    }
}

/// Ordering between JSON scalars. RFC 3339 strings compare as instants.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.with_timezone(&Utc).cmp(&y.with_timezone(&Utc)),
                _ => x.cmp(y),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Hierarchical document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read; `None` when the document does not exist
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError>;

    /// One-shot query over a collection path such as `users` or `videos/{id}/comments`
    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Create or replace a document
    async fn set(&self, path: &DocPath, data: Value) -> Result<(), StoreError>;

    /// Merge top-level fields into an existing document; fails with `NotFound` if absent
    async fn update(&self, path: &DocPath, fields: Value) -> Result<(), StoreError>;

    /// Delete a document, returning whether this call removed it. Deleting an absent document
    /// succeeds with `false`. Subcollections are untouched.
    async fn delete(&self, path: &DocPath) -> Result<bool, StoreError>;

    /// Atomically add `delta` to a numeric field, treating a missing field as zero
    async fn increment(&self, path: &DocPath, field: &str, delta: i64) -> Result<(), StoreError>;
}

/// Binary object storage addressed by path
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// Read and decode a single document
pub async fn read<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &DocPath,
) -> Result<Option<T>, StoreError> {
    match store.get(path).await? {
        Some(doc) => Ok(Some(doc.decode()?)),
        None => Ok(None),
    }
}

/// Run a query and decode every document
pub async fn query<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    query: &Query,
) -> Result<Vec<T>, StoreError> {
    store
        .list(collection, query)
        .await?
        .iter()
        .map(Document::decode)
        .collect()
}

/// Decode every document that fits `T`, logging and skipping the rest
pub fn decode_valid<T: DeserializeOwned>(collection: &str, docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.decode() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping malformed document {}/{}: {}", collection, doc.id, e);
                None
            }
        })
        .collect()
}

/// Like [`query`], but malformed documents are skipped instead of failing the read
pub async fn query_valid<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    query: &Query,
) -> Result<Vec<T>, StoreError> {
    let docs = store.list(collection, query).await?;
    Ok(decode_valid(collection, &docs))
}

/// Encode a typed record and store it at `path`
pub async fn write<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    path: &DocPath,
    value: &T,
) -> Result<(), StoreError> {
    let data = serde_json::to_value(value)?;
    store.set(path, data).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document {
            id: id.to_string(),
            data,
        }
    }

    #[test]
    fn query_orders_timestamps_as_instants() {
        let docs = vec![
            doc("a", json!({"createdAt": "2026-03-01T10:00:00.500Z"})),
            doc("b", json!({"createdAt": "2026-03-01T10:00:00Z"})),
            doc("c", json!({"createdAt": "2026-03-02T00:00:00Z"})),
            doc("d", json!({"title": "no timestamp"})),
        ];

        let ordered = Query::new()
            .order_by("createdAt", Direction::Descending)
            .limit(2)
            .apply(docs);

        let ids: Vec<_> = ordered.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn equal_sort_keys_keep_insertion_order() {
        let docs = vec![
            doc("first", json!({"views": 3})),
            doc("second", json!({"views": 3})),
            doc("third", json!({"views": 9})),
        ];

        let ordered = Query::new()
            .order_by("views", Direction::Ascending)
            .apply(docs);

        let ids: Vec<_> = ordered.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn filters_require_exact_equality() {
        let query = Query::new().filter_eq("status", "pending");
        assert!(query.matches(&json!({"status": "pending"})));
        assert!(!query.matches(&json!({"status": "ai_replied"})));
        assert!(!query.matches(&json!({})));
    }

    #[test]
    fn decode_fills_missing_id() {
        #[derive(serde::Deserialize)]
        struct Named {
            id: String,
            name: String,
        }

        let named: Named = doc("u1", json!({"name": "Ada"})).decode().unwrap();
        assert_eq!(named.id, "u1");
        assert_eq!(named.name, "Ada");
    }

    #[test]
    fn child_paths_nest_under_parent() {
        let video = DocPath::new("videos", "v1");
        assert_eq!(video.child_collection("comments"), "videos/v1/comments");
        assert_eq!(video.child("reports", "r9").to_string(), "videos/v1/reports/r9");
    }
}
