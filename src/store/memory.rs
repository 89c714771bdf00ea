// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{BlobStore, DocPath, Document, DocumentStore, Query};
use crate::error::StoreError;

/// In-memory document store that keeps documents in insertion order.
///
/// Deletes and collection reads can be made to fail for chosen paths, which is how partial
/// failures of cascading operations are exercised.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    failing_deletes: RwLock<HashSet<DocPath>>,
    failing_lists: RwLock<HashSet<String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delete of `path` fail with a backend error
    pub async fn fail_deletes_of(&self, path: DocPath) {
        self.failing_deletes.write().await.insert(path);
    }

    /// Make every read of `collection` fail with a backend error
    pub async fn fail_lists_of(&self, collection: impl Into<String>) {
        self.failing_lists.write().await.insert(collection.into());
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub async fn contains(&self, path: &DocPath) -> bool {
        self.collections
            .read()
            .await
            .get(path.collection())
            .map_or(false, |docs| docs.iter().any(|d| d.id == path.id()))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(path.collection())
            .and_then(|docs| docs.iter().find(|d| d.id == path.id()))
            .cloned())
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        if self.failing_lists.read().await.contains(collection) {
            return Err(StoreError::Backend(format!("read of {} failed", collection)));
        }
        let docs = self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();
        Ok(query.apply(docs))
    }

    async fn set(&self, path: &DocPath, data: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(path.collection().to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == path.id()) {
            Some(existing) => existing.data = data,
            None => docs.push(Document {
                id: path.id().to_string(),
                data,
            }),
        }
        Ok(())
    }

    async fn update(&self, path: &DocPath, fields: Value) -> Result<(), StoreError> {
        let Value::Object(fields) = fields else {
            return Err(StoreError::Backend("update fields must be an object".into()));
        };
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(path.collection())
            .and_then(|docs| docs.iter_mut().find(|d| d.id == path.id()))
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;

        match &mut doc.data {
            Value::Object(map) => map.extend(fields),
            other => *other = Value::Object(fields),
        }
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<bool, StoreError> {
        if self.failing_deletes.read().await.contains(path) {
            return Err(StoreError::Backend(format!("delete of {} failed", path)));
        }
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(path.collection()) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != path.id());
        Ok(docs.len() < before)
    }

    async fn increment(&self, path: &DocPath, field: &str, delta: i64) -> Result<(), StoreError> {
        // The write lock makes the read-add-store below a single atomic step
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(path.collection())
            .and_then(|docs| docs.iter_mut().find(|d| d.id == path.id()))
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;

        let Value::Object(map) = &mut doc.data else {
            return Err(StoreError::Backend(format!("{} is not an object", path)));
        };
        let current = map
            .get(field)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(0);
        map.insert(field.to_string(), Value::from(current + delta));
        Ok(())
    }
}

/// In-memory blob store
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashSet<String>>,
    failing: RwLock<HashSet<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, path: impl Into<String>) {
        self.blobs.write().await.insert(path.into());
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.read().await.contains(path)
    }

    pub async fn fail_deletes_of(&self, path: impl Into<String>) {
        self.failing.write().await.insert(path.into());
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        if self.failing.read().await.contains(path) {
            return Err(StoreError::Backend(format!("blob delete of {} failed", path)));
        }
        if self.blobs.write().await.remove(path) {
            Ok(())
        } else {
            Err(StoreError::NotFound(path.to_string()))
        }
    }
}
