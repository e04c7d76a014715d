//! Hermetic in-memory document store.
//!
//! Keeps the whole tree as an ordered map of document path to JSON value.
//! Deleting a document never touches its subcollections; they live on
//! under the same path prefix, exactly as in the real store. Every
//! committed batch is appended to a commit log so hosts and tests can
//! observe dispatch order.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use firesweep_core::{is_collection_path, is_document_path, CollectionRef, DocumentRef};

use crate::error::StoreError;
use crate::traits::{DocumentStore, WriteBatch, MAX_ATOMIC_BATCH};

/// One committed delete batch, recorded in commit order.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRecord {
    /// Paths deleted by the batch, in buffer order.
    pub paths: Vec<String>,
    pub committed_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    docs: BTreeMap<String, Value>,
    commit_log: Vec<CommitRecord>,
}

/// In-memory [`DocumentStore`] backend.
///
/// Cloning is cheap and shares the underlying tree.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` at an explicit document path.
    pub fn insert(&self, path: impl Into<String>, value: Value) -> Result<DocumentRef, StoreError> {
        let path = path.into();
        if !is_document_path(&path) {
            return Err(StoreError::InvalidPath(format!(
                "not a document path: {path}"
            )));
        }
        self.inner.lock().unwrap().docs.insert(path.clone(), value);
        Ok(DocumentRef::new(path))
    }

    /// Write `value` under `collection` with a generated document id.
    pub fn add(
        &self,
        collection: impl AsRef<str>,
        value: Value,
    ) -> Result<DocumentRef, StoreError> {
        let collection = collection.as_ref();
        if !is_collection_path(collection) {
            return Err(StoreError::InvalidPath(format!(
                "not a collection path: {collection}"
            )));
        }
        let id = Uuid::new_v4().simple().to_string();
        self.insert(format!("{collection}/{id}"), value)
    }

    /// Current value at `path`, if the document exists.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.inner.lock().unwrap().docs.get(path).cloned()
    }

    /// Number of documents in the store.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every committed batch, in commit order.
    pub fn commit_log(&self) -> Vec<CommitRecord> {
        self.inner.lock().unwrap().commit_log.clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_root_collections(&self) -> Result<Vec<CollectionRef>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let roots: BTreeSet<&str> = inner
            .docs
            .keys()
            .filter_map(|path| path.split('/').next())
            .collect();
        Ok(roots.into_iter().map(CollectionRef::new).collect())
    }

    async fn list_documents(
        &self,
        collection: &CollectionRef,
    ) -> Result<Vec<DocumentRef>, StoreError> {
        if !is_collection_path(collection.path()) {
            return Err(StoreError::InvalidPath(format!(
                "not a collection path: {collection}"
            )));
        }
        let prefix = format!("{}/", collection.path());
        let inner = self.inner.lock().unwrap();
        let documents = inner
            .docs
            .keys()
            .filter_map(|path| {
                let rest = path.strip_prefix(&prefix)?;
                // Direct children only; nested paths belong to subcollections.
                (!rest.is_empty() && !rest.contains('/')).then(|| DocumentRef::new(path.clone()))
            })
            .collect();
        Ok(documents)
    }

    async fn list_subcollections(
        &self,
        document: &DocumentRef,
    ) -> Result<Vec<CollectionRef>, StoreError> {
        if !is_document_path(document.path()) {
            return Err(StoreError::InvalidPath(format!(
                "not a document path: {document}"
            )));
        }
        let prefix = format!("{}/", document.path());
        let inner = self.inner.lock().unwrap();
        let names: BTreeSet<&str> = inner
            .docs
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix)?.split('/').next())
            .collect();
        Ok(names
            .into_iter()
            .map(|name| document.collection(name))
            .collect())
    }

    fn new_batch(&self) -> Box<dyn WriteBatch> {
        Box::new(MemoryBatch {
            inner: Arc::clone(&self.inner),
            deletes: Vec::new(),
        })
    }
}

struct MemoryBatch {
    inner: Arc<Mutex<Inner>>,
    deletes: Vec<DocumentRef>,
}

#[async_trait]
impl WriteBatch for MemoryBatch {
    fn delete(&mut self, document: DocumentRef) {
        self.deletes.push(document);
    }

    fn len(&self) -> usize {
        self.deletes.len()
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        if self.deletes.len() > MAX_ATOMIC_BATCH {
            return Err(StoreError::BatchLimit {
                size: self.deletes.len(),
                limit: MAX_ATOMIC_BATCH,
            });
        }

        let mut inner = self.inner.lock().unwrap();
        let paths: Vec<String> = self
            .deletes
            .iter()
            .map(|document| document.path().to_string())
            .collect();
        for path in &paths {
            // Deleting an absent document is a no-op, as in the real store.
            inner.docs.remove(path);
        }
        debug!(deletes = paths.len(), "committed delete batch");
        inner.commit_log.push(CommitRecord {
            paths,
            committed_at: Utc::now(),
        });
        Ok(())
    }
}
