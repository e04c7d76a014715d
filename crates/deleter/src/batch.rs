//! Depth-tagged delete batches.

use firesweep_core::CollectionRef;
use firesweep_store::{StoreError, WriteBatch};

/// A buffered store write batch tagged with the depth of the collection it
/// was built from.
///
/// Depth only orders commits (deepest subtree first); it plays no part in
/// how documents are grouped into batches.
pub struct DeleteBatch {
    inner: Box<dyn WriteBatch>,
    depth: u32,
}

impl DeleteBatch {
    pub fn new(inner: Box<dyn WriteBatch>, depth: u32) -> Self {
        Self { inner, depth }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Commit the underlying store batch.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.inner.commit().await
    }
}

/// Everything one collection expansion produced: delete batches covering
/// the document snapshot, and the subcollections discovered under it.
#[derive(Default)]
pub(crate) struct Expansion {
    pub(crate) batches: Vec<DeleteBatch>,
    pub(crate) discovered: Vec<CollectionRef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use firesweep_store::{DocumentStore, MemoryStore};
    use serde_json::json;

    #[tokio::test]
    async fn test_commit_applies_buffered_deletes() {
        let store = MemoryStore::new();
        let a = store.insert("users/alice", json!({})).unwrap();
        let b = store.insert("users/bob", json!({})).unwrap();

        let mut inner = store.new_batch();
        inner.delete(a);
        inner.delete(b);
        let batch = DeleteBatch::new(inner, 1);
        assert_eq!(batch.depth(), 1);
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());

        batch.commit().await.unwrap();
        assert!(store.is_empty());
    }
}
