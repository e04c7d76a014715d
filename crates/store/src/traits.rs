//! Document-store capability surface.
//!
//! The deleter drives deletion entirely through these traits. Query
//! execution, consistency, and connection handling belong to the
//! implementation behind them.

use std::sync::Arc;

use async_trait::async_trait;

use firesweep_core::{CollectionRef, DocumentRef};

use crate::error::StoreError;

/// Hard upper bound on deletes in one atomic batch, imposed by the store.
pub const MAX_ATOMIC_BATCH: usize = 500;

/// Narrow async surface of a Firestore-style document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every top-level collection in the database.
    async fn list_root_collections(&self) -> Result<Vec<CollectionRef>, StoreError>;

    /// Point-in-time snapshot of the documents currently in `collection`.
    ///
    /// A collection with no documents yields an empty vec, never an error.
    async fn list_documents(
        &self,
        collection: &CollectionRef,
    ) -> Result<Vec<DocumentRef>, StoreError>;

    /// Direct subcollections under `document`.
    async fn list_subcollections(
        &self,
        document: &DocumentRef,
    ) -> Result<Vec<CollectionRef>, StoreError>;

    /// Start an empty write batch.
    fn new_batch(&self) -> Box<dyn WriteBatch>;
}

/// Blanket implementation so `Arc<dyn DocumentStore>` can be used directly.
#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn list_root_collections(&self) -> Result<Vec<CollectionRef>, StoreError> {
        (**self).list_root_collections().await
    }

    async fn list_documents(
        &self,
        collection: &CollectionRef,
    ) -> Result<Vec<DocumentRef>, StoreError> {
        (**self).list_documents(collection).await
    }

    async fn list_subcollections(
        &self,
        document: &DocumentRef,
    ) -> Result<Vec<CollectionRef>, StoreError> {
        (**self).list_subcollections(document).await
    }

    fn new_batch(&self) -> Box<dyn WriteBatch> {
        (**self).new_batch()
    }
}

/// Buffered atomic delete batch.
#[async_trait]
pub trait WriteBatch: Send {
    /// Buffer a delete for `document`.
    fn delete(&mut self, document: DocumentRef);

    /// Number of buffered deletes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Atomically apply every buffered delete.
    ///
    /// Implementations reject batches above [`MAX_ATOMIC_BATCH`] entries.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
