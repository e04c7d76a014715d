//! Recursive tree-delete scheduler.
//!
//! Drives a [`DocumentStore`] through depth-first deletion of a
//! collection/document tree. Tree shape is discovered incrementally (a
//! document's subcollections are unknown until listed), so the scheduler
//! alternates between expanding collections into delete batches and
//! committing batches deepest-first, guaranteeing child documents are
//! dispatched for deletion no later than their parents.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use firesweep_core::{CollectionRef, SweepConfig};
use firesweep_store::{DocumentStore, StoreError};

use crate::batch::{DeleteBatch, Expansion};
use crate::error::SweepError;

/// Recursive tree deleter over a [`DocumentStore`].
///
/// Holds three work queues (collections awaiting expansion, built batches
/// awaiting a depth-ordered commit turn, and in-flight commits) and
/// drains exactly one queue per step until all are empty. `&mut self` on
/// the entry points keeps a single request active at a time; starting a
/// new request discards whatever an abandoned run left queued.
pub struct TreeDeleter {
    store: Arc<dyn DocumentStore>,
    config: SweepConfig,
    pending_collections: Vec<CollectionRef>,
    pending_batches: Vec<DeleteBatch>,
    pending_commits: Vec<JoinHandle<Result<(), StoreError>>>,
}

impl TreeDeleter {
    pub fn new(store: Arc<dyn DocumentStore>, config: SweepConfig) -> Self {
        Self {
            store,
            config,
            pending_collections: Vec::new(),
            pending_batches: Vec::new(),
            pending_commits: Vec::new(),
        }
    }

    pub fn with_defaults(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, SweepConfig::default())
    }

    /// Delete every document reachable from any top-level collection.
    pub async fn delete_all(&mut self) -> Result<(), SweepError> {
        self.reset();
        let roots = match self.store.list_root_collections().await {
            Ok(roots) => roots,
            Err(e) => {
                error!(error = %e, "failed to list root collections");
                return Err(e.into());
            }
        };
        info!(collections = roots.len(), "starting full tree delete");
        self.pending_collections = roots;
        self.run().await
    }

    /// Delete every document reachable from the given collections, leaving
    /// unrelated collections untouched.
    pub async fn delete_collections(
        &mut self,
        collections: Vec<CollectionRef>,
    ) -> Result<(), SweepError> {
        self.reset();
        info!(collections = collections.len(), "starting tree delete");
        self.pending_collections = collections;
        self.run().await
    }

    /// Discard all queued work. In-flight commits are detached, not awaited.
    fn reset(&mut self) {
        self.pending_collections.clear();
        self.pending_batches.clear();
        self.pending_commits.clear();
    }

    async fn run(&mut self) -> Result<(), SweepError> {
        let result = self.step_loop().await;
        match &result {
            Ok(()) => info!("tree delete complete"),
            Err(e) => error!(error = %e, "tree delete failed"),
        }
        result
    }

    /// Drain one queue per step, strict priority order, until nothing is
    /// queued anywhere.
    async fn step_loop(&mut self) -> Result<(), SweepError> {
        loop {
            if !self.pending_collections.is_empty() {
                self.expand_wave().await?;
            } else if !self.pending_batches.is_empty() {
                self.commit_deepest().await?;
            } else if !self.pending_commits.is_empty() {
                self.drain_commits().await?;
            } else {
                return Ok(());
            }
            // Work arriving mid-step waits for the next turn.
            tokio::task::yield_now().await;
        }
    }

    /// Expand the entire current pending-collections queue concurrently,
    /// then merge the results back in.
    async fn expand_wave(&mut self) -> Result<(), SweepError> {
        let wave = std::mem::take(&mut self.pending_collections);
        debug!(collections = wave.len(), "expanding collection wave");

        let expansions = try_join_all(wave.into_iter().map(|collection| {
            expand(Arc::clone(&self.store), self.config.clone(), collection)
        }))
        .await?;

        for expansion in expansions {
            let has_children = !expansion.discovered.is_empty();
            self.pending_collections.extend(expansion.discovered);
            if has_children {
                // Some document in this snapshot owns a live subtree; its
                // batches must wait for a depth-ordered turn.
                self.pending_batches.extend(expansion.batches);
            } else {
                // Leaf documents: dispatch immediately.
                for batch in expansion.batches {
                    self.pending_commits.push(tokio::spawn(batch.commit()));
                }
            }
        }
        Ok(())
    }

    /// Commit every batch sharing the current maximum depth, concurrently.
    /// Equal-depth batches are mutually independent.
    async fn commit_deepest(&mut self) -> Result<(), SweepError> {
        self.pending_batches
            .sort_by(|a, b| b.depth().cmp(&a.depth()));
        let depth = self.pending_batches[0].depth();
        let split = self
            .pending_batches
            .partition_point(|batch| batch.depth() == depth);
        let wave: Vec<DeleteBatch> = self.pending_batches.drain(..split).collect();

        debug!(depth, batches = wave.len(), "committing deepest batches");
        try_join_all(wave.into_iter().map(DeleteBatch::commit)).await?;
        Ok(())
    }

    /// Await every in-flight commit dispatched by earlier steps.
    async fn drain_commits(&mut self) -> Result<(), SweepError> {
        let commits = std::mem::take(&mut self.pending_commits);
        debug!(commits = commits.len(), "draining in-flight commits");
        for joined in join_all(commits).await {
            joined??;
        }
        Ok(())
    }
}

/// Expand one collection: snapshot its documents, chunk them into
/// depth-tagged batches, and list every document's subcollections. All
/// subcollection listings settle before the result is handed back, so the
/// caller routes batches knowing whether the snapshot owns any subtree.
async fn expand(
    store: Arc<dyn DocumentStore>,
    config: SweepConfig,
    collection: CollectionRef,
) -> Result<Expansion, SweepError> {
    let documents = store.list_documents(&collection).await?;
    if documents.is_empty() {
        return Ok(Expansion::default());
    }

    let depth = collection.depth(&config.path_policy);
    debug!(
        collection = %collection,
        documents = documents.len(),
        depth,
        "expanding collection"
    );

    let mut batches = Vec::new();
    for chunk in documents.chunks(config.max_batch_size) {
        let mut batch = store.new_batch();
        for document in chunk {
            batch.delete(document.clone());
        }
        batches.push(DeleteBatch::new(batch, depth));
    }

    let listings = try_join_all(
        documents
            .iter()
            .map(|document| store.list_subcollections(document)),
    )
    .await?;
    let discovered: Vec<CollectionRef> = listings.into_iter().flatten().collect();

    Ok(Expansion {
        batches,
        discovered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use firesweep_store::MemoryStore;
    use serde_json::json;

    fn store_arc(store: &MemoryStore) -> Arc<dyn DocumentStore> {
        Arc::new(store.clone())
    }

    #[tokio::test]
    async fn test_expand_empty_collection_is_noop() {
        let store = MemoryStore::new();
        let expansion = expand(
            store_arc(&store),
            SweepConfig::default(),
            CollectionRef::new("ghosts"),
        )
        .await
        .unwrap();
        assert!(expansion.batches.is_empty());
        assert!(expansion.discovered.is_empty());
    }

    #[tokio::test]
    async fn test_expand_chunks_snapshot_into_batches() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert(format!("bulk/doc-{i}"), json!({})).unwrap();
        }
        let config = SweepConfig {
            max_batch_size: 2,
            ..SweepConfig::default()
        };

        let expansion = expand(store_arc(&store), config, CollectionRef::new("bulk"))
            .await
            .unwrap();

        assert!(expansion.discovered.is_empty());
        let sizes: Vec<usize> = expansion.batches.iter().map(DeleteBatch::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert!(expansion.batches.iter().all(|b| b.depth() == 1));
    }

    #[tokio::test]
    async fn test_expand_discovers_subcollections() {
        let store = MemoryStore::new();
        store.insert("users/alice", json!({})).unwrap();
        store.insert("users/alice/posts/p1", json!({})).unwrap();
        store.insert("users/alice/drafts/d1", json!({})).unwrap();
        store.insert("users/bob", json!({})).unwrap();

        let expansion = expand(
            store_arc(&store),
            SweepConfig::default(),
            CollectionRef::new("users"),
        )
        .await
        .unwrap();

        assert_eq!(expansion.batches.len(), 1);
        assert_eq!(expansion.batches[0].depth(), 1);
        let mut discovered: Vec<&str> =
            expansion.discovered.iter().map(|c| c.path()).collect();
        discovered.sort();
        assert_eq!(discovered, vec!["users/alice/drafts", "users/alice/posts"]);
    }

    #[tokio::test]
    async fn test_expand_depth_follows_path_policy() {
        let store = MemoryStore::new();
        store.insert("__tests/run-1/users/alice", json!({})).unwrap();

        let stripped = expand(
            store_arc(&store),
            SweepConfig::default(),
            CollectionRef::new("__tests/run-1/users"),
        )
        .await
        .unwrap();
        assert_eq!(stripped.batches[0].depth(), 1);

        let verbatim = expand(
            store_arc(&store),
            SweepConfig {
                path_policy: firesweep_core::PathPolicy::verbatim(),
                ..SweepConfig::default()
            },
            CollectionRef::new("__tests/run-1/users"),
        )
        .await
        .unwrap();
        assert_eq!(verbatim.batches[0].depth(), 2);
    }
}
