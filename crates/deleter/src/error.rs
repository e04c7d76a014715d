//! Deleter error types.

use thiserror::Error;

use firesweep_store::StoreError;

/// Failure of a tree-delete request.
///
/// The first failing list, expansion, or commit operation aborts the
/// request; remaining queued work is dropped, not awaited.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("commit task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
