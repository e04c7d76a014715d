//! Store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("batch of {size} deletes exceeds atomic limit of {limit}")]
    BatchLimit { size: usize, limit: usize },

    #[error("commit error: {0}")]
    Commit(String),

    #[error("backend error: {0}")]
    Backend(String),
}
