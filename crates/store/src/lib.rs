pub mod error;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use memory::{CommitRecord, MemoryStore};
pub use traits::{DocumentStore, WriteBatch, MAX_ATOMIC_BATCH};
