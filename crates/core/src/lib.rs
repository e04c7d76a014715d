pub mod config;
pub mod path;

pub use config::{load_dotenv, SweepConfig, DEFAULT_MAX_BATCH_SIZE};
pub use path::{
    is_collection_path, is_document_path, split_segments, CollectionRef, DocumentRef, PathPolicy,
    DEFAULT_TEST_MARKER,
};
