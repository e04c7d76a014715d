use std::env;

use serde::{Deserialize, Serialize};

use crate::path::PathPolicy;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Deletes buffered per batch, one below the store's 500-entry atomic cap.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 499;

/// Tuning knobs for a tree-delete run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Maximum deletes buffered into one batch before a new one is started.
    pub max_batch_size: usize,
    /// Path normalization applied when computing batch depth.
    pub path_policy: PathPolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            path_policy: PathPolicy::default(),
        }
    }
}

impl SweepConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    ///
    /// - `FIRESWEEP_MAX_BATCH_SIZE` — batch size cap.
    /// - `FIRESWEEP_TEST_MARKER` — test-namespace marker; set to an empty
    ///   string to disable stripping, leave unset for the default marker.
    pub fn from_env() -> Self {
        let max_batch_size = env_opt("FIRESWEEP_MAX_BATCH_SIZE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_BATCH_SIZE);

        let path_policy = match env::var("FIRESWEEP_TEST_MARKER") {
            Ok(v) if v.is_empty() => PathPolicy::verbatim(),
            Ok(v) => PathPolicy::with_marker(v),
            Err(_) => PathPolicy::default(),
        };

        Self {
            max_batch_size,
            path_policy,
        }
    }
}
