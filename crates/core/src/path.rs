use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker segment that namespaces test fixture data.
pub const DEFAULT_TEST_MARKER: &str = "__tests";

/// Split a path into its `/`-separated segments, ignoring empty ones.
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Whether `path` addresses a collection (odd segment count).
pub fn is_collection_path(path: &str) -> bool {
    let len = split_segments(path).len();
    len % 2 == 1
}

/// Whether `path` addresses a document (even, non-zero segment count).
pub fn is_document_path(path: &str) -> bool {
    let len = split_segments(path).len();
    len > 0 && len % 2 == 0
}

/// Path-normalization policy applied before segment and depth computation.
///
/// Paths namespaced under a test marker (`__tests/<fixture>/...`) are
/// unwrapped to the real tree they shadow: when a marker is configured,
/// the path has more than two segments, and the first segment equals the
/// marker, the leading marker pair is dropped. [`PathPolicy::verbatim`]
/// opts out entirely; `keep_marker` opts out per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPolicy {
    test_marker: Option<String>,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self {
            test_marker: Some(DEFAULT_TEST_MARKER.to_string()),
        }
    }
}

impl PathPolicy {
    /// Policy stripping a custom marker.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            test_marker: Some(marker.into()),
        }
    }

    /// Policy that leaves every path untouched.
    pub fn verbatim() -> Self {
        Self { test_marker: None }
    }

    /// Apply the policy to a segment list.
    pub fn apply<'s, 'p>(&self, segments: &'s [&'p str], keep_marker: bool) -> &'s [&'p str] {
        match &self.test_marker {
            Some(marker) if !keep_marker && segments.len() > 2 && segments[0] == marker => {
                &segments[2..]
            }
            _ => segments,
        }
    }

    /// Normalized segments of `path`.
    pub fn segments<'p>(&self, path: &'p str) -> Vec<&'p str> {
        let segments = split_segments(path);
        self.apply(&segments, false).to_vec()
    }

    /// Document levels above and including the referenced path:
    /// `ceil(normalized segment count / 2)`.
    pub fn depth_of(&self, path: &str) -> u32 {
        self.segments(path).len().div_ceil(2) as u32
    }
}

/// Opaque handle to a collection (or path-carrying query) in the store.
///
/// Carries the full path from the database root. The deleter only reads
/// it and asks the store to enumerate matching documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionRef {
    path: String,
}

impl CollectionRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reference to the document `id` inside this collection.
    pub fn doc(&self, id: &str) -> DocumentRef {
        DocumentRef::new(format!("{}/{}", self.path, id))
    }

    /// Number of document levels above and including this collection.
    pub fn depth(&self, policy: &PathPolicy) -> u32 {
        policy.depth_of(&self.path)
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Handle to a document in the store, identified by its full path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    path: String,
}

impl DocumentRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment.
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// The collection this document belongs to.
    pub fn parent(&self) -> CollectionRef {
        match self.path.rsplit_once('/') {
            Some((parent, _)) => CollectionRef::new(parent),
            None => CollectionRef::new(self.path.clone()),
        }
    }

    /// Reference to the subcollection `name` under this document.
    pub fn collection(&self, name: &str) -> CollectionRef {
        CollectionRef::new(format!("{}/{}", self.path, name))
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_segments_ignores_empties() {
        assert_eq!(split_segments("users/alice/posts"), vec!["users", "alice", "posts"]);
        assert_eq!(split_segments("/users//alice/"), vec!["users", "alice"]);
        assert!(split_segments("").is_empty());
    }

    #[test]
    fn test_path_parity() {
        assert!(is_collection_path("users"));
        assert!(is_collection_path("users/alice/posts"));
        assert!(!is_collection_path("users/alice"));
        assert!(is_document_path("users/alice"));
        assert!(!is_document_path("users"));
        assert!(!is_document_path(""));
    }

    #[test]
    fn test_depth_of_collection_paths() {
        let policy = PathPolicy::default();
        assert_eq!(policy.depth_of("users"), 1);
        assert_eq!(policy.depth_of("users/alice/posts"), 2);
        assert_eq!(policy.depth_of("users/alice/posts/p1/comments"), 3);
    }

    #[test]
    fn test_marker_stripped_before_depth() {
        let policy = PathPolicy::default();
        // __tests/fixture-a/users/alice/posts → users/alice/posts
        assert_eq!(policy.depth_of("__tests/fixture-a/users/alice/posts"), 2);
        assert_eq!(policy.segments("__tests/fixture-a/users"), vec!["users"]);
    }

    #[test]
    fn test_marker_kept_when_too_short() {
        // Two segments or fewer are left alone even when the first matches.
        let policy = PathPolicy::default();
        assert_eq!(policy.segments("__tests/users"), vec!["__tests", "users"]);
        assert_eq!(policy.depth_of("__tests/users"), 1);
    }

    #[test]
    fn test_marker_opt_out() {
        let policy = PathPolicy::default();
        let segments = split_segments("__tests/fixture-a/users");
        assert_eq!(policy.apply(&segments, true).len(), 3);

        let verbatim = PathPolicy::verbatim();
        assert_eq!(verbatim.depth_of("__tests/fixture-a/users"), 2);
    }

    #[test]
    fn test_custom_marker() {
        let policy = PathPolicy::with_marker("_fixtures");
        assert_eq!(policy.depth_of("_fixtures/run-1/users"), 1);
        assert_eq!(policy.depth_of("__tests/run-1/users"), 2);
    }

    #[test]
    fn test_collection_ref_doc_and_depth() {
        let users = CollectionRef::new("users");
        let alice = users.doc("alice");
        assert_eq!(alice.path(), "users/alice");
        assert_eq!(alice.id(), "alice");
        assert_eq!(alice.parent(), users);
        assert_eq!(alice.collection("posts").path(), "users/alice/posts");
        assert_eq!(users.depth(&PathPolicy::default()), 1);
    }
}
