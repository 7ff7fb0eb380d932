//! Stream definitions and replication strategies

use serde::{Deserialize, Serialize};

/// How a stream is replicated from the remote API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Re-fetch every record on each run.
    FullTable,
    /// Fetch only records whose replication key advanced past the bookmark.
    Incremental,
}

/// Process-wide extraction mode for a run.
///
/// A full run forces every stream's extraction plan to ignore stored
/// bookmarks; it does not change a stream's declared replication method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Full,
    Incremental,
}

/// Resolved, immutable view of one selected stream.
///
/// Constructed once from the catalog at sync start and held for the
/// duration of the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamDef {
    /// Stream name, unique within a run.
    pub name: String,
    /// Ordered field names forming a stable record identifier.
    pub key_properties: Vec<String>,
    /// Declared replication method.
    pub method: ReplicationMethod,
    /// Watermark field, present only for incremental streams.
    pub replication_key: Option<String>,
}

impl StreamDef {
    pub fn is_incremental(&self) -> bool {
        self.method == ReplicationMethod::Incremental
    }
}
