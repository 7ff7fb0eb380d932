//! Checkpoint state persisted between runs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-stream bookmark map, the unit of durability handed to the output
/// boundary.
///
/// A bookmark is only ever advanced to a value derived from records already
/// fully emitted downstream. Merges replace the whole value for one stream
/// key; other streams' bookmarks are never touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TapState {
    bookmarks: BTreeMap<String, String>,
}

impl TapState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bookmark for a stream, if any.
    pub fn bookmark(&self, stream: &str) -> Option<&str> {
        self.bookmarks.get(stream).map(String::as_str)
    }

    /// Replace the bookmark for one stream key. Idempotent for equal values.
    pub fn set_bookmark(&mut self, stream: impl Into<String>, value: impl Into<String>) {
        self.bookmarks.insert(stream.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    /// Number of streams with a stored bookmark.
    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }
}
