//! Selectable stream catalog
//!
//! Produced by discovery, annotated with selection metadata by the operator,
//! and consumed by the sync engine. The JSON shape follows the Singer
//! catalog convention: per-stream schema plus a list of breadcrumbed
//! metadata entries, where the entry with an empty breadcrumb carries
//! stream-level keys (`selected`, `replication-method`, `replication-key`,
//! `table-key-properties`).

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full stream catalog keyed by stream name.
///
/// `IndexMap` keeps iteration in the order the catalog document declares
/// its streams, so runs process streams in the order the operator wrote.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub streams: IndexMap<String, CatalogEntry>,
}

/// One stream's catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// JSON schema for the stream's records.
    pub schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_properties: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<MetadataEntry>>,
}

/// A single breadcrumbed metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataEntry {
    pub breadcrumb: Vec<String>,
    pub metadata: BTreeMap<String, Value>,
}

impl MetadataEntry {
    /// Whether this entry carries stream-level (empty breadcrumb) metadata.
    pub fn is_stream_level(&self) -> bool {
        self.breadcrumb.is_empty()
    }
}

impl CatalogEntry {
    /// Stream-level metadata map, if the catalog declares one.
    pub fn stream_metadata(&self) -> Option<&BTreeMap<String, Value>> {
        self.metadata
            .as_ref()?
            .iter()
            .find(|entry| entry.is_stream_level())
            .map(|entry| &entry.metadata)
    }

    /// A stream-level metadata value by key.
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.stream_metadata()?.get(key)
    }

    /// Whether the operator marked this stream for extraction.
    pub fn is_selected(&self) -> bool {
        self.metadata_value("selected")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether the entry has a usable (non-null, object) schema.
    pub fn has_schema(&self) -> bool {
        self.schema.is_object()
    }
}
