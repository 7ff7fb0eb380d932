//! Catalog selection and discovery annotation
//!
//! Selection turns the operator-annotated catalog into the resolved stream
//! list a run will process. Annotation fills in the defaults discovery
//! guarantees: `key_properties = ["id"]` and one "available" inclusion entry
//! per top-level schema property.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use saasoptics_domain::constants::DEFAULT_KEY_PROPERTY;
use saasoptics_domain::{
    Catalog, CatalogEntry, MetadataEntry, ReplicationMethod, Result, StreamDef, TapError,
};

/// Resolve the selected streams from a catalog, preserving the order the
/// catalog declares them in.
///
/// # Errors
/// Returns `TapError::Config` when a selected stream has no usable schema or
/// declares incremental replication without a replication key. Both are
/// fatal configuration mistakes, reported before any extraction starts.
pub fn selected_streams(catalog: &Catalog) -> Result<Vec<StreamDef>> {
    let mut streams = Vec::new();

    for (name, entry) in &catalog.streams {
        if !entry.is_selected() {
            debug!(stream = %name, "stream not selected, skipping");
            continue;
        }
        if !entry.has_schema() {
            return Err(TapError::Config(format!(
                "selected stream '{name}' has no resolvable schema"
            )));
        }
        streams.push(resolve_stream(name, entry)?);
    }

    if streams.is_empty() {
        warn!("catalog selects no streams; nothing to extract");
    }
    Ok(streams)
}

fn resolve_stream(name: &str, entry: &CatalogEntry) -> Result<StreamDef> {
    let key_properties = entry
        .key_properties
        .clone()
        .or_else(|| string_array(entry.metadata_value("table-key-properties")))
        .unwrap_or_else(|| vec![DEFAULT_KEY_PROPERTY.to_string()]);

    let declared: Option<ReplicationMethod> = entry
        .metadata_value("replication-method")
        .and_then(|value| serde_json::from_value(value.clone()).ok());
    let replication_key = entry
        .metadata_value("replication-key")
        .and_then(Value::as_str)
        .map(str::to_string);

    let method = match (declared, &replication_key) {
        (Some(ReplicationMethod::Incremental), Some(_)) => ReplicationMethod::Incremental,
        (Some(ReplicationMethod::Incremental), None) => {
            return Err(TapError::Config(format!(
                "stream '{name}' declares INCREMENTAL replication without a replication-key"
            )));
        }
        _ => ReplicationMethod::FullTable,
    };

    Ok(StreamDef {
        name: name.to_string(),
        key_properties,
        replication_key: if method == ReplicationMethod::Incremental {
            replication_key
        } else {
            None
        },
        method,
    })
}

fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    items.iter().map(|item| item.as_str().map(str::to_string)).collect()
}

/// Apply the defaults discovery guarantees before the catalog is emitted.
///
/// Entries lacking `key_properties` get `["id"]`; entries lacking `metadata`
/// get one `{"inclusion": "available"}` entry per top-level schema property.
pub fn annotate_catalog(catalog: &mut Catalog) {
    for entry in catalog.streams.values_mut() {
        if entry.key_properties.is_none() {
            entry.key_properties = Some(vec![DEFAULT_KEY_PROPERTY.to_string()]);
        }
        if entry.metadata.is_none() {
            entry.metadata = Some(default_metadata(&entry.schema));
        }
    }
}

fn default_metadata(schema: &Value) -> Vec<MetadataEntry> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .keys()
        .map(|field| MetadataEntry {
            breadcrumb: vec!["properties".to_string(), field.clone()],
            metadata: BTreeMap::from([(
                "inclusion".to_string(),
                Value::String("available".to_string()),
            )]),
        })
        .collect()
}
