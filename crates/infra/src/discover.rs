//! Schema discovery
//!
//! Builds the selectable catalog from a directory of per-stream JSON schema
//! files (`<schema_dir>/<stream>.json`) and applies the core annotation
//! defaults before the catalog is emitted.

use std::path::Path;

use tracing::{debug, info};

use saasoptics_core::annotate_catalog;
use saasoptics_domain::{Catalog, CatalogEntry, Result, TapError};

/// Build the annotated catalog from a schema directory.
///
/// Stream names come from file stems; non-`.json` entries are ignored.
///
/// # Errors
/// Returns `TapError::Config` when the directory cannot be read or a schema
/// file is not valid JSON.
pub fn discover(schema_dir: &Path) -> Result<Catalog> {
    let entries = std::fs::read_dir(schema_dir).map_err(|err| {
        TapError::Config(format!(
            "failed to read schema directory {}: {err}",
            schema_dir.display()
        ))
    })?;

    // read_dir order varies by platform; sort so the emitted catalog is
    // stable across runs.
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            TapError::Config(format!("failed to list schema directory: {err}"))
        })?;
        paths.push(entry.path());
    }
    paths.sort();

    let mut catalog = Catalog::default();
    for path in paths {
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stream) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        let contents = std::fs::read_to_string(&path).map_err(|err| {
            TapError::Config(format!("failed to read schema {}: {err}", path.display()))
        })?;
        let schema = serde_json::from_str(&contents).map_err(|err| {
            TapError::Config(format!("invalid schema {}: {err}", path.display()))
        })?;

        debug!(stream, path = %path.display(), "loaded stream schema");
        catalog.streams.insert(
            stream.to_string(),
            CatalogEntry { schema, key_properties: None, metadata: None },
        );
    }

    annotate_catalog(&mut catalog);
    info!(streams = catalog.streams.len(), "discovery finished");
    Ok(catalog)
}

/// Serialize the catalog as pretty JSON to the given writer.
///
/// # Errors
/// Returns `TapError::Internal` on serialization or write failure.
pub fn write_catalog<W: std::io::Write>(catalog: &Catalog, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, catalog)
        .map_err(|err| TapError::Internal(format!("failed to serialize catalog: {err}")))?;
    out.write_all(b"\n")
        .map_err(|err| TapError::Internal(format!("failed to write catalog: {err}")))
}
