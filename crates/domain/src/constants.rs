//! Domain constants

/// Default directory holding per-stream JSON schema files.
pub const DEFAULT_SCHEMA_DIR: &str = "schemas";

/// Key property assumed when a catalog entry declares none.
pub const DEFAULT_KEY_PROPERTY: &str = "id";
