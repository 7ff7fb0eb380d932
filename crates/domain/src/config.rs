//! Tap configuration structures
//!
//! The config file is a JSON document whose path is given on the command
//! line. Required keys are validated by the infra loader; this crate only
//! defines the typed shape.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SCHEMA_DIR;
use crate::types::SyncMode;

/// Tap configuration as read from the `--config` file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TapConfig {
    /// SaaSOptics API token.
    pub token: String,
    /// Account name, first label of the API host.
    pub account_name: String,
    /// Server subdomain, second label of the API host.
    pub server_subdomain: String,
    /// RFC 3339 date required by the config contract. Extraction does not
    /// filter on it; a stream with no stored bookmark is fetched unfiltered.
    pub start_date: String,
    /// User agent sent on every API request.
    pub user_agent: String,
    /// Force a full re-fetch of every stream, ignoring stored bookmarks.
    /// Unset means incremental.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_sync: Option<bool>,
    /// Directory of per-stream schema files used by discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<String>,
}

impl TapConfig {
    /// Process-wide sync mode resolved from `full_sync`.
    pub fn sync_mode(&self) -> SyncMode {
        if self.full_sync.unwrap_or(false) {
            SyncMode::Full
        } else {
            SyncMode::Incremental
        }
    }

    /// Schema directory, defaulting to [`DEFAULT_SCHEMA_DIR`].
    pub fn schema_dir_or_default(&self) -> &str {
        self.schema_dir.as_deref().unwrap_or(DEFAULT_SCHEMA_DIR)
    }
}
