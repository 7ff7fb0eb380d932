//! Tap config loader
//!
//! Reads the JSON config file named on the command line and validates the
//! required keys before anything else runs: `token`, `account_name`,
//! `server_subdomain`, `start_date`, `user_agent`. A missing or empty key is
//! a fatal pre-flight error.

use std::path::Path;

use tracing::info;

use saasoptics_domain::{Result, TapConfig, TapError};

/// Load and validate the tap configuration.
///
/// # Errors
/// Returns `TapError::Config` if:
/// - The file cannot be read
/// - The JSON is invalid or missing required keys
/// - A required key is present but empty
pub fn load(path: &Path) -> Result<TapConfig> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        TapError::Config(format!("failed to read config file {}: {err}", path.display()))
    })?;

    let config: TapConfig = serde_json::from_str(&contents)
        .map_err(|err| TapError::Config(format!("invalid config file: {err}")))?;

    validate(&config)?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn validate(config: &TapConfig) -> Result<()> {
    let required = [
        ("token", &config.token),
        ("account_name", &config.account_name),
        ("server_subdomain", &config.server_subdomain),
        ("start_date", &config.start_date),
        ("user_agent", &config.user_agent),
    ];

    let empty: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| *key)
        .collect();

    if empty.is_empty() {
        Ok(())
    } else {
        Err(TapError::Config(format!("empty required config key(s): {}", empty.join(", "))))
    }
}
