//! # SaaSOptics Tap Infrastructure
//!
//! Infrastructure implementations of the core sync-engine ports.
//!
//! This crate contains:
//! - The retrying HTTP client
//! - The SaaSOptics API client (`RecordSource` implementation)
//! - Config loading and schema discovery
//! - The line-JSON output sink (`MessageSink` implementation)
//!
//! ## Architecture
//! - Implements traits defined in `saasoptics-core`
//! - Depends on `saasoptics-domain` and `saasoptics-core`
//! - Contains all "impure" code (HTTP, filesystem, process output)

pub mod api;
pub mod config;
pub mod discover;
pub mod http;
pub mod output;

// Re-export commonly used items
pub use api::{SaasOpticsClient, SaasOpticsClientConfig};
pub use discover::discover;
pub use http::HttpClient;
pub use output::JsonLinesSink;
