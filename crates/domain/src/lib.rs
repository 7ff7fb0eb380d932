//! # SaaSOptics Tap Domain
//!
//! Business domain types for the SaaSOptics extraction tap.
//!
//! This crate contains:
//! - Catalog, stream, state and message types
//! - Domain error types and Result definitions
//! - Tap configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other tap crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
