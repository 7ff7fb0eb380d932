//! # SaaSOptics Tap Core
//!
//! Pure sync-engine logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Catalog selection and discovery annotation
//! - Port/adapter interfaces (traits) for the API client and output boundary
//! - The per-stream extractor and the sync orchestrator
//! - The checkpoint state store
//!
//! ## Architecture Principles
//! - Only depends on `saasoptics-domain`
//! - No HTTP, filesystem, or process code
//! - All external collaborators reached via traits
//! - Pure, testable extraction logic

pub mod catalog;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use catalog::{annotate_catalog, selected_streams};
pub use sync::extractor::{DrainOutcome, ExtractionPlan, StreamExtractor};
pub use sync::ports::{MessageSink, RecordPages, RecordSource};
pub use sync::state::StateStore;
pub use sync::SyncService;
