//! Sync engine
//!
//! The orchestrator drives one stream extractor at a time, in catalog order,
//! merging proposed bookmarks into the state store and flushing a checkpoint
//! after every completed stream. Only the currently-active extractor may
//! propose a bookmark, which keeps checkpoint semantics single-writer.

pub mod extractor;
pub mod ports;
pub mod service;
pub mod state;

pub use extractor::{DrainOutcome, ExtractionPlan, StreamExtractor};
pub use ports::{MessageSink, RecordPages, RecordSource};
pub use service::SyncService;
pub use state::StateStore;
