//! Port interfaces for the sync engine

use async_trait::async_trait;
use serde_json::Value;

use saasoptics_domain::{Result, TapState};

use super::extractor::ExtractionPlan;

/// Lazy page sequence returned by a fetch.
///
/// Restartable per call but single-pass: a transport error invalidates the
/// whole in-flight stream, it is not resumable mid-page.
#[async_trait]
pub trait RecordPages: Send {
    /// Next finite ordered page of records, or `None` when exhausted.
    ///
    /// Errors only after the client's internal retry budget is exhausted.
    async fn next_page(&mut self) -> Result<Option<Vec<Value>>>;
}

/// API client boundary: fetch records for a stream under an extraction plan.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Begin a paginated fetch for `stream` with the plan's query filter.
    async fn fetch(&self, stream: &str, plan: &ExtractionPlan) -> Result<Box<dyn RecordPages>>;
}

/// Output boundary consuming RECORD and STATE messages as they occur.
pub trait MessageSink: Send {
    /// Forward one record downstream.
    fn write_record(&mut self, stream: &str, record: &Value) -> Result<()>;

    /// Flush a full checkpoint snapshot downstream.
    fn write_state(&mut self, state: &TapState) -> Result<()>;
}
