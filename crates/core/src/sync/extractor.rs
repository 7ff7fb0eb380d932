//! Per-stream extraction: plan computation and the fetch/drain state machine

use chrono::DateTime;
use serde_json::Value;
use tracing::{debug, warn};

use saasoptics_domain::{Result, StreamDef, SyncMode, TapError};

use super::ports::{MessageSink, RecordSource};
use super::state::StateStore;

/// Concrete query parameters for one stream's extraction.
///
/// Recomputed at the start of each stream, never mutated mid-extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionPlan {
    /// Inclusive lower bound on the replication key, when filtering applies.
    pub modified_since: Option<String>,
}

impl ExtractionPlan {
    /// Derive the plan from the stream definition, the current checkpoint
    /// and the run mode.
    ///
    /// Full-table streams, full-mode runs and first runs (no stored
    /// bookmark) all fetch unfiltered.
    pub fn for_stream(stream: &StreamDef, store: &StateStore, mode: SyncMode) -> Self {
        let modified_since = match mode {
            SyncMode::Full => None,
            SyncMode::Incremental if stream.is_incremental() => {
                store.bookmark(&stream.name).map(str::to_string)
            }
            SyncMode::Incremental => None,
        };
        Self { modified_since }
    }
}

/// Outcome of draining one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Records forwarded downstream.
    pub records: u64,
    /// Records skipped for watermark tracking (missing replication key).
    pub missing_replication_key: u64,
    /// Candidate next bookmark, `None` for full-table streams and empty
    /// fetches.
    pub proposed_bookmark: Option<String>,
}

/// Drives one stream through `PLANNED -> FETCHING -> DRAINED`.
///
/// Instances are single-use: the orchestrator constructs one per stream and
/// discards it after the drain completes.
pub struct StreamExtractor {
    stream: StreamDef,
    plan: ExtractionPlan,
}

impl StreamExtractor {
    pub fn new(stream: StreamDef, plan: ExtractionPlan) -> Self {
        Self { stream, plan }
    }

    /// Fetch pages until exhaustion, forwarding every record as it arrives
    /// and tracking the running maximum of the replication key.
    ///
    /// The running maximum is only a candidate: the caller merges it into
    /// the checkpoint after this method returns, so a failure mid-stream
    /// never advances any bookmark.
    ///
    /// # Errors
    /// Propagates transport errors from the source and write errors from the
    /// sink; either aborts the stream without proposing a bookmark.
    pub async fn drain(
        self,
        source: &dyn RecordSource,
        sink: &mut dyn MessageSink,
    ) -> Result<DrainOutcome> {
        let mut pages = source.fetch(&self.stream.name, &self.plan).await?;

        let mut records: u64 = 0;
        let mut missing_key: u64 = 0;
        let mut watermark: Option<String> = None;

        while let Some(page) = pages.next_page().await? {
            debug!(stream = %self.stream.name, page_size = page.len(), "draining page");
            for record in &page {
                sink.write_record(&self.stream.name, record)?;
                records += 1;

                if let Some(key) = self.stream.replication_key.as_deref() {
                    match replication_value(record, key)? {
                        Some(value) => watermark = Some(max_bookmark(watermark, value)),
                        None => missing_key += 1,
                    }
                }
            }
        }

        if missing_key > 0 {
            warn!(
                stream = %self.stream.name,
                count = missing_key,
                key = self.stream.replication_key.as_deref().unwrap_or_default(),
                "records missing replication key; emitted but excluded from watermark"
            );
        }

        Ok(DrainOutcome {
            records,
            missing_replication_key: missing_key,
            proposed_bookmark: watermark,
        })
    }
}

/// Extract the replication-key value from a record as a bookmark string.
///
/// Strings pass through, numbers are stringified; any other present type is
/// a data error rather than a silently-wrong watermark.
fn replication_value(record: &Value, key: &str) -> Result<Option<String>> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(TapError::Data(format!(
            "replication key '{key}' has non-scalar value: {other}"
        ))),
    }
}

/// Later of two bookmark values.
///
/// Compares as RFC 3339 timestamps when both sides parse, otherwise falls
/// back to lexicographic order, which is correct for same-shape ISO-8601
/// values and still deterministic for opaque cursors. Equal values keep the
/// incumbent, giving the inclusive at-least-once boundary.
fn max_bookmark(current: Option<String>, candidate: String) -> String {
    let Some(current) = current else {
        return candidate;
    };

    let later = match (
        DateTime::parse_from_rfc3339(&current),
        DateTime::parse_from_rfc3339(&candidate),
    ) {
        (Ok(a), Ok(b)) => b > a,
        _ => candidate > current,
    };

    if later {
        candidate
    } else {
        current
    }
}
