//! Line-JSON message sink
//!
//! Serializes RECORD and STATE messages one JSON object per line. Stdout is
//! the data channel; everything diagnostic goes through tracing to stderr.

use std::collections::BTreeMap;
use std::io::Write;

use serde_json::Value;
use tracing::info;

use saasoptics_core::MessageSink;
use saasoptics_domain::{Result, TapError, TapMessage, TapState};

/// `MessageSink` over any writer, typically stdout.
///
/// STATE messages flush the writer so a checkpoint survives process
/// termination immediately after it was emitted.
pub struct JsonLinesSink<W: Write + Send> {
    out: W,
    records_written: BTreeMap<String, u64>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, records_written: BTreeMap::new() }
    }

    /// Records written so far, per stream.
    pub fn record_counts(&self) -> &BTreeMap<String, u64> {
        &self.records_written
    }

    fn write_message(&mut self, message: &TapMessage) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)
            .map_err(|err| TapError::Internal(format!("failed to serialize message: {err}")))?;
        self.out
            .write_all(b"\n")
            .map_err(|err| TapError::Internal(format!("failed to write message: {err}")))
    }
}

impl<W: Write + Send> MessageSink for JsonLinesSink<W> {
    fn write_record(&mut self, stream: &str, record: &Value) -> Result<()> {
        self.write_message(&TapMessage::Record {
            stream: stream.to_string(),
            record: record.clone(),
        })?;
        *self.records_written.entry(stream.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn write_state(&mut self, state: &TapState) -> Result<()> {
        self.write_message(&TapMessage::State { value: state.clone() })?;
        self.out
            .flush()
            .map_err(|err| TapError::Internal(format!("failed to flush checkpoint: {err}")))?;

        info!(counts = ?self.records_written, "checkpoint flushed");
        Ok(())
    }
}
