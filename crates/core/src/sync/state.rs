//! Checkpoint state store

use saasoptics_domain::TapState;

/// In-memory checkpoint owned by the orchestrator for the run's lifetime.
///
/// Merges are whole-value replacements per stream key and idempotent for
/// equal values. A bookmark is only merged after the batch it derives from
/// has been fully emitted downstream.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    state: TapState,
}

impl StateStore {
    /// Wrap the prior checkpoint loaded at run start (possibly empty).
    pub fn new(initial: TapState) -> Self {
        Self { state: initial }
    }

    /// Stored bookmark for a stream, if any.
    pub fn bookmark(&self, stream: &str) -> Option<&str> {
        self.state.bookmark(stream)
    }

    /// Replace the bookmark for one stream key only.
    pub fn merge(&mut self, stream: &str, bookmark: impl Into<String>) {
        self.state.set_bookmark(stream, bookmark);
    }

    /// Immutable copy for flushing to the output boundary.
    pub fn snapshot(&self) -> TapState {
        self.state.clone()
    }

    /// Final merged checkpoint at run end.
    pub fn into_inner(self) -> TapState {
        self.state
    }
}
