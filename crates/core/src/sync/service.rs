//! Sync orchestrator

use std::sync::Arc;

use tracing::{info, instrument};

use saasoptics_domain::{Catalog, Result, SyncMode, TapState};

use crate::catalog::selected_streams;

use super::extractor::{ExtractionPlan, StreamExtractor};
use super::ports::{MessageSink, RecordSource};
use super::state::StateStore;

/// Drives selected streams sequentially, in catalog order, with a
/// checkpoint flush after every completed stream.
///
/// Sequential execution bounds re-work on crash to at most one in-flight
/// stream: a failure aborts the run, but checkpoints already flushed for
/// prior streams stand and the next invocation resumes from them.
pub struct SyncService {
    source: Arc<dyn RecordSource>,
}

impl SyncService {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    /// Run a sync over the selected streams and return the final merged
    /// checkpoint.
    ///
    /// A STATE message is flushed after each stream drains; the flush after
    /// the last stream is the run's final checkpoint. An empty selection
    /// still flushes the (unchanged) checkpoint once so the downstream
    /// pipeline always sees a terminal STATE.
    ///
    /// # Errors
    /// Any stream failure is fatal to the run and surfaces here; nothing is
    /// silently skipped.
    #[instrument(skip_all, fields(mode = ?mode))]
    pub async fn run(
        &self,
        catalog: &Catalog,
        initial_state: TapState,
        mode: SyncMode,
        sink: &mut dyn MessageSink,
    ) -> Result<TapState> {
        let streams = selected_streams(catalog)?;
        info!(streams = streams.len(), "starting sync");

        let mut store = StateStore::new(initial_state);

        for stream in &streams {
            let plan = ExtractionPlan::for_stream(stream, &store, mode);
            info!(
                stream = %stream.name,
                method = ?stream.method,
                modified_since = plan.modified_since.as_deref().unwrap_or("<unfiltered>"),
                "extracting stream"
            );

            let extractor = StreamExtractor::new(stream.clone(), plan);
            let outcome = extractor.drain(self.source.as_ref(), sink).await?;

            if let Some(bookmark) = outcome.proposed_bookmark {
                store.merge(&stream.name, bookmark);
            }
            sink.write_state(&store.snapshot())?;

            info!(stream = %stream.name, records = outcome.records, "stream drained");
        }

        if streams.is_empty() {
            sink.write_state(&store.snapshot())?;
        }

        info!("sync finished");
        Ok(store.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use saasoptics_domain::{TapError, TapMessage};

    use super::super::testing::{RecordingSink, ScriptedSource};
    use super::*;

    fn selected(replication: Option<(&str, &str)>) -> serde_json::Value {
        let mut metadata = json!({"selected": true});
        if let Some((method, key)) = replication {
            metadata["replication-method"] = json!(method);
            metadata["replication-key"] = json!(key);
        }
        json!({
            "schema": {"type": "object", "properties": {"id": {}}},
            "metadata": [{"breadcrumb": [], "metadata": metadata}],
        })
    }

    fn invoices_catalog() -> Catalog {
        serde_json::from_value(json!({
            "streams": {"invoices": selected(Some(("INCREMENTAL", "modified_date")))}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn end_to_end_invoices_scenario() {
        // Two pages, empty initial checkpoint: 3 RECORDs in page order, then
        // a single STATE carrying the final bookmark.
        let source = Arc::new(ScriptedSource::new().with_pages(
            "invoices",
            vec![
                vec![
                    json!({"id": 1, "modified_date": "2020-01-01"}),
                    json!({"id": 2, "modified_date": "2020-01-05"}),
                ],
                vec![json!({"id": 3, "modified_date": "2020-01-10"})],
            ],
        ));
        let mut sink = RecordingSink::new();

        let service = SyncService::new(source);
        let final_state = service
            .run(&invoices_catalog(), TapState::new(), SyncMode::Incremental, &mut sink)
            .await
            .unwrap();

        let ids: Vec<i64> =
            sink.records_for("invoices").iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, [1, 2, 3]);

        let states = sink.states();
        assert_eq!(states.len(), 1);
        assert_eq!(
            serde_json::to_value(states[0]).unwrap(),
            json!({"invoices": "2020-01-10"})
        );

        // Records precede the checkpoint derived from them.
        assert!(matches!(sink.messages.last(), Some(TapMessage::State { .. })));
        assert_eq!(final_state.bookmark("invoices"), Some("2020-01-10"));
    }

    #[tokio::test]
    async fn replay_with_final_state_only_fetches_past_the_bookmark() {
        let source = Arc::new(
            ScriptedSource::new()
                .with_pages("invoices", vec![vec![json!({"id": 3, "modified_date": "2020-01-10"})]]),
        );
        let mut prior = TapState::new();
        prior.set_bookmark("invoices", "2020-01-10");
        let mut sink = RecordingSink::new();

        let service = SyncService::new(source.clone());
        service
            .run(&invoices_catalog(), prior, SyncMode::Incremental, &mut sink)
            .await
            .unwrap();

        let plans = source.plans.lock().unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].1.modified_since.as_deref(), Some("2020-01-10"));
    }

    #[tokio::test]
    async fn full_mode_ignores_every_stored_bookmark() {
        let source = Arc::new(
            ScriptedSource::new()
                .with_pages("contracts", vec![])
                .with_pages("invoices", vec![]),
        );
        let catalog: Catalog = serde_json::from_value(json!({
            "streams": {
                "contracts": selected(Some(("INCREMENTAL", "modified"))),
                "invoices": selected(Some(("INCREMENTAL", "modified"))),
            }
        }))
        .unwrap();

        let mut prior = TapState::new();
        prior.set_bookmark("contracts", "2020-02-01");
        prior.set_bookmark("invoices", "2020-01-10");

        let mut sink = RecordingSink::new();
        let service = SyncService::new(source.clone());
        service.run(&catalog, prior, SyncMode::Full, &mut sink).await.unwrap();

        let plans = source.plans.lock().unwrap();
        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(|(_, plan)| plan.modified_since.is_none()));
    }

    #[tokio::test]
    async fn failed_stream_preserves_prior_checkpoints() {
        // Catalog order: contracts, invoices, payments. Invoices fails.
        let source = Arc::new(
            ScriptedSource::new()
                .with_pages(
                    "contracts",
                    vec![vec![json!({"id": 1, "modified": "2020-02-01"})]],
                )
                .with_pages(
                    "payments",
                    vec![vec![json!({"id": 9, "modified": "2020-03-01"})]],
                )
                .failing_on("invoices"),
        );
        let catalog: Catalog = serde_json::from_value(json!({
            "streams": {
                "contracts": selected(Some(("INCREMENTAL", "modified"))),
                "invoices": selected(Some(("INCREMENTAL", "modified"))),
                "payments": selected(Some(("INCREMENTAL", "modified"))),
            }
        }))
        .unwrap();

        let mut prior = TapState::new();
        prior.set_bookmark("invoices", "2020-01-01");

        let mut sink = RecordingSink::new();
        let service = SyncService::new(source);
        let err = service
            .run(&catalog, prior, SyncMode::Incremental, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, TapError::Network(_)));

        // Contracts completed and flushed; the failed stream kept its
        // pre-run bookmark and payments (after the failure) never ran.
        let states = sink.states();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].bookmark("contracts"), Some("2020-02-01"));
        assert_eq!(states[0].bookmark("invoices"), Some("2020-01-01"));
        assert_eq!(states[0].bookmark("payments"), None);
    }

    #[tokio::test]
    async fn empty_selection_still_flushes_a_terminal_state() {
        let source = Arc::new(ScriptedSource::new());
        let catalog: Catalog = serde_json::from_value(json!({
            "streams": {"contracts": {"schema": {"type": "object"}}}
        }))
        .unwrap();

        let mut prior = TapState::new();
        prior.set_bookmark("contracts", "2020-02-01");

        let mut sink = RecordingSink::new();
        let service = SyncService::new(source);
        let final_state =
            service.run(&catalog, prior.clone(), SyncMode::Incremental, &mut sink).await.unwrap();

        assert_eq!(sink.states().len(), 1);
        assert_eq!(final_state, prior);
    }

    #[tokio::test]
    async fn full_table_stream_completes_without_a_bookmark() {
        let source = Arc::new(
            ScriptedSource::new().with_pages("registers", vec![vec![json!({"id": 1})]]),
        );
        let catalog: Catalog = serde_json::from_value(json!({
            "streams": {"registers": selected(None)}
        }))
        .unwrap();

        let mut sink = RecordingSink::new();
        let service = SyncService::new(source);
        let final_state = service
            .run(&catalog, TapState::new(), SyncMode::Incremental, &mut sink)
            .await
            .unwrap();

        assert_eq!(sink.records_for("registers").len(), 1);
        assert!(final_state.is_empty());
    }
}
