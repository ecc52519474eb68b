//! Per-invocation statistics for a batch of graphs at a wrap boundary

use rdf_analytics_monitoring::metrics::AnalyticsMetrics;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::poi::PoiExtractor;
use super::repository::AnalyticsStore;
use crate::types::{Graph, Phase, RunContext, StageId, StatsRecord};
use crate::CoreError;

/// Computes descriptive statistics for a batch and writes them per stage
pub struct StageStatisticsCollector {
    extractor: PoiExtractor,
    store: Arc<dyn AnalyticsStore>,
}

impl StageStatisticsCollector {
    /// Create a collector writing to `store`
    pub fn new(extractor: PoiExtractor, store: Arc<dyn AnalyticsStore>) -> Self {
        Self { extractor, store }
    }

    /// Build the record for a batch without writing it.
    ///
    /// Returns `None` for an empty batch or when no graph of the batch holds a
    /// point of interest; such stages are irrelevant to POI enrichment.
    pub fn build_record(&self, graphs: &[Graph], phase: &Phase) -> Option<StatsRecord> {
        if graphs.is_empty() {
            return None;
        }

        let summaries = self.extractor.summarize_batch(graphs);
        if summaries.iter().all(|s| s.poi_count == 0) {
            return None;
        }

        let body = json!({
            "graphs": summaries.len(),
            "poi_count": summaries.iter().map(|s| s.poi_count).collect::<Vec<_>>(),
            "triple_count": summaries.iter().map(|s| s.triple_count).collect::<Vec<_>>(),
            "triples_per_poi": summaries.iter().map(|s| s.triples_per_poi).collect::<Vec<_>>(),
            "namespace_triples": summaries.iter().map(|s| s.namespace_triples).collect::<Vec<_>>(),
        });

        Some(StatsRecord::nested(phase.label(), body))
    }

    /// Compute and write the record for one side of a stage invocation.
    /// Returns the written record, or `None` when emission was skipped.
    #[instrument(skip(self, ctx, graphs), fields(run_id = %ctx.run_id, stage_id = %stage_id, phase = %phase))]
    pub async fn collect(
        &self,
        ctx: &RunContext,
        graphs: &[Graph],
        phase: Phase,
        stage_id: &StageId,
    ) -> Result<Option<StatsRecord>, CoreError> {
        let Some(record) = self.build_record(graphs, &phase) else {
            debug!(graphs = graphs.len(), "No points of interest in batch, skipping stage record");
            AnalyticsMetrics::record_skipped_stage_record(stage_id.as_str(), phase.label());
            return Ok(None);
        };

        self.store
            .write(&ctx.run_id, Some(stage_id), record.clone())
            .await?;
        AnalyticsMetrics::record_stage_record(stage_id.as_str(), phase.label());

        Ok(Some(record))
    }
}
