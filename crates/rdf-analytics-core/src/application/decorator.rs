//! Analytics decorator
//!
//! [`AnalyticsDecorator`] wraps any [`ExecutionNode`] and is itself one with
//! the same identity, shape and parameters. Around each call it records stage
//! statistics and, for linear nodes designated as run boundaries, drives the
//! global before/after capture and comparison. The wrapped node's output is
//! returned untouched.

use async_trait::async_trait;
use rdf_analytics_monitoring::metrics::AnalyticsMetrics;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::config::{AnalyticsConfig, FailurePolicy, WrapperConfig};
use super::node::{ExecutionNode, ExecutionNodeBase, NodeKind};
use crate::domain::capture::CaptureRegistry;
use crate::domain::enrichment::EnrichmentComparator;
use crate::domain::poi::PoiExtractor;
use crate::domain::repository::{AnalyticsStore, GraphQuery};
use crate::domain::stage_stats::StageStatisticsCollector;
use crate::types::{Graph, ParameterMap, Phase, RunContext, StageId};
use crate::CoreError;

/// Shared collaborators handed to every decorator of a process
#[derive(Clone)]
pub struct AnalyticsServices {
    store: Arc<dyn AnalyticsStore>,
    capture: Arc<CaptureRegistry>,
    collector: Arc<StageStatisticsCollector>,
    comparator: Arc<EnrichmentComparator>,
    failure_policy: FailurePolicy,
}

impl AnalyticsServices {
    /// Assemble the services from the store, the query facade and the configuration
    pub fn new(
        store: Arc<dyn AnalyticsStore>,
        query: Arc<dyn GraphQuery>,
        config: &AnalyticsConfig,
    ) -> Self {
        let extractor = PoiExtractor::new(config.vocabulary());
        Self {
            collector: Arc::new(StageStatisticsCollector::new(extractor.clone(), store.clone())),
            comparator: Arc::new(
                EnrichmentComparator::new(extractor, query)
                    .with_max_concurrent_queries(config.max_concurrent_queries),
            ),
            store,
            capture: Arc::new(CaptureRegistry::new()),
            failure_policy: config.failure_policy,
        }
    }

    /// Use an existing capture registry instead of a fresh one
    pub fn with_capture_registry(mut self, capture: Arc<CaptureRegistry>) -> Self {
        self.capture = capture;
        self
    }

    /// The capture registry shared by all decorators built from these services
    pub fn capture_registry(&self) -> &Arc<CaptureRegistry> {
        &self.capture
    }

    /// The analytics store in use
    pub fn store(&self) -> &Arc<dyn AnalyticsStore> {
        &self.store
    }

    /// The configured failure policy
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }
}

/// Transparent statistics decorator around an execution node
pub struct AnalyticsDecorator {
    inner: Arc<dyn ExecutionNode>,
    config: WrapperConfig,
    services: AnalyticsServices,
}

impl AnalyticsDecorator {
    /// Wrap `inner`. Global designations only apply to linear nodes.
    pub fn new(inner: Arc<dyn ExecutionNode>, config: WrapperConfig, services: AnalyticsServices) -> Self {
        if inner.kind() == NodeKind::Graph && config.has_designations() {
            warn!(
                stage_id = %inner.id(),
                "Global input/output designations are ignored for graph nodes"
            );
        }
        Self {
            inner,
            config,
            services,
        }
    }

    /// The wrapped node
    pub fn inner(&self) -> &Arc<dyn ExecutionNode> {
        &self.inner
    }

    /// The per-stage wrapper settings
    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    /// Record statistics for one call. Every step runs regardless of the
    /// others; the errors are returned in the order they occurred.
    async fn record(&self, ctx: &RunContext, inputs: &[Graph], outputs: &[Graph]) -> Vec<CoreError> {
        let id = self.id();
        let tracks_global = self.kind() == NodeKind::Linear;

        // Slot transitions are in-memory and happen before any store I/O. A
        // stage designated as both consumes the earlier capture first, then
        // re-arms the slot with its own output.
        let before = if tracks_global && self.config.is_global_output(id) {
            Some(self.services.capture.consume_output(&ctx.run_id))
        } else {
            None
        };
        if tracks_global && self.config.is_global_input(id) {
            if let Some(first) = outputs.first() {
                self.services.capture.capture_input(&ctx.run_id, first.clone());
            }
        }

        let mut errors = Vec::new();
        let collector = &self.services.collector;
        for (batch, phase) in [(inputs, Phase::Input), (outputs, Phase::Output)] {
            if let Err(e) = collector.collect(ctx, batch, phase, id).await {
                errors.push(e);
            }
        }

        if let Some(before) = before {
            if let Err(e) = self.compare_run(ctx, before, inputs.first()).await {
                errors.push(e);
            }
        }

        errors
    }

    async fn compare_run(
        &self,
        ctx: &RunContext,
        before: Option<Graph>,
        after: Option<&Graph>,
    ) -> Result<(), CoreError> {
        match (before, after) {
            (Some(before), Some(after)) => {
                let report = self.services.comparator.compare(&before, after).await?;
                self.services
                    .store
                    .write(&ctx.run_id, None, report.to_record()?)
                    .await?;
                info!(
                    run_id = %ctx.run_id,
                    pois = report.poi_count,
                    enriched = report.enriched_count,
                    percentage = report.enrichment_percentage,
                    "Recorded run enrichment"
                );
            }
            (None, _) => {
                debug!(run_id = %ctx.run_id, "No global input captured, skipping comparison");
                AnalyticsMetrics::record_missing_capture();
            }
            (Some(_), None) => {
                debug!(run_id = %ctx.run_id, "Global output stage received no graph, skipping comparison");
            }
        }
        Ok(())
    }
}

impl ExecutionNodeBase for AnalyticsDecorator {
    fn id(&self) -> &StageId {
        self.inner.id()
    }

    fn kind(&self) -> NodeKind {
        self.inner.kind()
    }

    fn in_degree(&self) -> usize {
        self.inner.in_degree()
    }

    fn out_degree(&self) -> usize {
        self.inner.out_degree()
    }

    fn parameters(&self) -> Option<&ParameterMap> {
        self.inner.parameters()
    }
}

#[async_trait]
impl ExecutionNode for AnalyticsDecorator {
    #[instrument(skip(self, ctx, inputs), fields(run_id = %ctx.run_id, stage_id = %self.id()))]
    async fn apply(&self, ctx: &RunContext, inputs: Vec<Graph>) -> Result<Vec<Graph>, CoreError> {
        let input_snapshot = inputs.clone();
        let outputs = self.inner.apply(ctx, inputs).await?;

        let errors = self.record(ctx, &input_snapshot, &outputs).await;
        for e in &errors {
            warn!(
                run_id = %ctx.run_id,
                stage_id = %self.id(),
                error = %e,
                policy = ?self.services.failure_policy,
                "Statistics collection failed"
            );
            AnalyticsMetrics::record_stats_failure(self.id().as_str());
        }

        match (self.services.failure_policy, errors.into_iter().next()) {
            (FailurePolicy::Propagate, Some(e)) => Err(e),
            _ => Ok(outputs),
        }
    }
}
