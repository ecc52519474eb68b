//! Harness for cross-crate pipeline tests.
//!
//! A [`PipelineHarness`] chains wrapped nodes so that each node's output
//! batch is the next node's input batch, standing in for the host engine.

use std::sync::Arc;

use anyhow::Context;
use futures::future::join_all;
use tracing::debug;

use rdf_analytics_core::application::registry::ANALYTICS_WRAPPER_TYPE;
use rdf_analytics_core::{
    AnalyticsConfig, CoreError, ExecutionNode, ExecutionNodeBase, Graph, RunContext, WrapperConfig,
    WrapperRegistry,
};
use rdf_analytics_inmemory::InMemoryAnalyticsProvider;
use rdf_analytics_monitoring::MonitoringConfig;

/// A linear chain of analytics-wrapped nodes
pub struct PipelineHarness {
    provider: InMemoryAnalyticsProvider,
    monitoring: MonitoringConfig,
    registry: WrapperRegistry,
    wrapper_config: WrapperConfig,
    nodes: Vec<Arc<dyn ExecutionNode>>,
}

impl PipelineHarness {
    /// Build a harness from process configuration and per-stage wrapper settings
    pub fn new(config: &AnalyticsConfig, wrapper_config: WrapperConfig) -> anyhow::Result<Self> {
        let provider = InMemoryAnalyticsProvider::from_config(config)
            .context("Failed to create analytics provider")?;
        let registry = provider.create_registry();
        Ok(Self {
            provider,
            monitoring: MonitoringConfig::from(config),
            registry,
            wrapper_config,
            nodes: Vec::new(),
        })
    }

    /// Append a node, wrapped with analytics
    pub fn stage(mut self, node: Arc<dyn ExecutionNode>) -> anyhow::Result<Self> {
        let wrapped = self
            .registry
            .wrap(ANALYTICS_WRAPPER_TYPE, node, &self.wrapper_config)
            .context("Failed to wrap stage")?;
        self.nodes.push(wrapped);
        Ok(self)
    }

    /// The provider whose store receives the records
    pub fn provider(&self) -> &InMemoryAnalyticsProvider {
        &self.provider
    }

    /// Logging settings derived from the analytics configuration
    pub fn monitoring_config(&self) -> &MonitoringConfig {
        &self.monitoring
    }

    /// Install the global subscriber for a binary driving the harness
    pub fn init_monitoring(&self) -> anyhow::Result<()> {
        rdf_analytics_monitoring::init(&self.monitoring)
    }

    /// The wrapped nodes in order
    pub fn nodes(&self) -> &[Arc<dyn ExecutionNode>] {
        &self.nodes
    }

    /// Run one pipeline execution
    pub async fn run(&self, ctx: &RunContext, input: Vec<Graph>) -> Result<Vec<Graph>, CoreError> {
        let mut batch = input;
        for node in &self.nodes {
            debug!(run_id = %ctx.run_id, stage_id = %node.id(), "Applying stage");
            batch = node.apply(ctx, batch).await?;
        }
        Ok(batch)
    }

    /// Run several executions concurrently on the current task
    pub async fn run_all(
        &self,
        runs: Vec<(RunContext, Vec<Graph>)>,
    ) -> Vec<Result<Vec<Graph>, CoreError>> {
        join_all(runs.iter().map(|(ctx, input)| self.run(ctx, input.clone()))).await
    }
}
