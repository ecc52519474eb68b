//! Fakes that fail on purpose.

use async_trait::async_trait;

use rdf_analytics_core::{
    AnalyticsStore, CoreError, Graph, GraphQuery, RunId, StageId, StatsRecord, Term,
};

use super::RecordingAnalyticsStore;

/// Store whose writes always fail
#[derive(Debug, Clone, Default)]
pub struct FailingAnalyticsStore {
    message: String,
}

impl FailingAnalyticsStore {
    /// Fail with `message`
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl AnalyticsStore for FailingAnalyticsStore {
    async fn write(&self, _: &RunId, _: Option<&StageId>, _: StatsRecord) -> Result<(), CoreError> {
        Err(CoreError::StoreError(self.message.clone()))
    }
}

/// Store that rejects stage-section writes and records global ones
#[derive(Default)]
pub struct StageRejectingAnalyticsStore {
    accepted: RecordingAnalyticsStore,
}

impl StageRejectingAnalyticsStore {
    /// Create a store with nothing accepted yet
    pub fn new() -> Self {
        Self::default()
    }

    /// The global writes that went through
    pub fn accepted(&self) -> &RecordingAnalyticsStore {
        &self.accepted
    }
}

#[async_trait]
impl AnalyticsStore for StageRejectingAnalyticsStore {
    async fn write(
        &self,
        run_id: &RunId,
        stage: Option<&StageId>,
        record: StatsRecord,
    ) -> Result<(), CoreError> {
        match stage {
            Some(stage) => Err(CoreError::StoreError(format!(
                "Stage section {} is read-only",
                stage
            ))),
            None => self.accepted.write(run_id, None, record).await,
        }
    }
}

/// Query facade whose queries always fail
#[derive(Debug, Clone, Default)]
pub struct FailingGraphQuery;

#[async_trait]
impl GraphQuery for FailingGraphQuery {
    async fn count_reachable(&self, _graph: &Graph, entity: &Term) -> Result<u64, CoreError> {
        Err(CoreError::QueryError(format!("Query failed for {}", entity)))
    }
}
