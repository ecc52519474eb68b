//! Store fake that records every write verbatim so tests can assert on the
//! exact sequence of records, including their targets.

use std::sync::Mutex;

use async_trait::async_trait;

use rdf_analytics_core::{AnalyticsStore, CoreError, RunId, StageId, StatsRecord};

/// A single recorded write
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    /// Run the record belongs to
    pub run_id: RunId,
    /// Target stage, `None` for the run's global section
    pub stage: Option<StageId>,
    /// The record as written
    pub record: StatsRecord,
}

/// Store fake that keeps every write in order
#[derive(Default)]
pub struct RecordingAnalyticsStore {
    writes: Mutex<Vec<RecordedWrite>>,
}

impl RecordingAnalyticsStore {
    /// Create an empty recording store
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Writes of one run
    pub fn writes_for(&self, run_id: &RunId) -> Vec<RecordedWrite> {
        self.writes()
            .into_iter()
            .filter(|w| &w.run_id == run_id)
            .collect()
    }

    /// Global-section writes of one run
    pub fn global_writes(&self, run_id: &RunId) -> Vec<RecordedWrite> {
        self.writes_for(run_id)
            .into_iter()
            .filter(|w| w.stage.is_none())
            .collect()
    }

    /// Number of writes so far
    pub fn len(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Whether nothing was written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AnalyticsStore for RecordingAnalyticsStore {
    async fn write(
        &self,
        run_id: &RunId,
        stage: Option<&StageId>,
        record: StatsRecord,
    ) -> Result<(), CoreError> {
        let mut writes = self
            .writes
            .lock()
            .map_err(|e| CoreError::StoreError(e.to_string()))?;
        writes.push(RecordedWrite {
            run_id: run_id.clone(),
            stage: stage.cloned(),
            record,
        });
        Ok(())
    }
}
