//! Collaborator traits for the analytics layer
//!
//! The analytics layer never owns a triple store or a statistics sink. It
//! talks to both through these traits, so hosts can plug in a SPARQL
//! endpoint, an embedded store, or the in-memory implementations.

use async_trait::async_trait;

use crate::types::{Graph, RunId, StageId, StatsRecord, Term};
use crate::CoreError;

/// Query capability over graph snapshots
#[async_trait]
pub trait GraphQuery: Send + Sync {
    /// Count the triples reachable from `entity`, following any predicate in
    /// either direction for zero or more hops.
    ///
    /// The count is the number of triples whose subject lies in the
    /// connected component of `entity`. The same entity may be queried
    /// against different snapshots.
    async fn count_reachable(&self, graph: &Graph, entity: &Term) -> Result<u64, CoreError>;
}

/// Write-only sink for statistics records, keyed by run and stage
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Write a record for a run. `stage` is `None` for run-global records.
    async fn write(
        &self,
        run_id: &RunId,
        stage: Option<&StageId>,
        record: StatsRecord,
    ) -> Result<(), CoreError>;
}
