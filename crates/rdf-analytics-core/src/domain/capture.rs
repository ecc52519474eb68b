//! Run-scoped capture registry
//!
//! Holds the single "global input" snapshot of each run. One decorator
//! writes it, a later one consumes it. Runs are isolated by key; the map is
//! sharded so unrelated runs do not contend on one lock.

use dashmap::DashMap;
use tracing::debug;

use crate::types::{Graph, RunId};

/// Per-run single-valued snapshot slots
#[derive(Debug, Default)]
pub struct CaptureRegistry {
    slots: DashMap<RunId, Graph>,
}

impl CaptureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            slots: DashMap::with_capacity(16),
        }
    }

    /// Store `graph` as the run's global input, replacing any earlier capture.
    /// Returns the replaced snapshot, if any.
    pub fn capture_input(&self, run_id: &RunId, graph: Graph) -> Option<Graph> {
        debug!(run_id = %run_id, triples = graph.len(), "Capturing global input");
        self.slots.insert(run_id.clone(), graph)
    }

    /// Take the run's global input and clear the slot
    pub fn consume_output(&self, run_id: &RunId) -> Option<Graph> {
        self.slots.remove(run_id).map(|(_, graph)| graph)
    }

    /// Whether the run currently has a captured snapshot
    pub fn is_armed(&self, run_id: &RunId) -> bool {
        self.slots.contains_key(run_id)
    }

    /// Drop a run's slot without reading it, e.g. when a run is aborted
    pub fn discard(&self, run_id: &RunId) -> bool {
        self.slots.remove(run_id).is_some()
    }

    /// Number of runs holding a snapshot
    pub fn pending_runs(&self) -> usize {
        self.slots.len()
    }
}
