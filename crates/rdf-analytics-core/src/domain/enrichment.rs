//! Whole-run enrichment comparison between the global before/after snapshots
//!
//! For every point of interest of the "before" snapshot the comparator asks
//! the query facade how many triples hang off it, directly or through
//! blank-node structures, in both snapshots. The per-POI deltas are then
//! aggregated into one report per run.
//!
//! The enrichment percentage is deliberately a whole-graph size measure and
//! is kept independent from the per-POI deltas.

use futures::stream::{self, StreamExt, TryStreamExt};
use rdf_analytics_monitoring::metrics::AnalyticsMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::poi::PoiExtractor;
use super::repository::GraphQuery;
use crate::types::{Graph, StatsRecord, Term};
use crate::CoreError;

/// Key the enrichment report is stored under in the run's global section
pub const ENRICHMENT_RECORD_KEY: &str = "enrichment";

/// Default number of reachability queries kept in flight
pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 8;

/// Property counts of one point of interest in both snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiDelta {
    /// The point of interest
    pub poi: Term,
    /// Reachable triples before the run
    pub before: u64,
    /// Reachable triples after the run
    pub after: u64,
    /// `after - before`
    pub delta: i64,
}

impl PoiDelta {
    /// Build a delta from the two counts
    pub fn new(poi: Term, before: u64, after: u64) -> Self {
        Self {
            poi,
            before,
            after,
            delta: after as i64 - before as i64,
        }
    }
}

/// Aggregated enrichment metrics of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentReport {
    /// Points of interest in the before snapshot
    pub poi_count: u64,
    /// Points of interest with a positive delta
    pub enriched_count: u64,
    /// Sum of all deltas
    pub total_delta: i64,
    /// `total_delta / poi_count` rounded half up; `0` without points of interest
    pub avg_delta: i64,
    /// Largest positive delta, `0` if nothing was enriched
    pub max_delta: i64,
    /// Relative growth of the whole graph in percent
    pub enrichment_percentage: f64,
    /// Triples in the before snapshot
    pub before_triples: u64,
    /// Triples in the after snapshot
    pub after_triples: u64,
    /// `false` when `avg_delta` had no points of interest to average over
    pub avg_delta_defined: bool,
    /// `false` when the before snapshot was empty and the percentage is a placeholder
    pub percentage_defined: bool,
    /// Per-POI breakdown, not persisted
    #[serde(skip)]
    pub deltas: Vec<PoiDelta>,
}

impl EnrichmentReport {
    /// Aggregate per-POI deltas and the snapshot sizes into a report
    pub fn from_deltas(deltas: Vec<PoiDelta>, before_triples: u64, after_triples: u64) -> Self {
        let poi_count = deltas.len() as u64;
        let total_delta: i64 = deltas.iter().map(|d| d.delta).sum();
        let enriched_count = deltas.iter().filter(|d| d.delta > 0).count() as u64;
        let max_delta = deltas
            .iter()
            .map(|d| d.delta)
            .filter(|d| *d > 0)
            .max()
            .unwrap_or(0);

        let (avg_delta, avg_delta_defined) = if poi_count > 0 {
            (round_half_up(total_delta as f64 / poi_count as f64), true)
        } else {
            (0, false)
        };

        let (enrichment_percentage, percentage_defined) = if before_triples > 0 {
            (100.0 * after_triples as f64 / before_triples as f64 - 100.0, true)
        } else {
            (0.0, false)
        };

        Self {
            poi_count,
            enriched_count,
            total_delta,
            avg_delta,
            max_delta,
            enrichment_percentage,
            before_triples,
            after_triples,
            avg_delta_defined,
            percentage_defined,
            deltas,
        }
    }

    /// The record written to the run's global section
    pub fn to_record(&self) -> Result<StatsRecord, CoreError> {
        Ok(StatsRecord::nested(
            ENRICHMENT_RECORD_KEY,
            serde_json::to_value(self)?,
        ))
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Compares the global before and after snapshots of a run
pub struct EnrichmentComparator {
    extractor: PoiExtractor,
    query: Arc<dyn GraphQuery>,
    max_concurrent_queries: usize,
}

impl EnrichmentComparator {
    /// Create a comparator issuing queries through `query`
    pub fn new(extractor: PoiExtractor, query: Arc<dyn GraphQuery>) -> Self {
        Self {
            extractor,
            query,
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
        }
    }

    /// Limit how many POIs are queried concurrently
    pub fn with_max_concurrent_queries(mut self, limit: usize) -> Self {
        self.max_concurrent_queries = limit.max(1);
        self
    }

    /// Compute the enrichment report. Query failures abort the comparison.
    #[instrument(skip(self, before, after), fields(before = before.len(), after = after.len()))]
    pub async fn compare(&self, before: &Graph, after: &Graph) -> Result<EnrichmentReport, CoreError> {
        let pois = self.extractor.points_of_interest(before);
        debug!(pois = pois.len(), "Comparing enrichment per point of interest");

        let query = &self.query;
        let deltas: Vec<PoiDelta> = stream::iter(pois.into_iter().map(|poi| async move {
            let (count_before, count_after) = futures::try_join!(
                query.count_reachable(before, &poi),
                query.count_reachable(after, &poi)
            )?;
            Ok::<_, CoreError>(PoiDelta::new(poi, count_before, count_after))
        }))
        .buffered(self.max_concurrent_queries)
        .try_collect()
        .await?;

        let report = EnrichmentReport::from_deltas(deltas, before.len() as u64, after.len() as u64);
        AnalyticsMetrics::record_enrichment_report(report.enrichment_percentage, report.enriched_count);
        Ok(report)
    }
}
