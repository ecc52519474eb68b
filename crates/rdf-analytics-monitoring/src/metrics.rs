//! Metrics emitted by the analytics layer.

use metrics::{describe_counter, describe_histogram, histogram, increment_counter, Unit};
use tracing::trace;

/// Stage records written, labelled by phase
pub const STAGE_RECORDS_TOTAL: &str = "rdf_analytics_stage_records_total";
/// Stage records skipped because the batch held no points of interest
pub const STAGE_RECORDS_SKIPPED_TOTAL: &str = "rdf_analytics_stage_records_skipped_total";
/// Run enrichment reports computed
pub const ENRICHMENT_REPORTS_TOTAL: &str = "rdf_analytics_enrichment_reports_total";
/// Global output reached without a captured global input
pub const MISSING_CAPTURES_TOTAL: &str = "rdf_analytics_missing_captures_total";
/// Statistics-path failures isolated from the stage result, labelled by stage
pub const STATS_FAILURES_TOTAL: &str = "rdf_analytics_stats_failures_total";
/// Distribution of run enrichment percentages
pub const ENRICHMENT_PERCENTAGE: &str = "rdf_analytics_enrichment_percentage";

/// Register descriptions with the installed recorder
pub fn describe_metrics() {
    describe_counter!(STAGE_RECORDS_TOTAL, "Stage statistics records written");
    describe_counter!(
        STAGE_RECORDS_SKIPPED_TOTAL,
        "Stage statistics records skipped for batches without points of interest"
    );
    describe_counter!(ENRICHMENT_REPORTS_TOTAL, "Run enrichment reports computed");
    describe_counter!(
        MISSING_CAPTURES_TOTAL,
        "Global output invocations without a captured global input"
    );
    describe_counter!(STATS_FAILURES_TOTAL, "Isolated statistics failures");
    describe_histogram!(
        ENRICHMENT_PERCENTAGE,
        Unit::Percent,
        "Relative graph growth between global input and global output"
    );
}

/// Analytics specific metrics
pub struct AnalyticsMetrics;

impl AnalyticsMetrics {
    /// Record a written stage record
    pub fn record_stage_record(stage_id: &str, phase: &str) {
        trace!(stage_id, phase, "Stage record written");
        increment_counter!(STAGE_RECORDS_TOTAL, "phase" => phase.to_string());
    }

    /// Record a stage record skipped for lack of points of interest
    pub fn record_skipped_stage_record(stage_id: &str, phase: &str) {
        trace!(stage_id, phase, "Stage record skipped");
        increment_counter!(STAGE_RECORDS_SKIPPED_TOTAL);
    }

    /// Record a computed enrichment report
    pub fn record_enrichment_report(enrichment_percentage: f64, enriched_count: u64) {
        trace!(enrichment_percentage, enriched_count, "Enrichment report computed");
        increment_counter!(ENRICHMENT_REPORTS_TOTAL);
        histogram!(ENRICHMENT_PERCENTAGE, enrichment_percentage);
    }

    /// Record a global output reached without a capture
    pub fn record_missing_capture() {
        increment_counter!(MISSING_CAPTURES_TOTAL);
    }

    /// Record a statistics failure that did not fail the stage
    pub fn record_stats_failure(stage_id: &str) {
        increment_counter!(STATS_FAILURES_TOTAL, "stage" => stage_id.to_string());
    }
}
