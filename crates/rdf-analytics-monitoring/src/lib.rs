//! Monitoring for the RDF analytics layer.
//!
//! Structured logging setup through `tracing-subscriber` and the metric
//! names emitted through the `metrics` facade. No exporter is installed
//! here; hosts install whichever recorder they run with.

use serde::{Deserialize, Serialize};
use tracing::info;

pub mod logging;
pub mod metrics;

/// Configuration for initializing logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Log level filter (e.g., "info,rdf_analytics_core=debug")
    pub log_filter: String,
    /// Emit JSON lines instead of pretty output
    pub enable_json_logging: bool,
    /// Environment (dev, staging, prod)
    pub environment: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "rdf-analytics".to_string(),
            log_filter: "info".to_string(),
            enable_json_logging: false,
            environment: "dev".to_string(),
        }
    }
}

impl MonitoringConfig {
    /// Use `log_filter` as the filter directive
    pub fn with_log_filter(mut self, log_filter: impl Into<String>) -> Self {
        self.log_filter = log_filter.into();
        self
    }

    /// Switch to JSON output
    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.enable_json_logging = enabled;
        self
    }
}

/// Initialize logging and describe the emitted metrics
pub fn init(config: &MonitoringConfig) -> anyhow::Result<()> {
    logging::init_logging(config)?;
    metrics::describe_metrics();
    info!(environment = %config.environment, "Monitoring initialized");
    Ok(())
}


pub use crate::logging::{init_logging, init_test_tracing, LogExt};
pub use crate::metrics::AnalyticsMetrics;
