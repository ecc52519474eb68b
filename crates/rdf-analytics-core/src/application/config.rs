//! Configuration for the analytics layer
//!
//! [`AnalyticsConfig`] is process-wide and loaded once by the host.
//! [`WrapperConfig`] is per wrapped stage instance and names the stages that
//! bound the run-global before/after comparison.

use rdf_analytics_monitoring::MonitoringConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::{info, warn};

use crate::domain::enrichment::DEFAULT_MAX_CONCURRENT_QUERIES;
use crate::domain::poi::{Vocabulary, DEFAULT_MARKER_PREDICATE, DEFAULT_NAMESPACE};
use crate::types::StageId;
use crate::CoreError;

/// What happens when the statistics path fails inside `apply`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log and count the failure, return the stage output anyway
    #[default]
    Isolate,
    /// Return the statistics error from `apply`
    Propagate,
}

impl FromStr for FailurePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "isolate" => Ok(FailurePolicy::Isolate),
            "propagate" => Ok(FailurePolicy::Propagate),
            other => Err(CoreError::ConfigurationError(format!(
                "Unknown failure policy: {}",
                other
            ))),
        }
    }
}

/// Process-wide analytics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Reserved namespace of the domain vocabulary
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Local name of the marker predicate within the namespace
    #[serde(default = "default_marker_predicate")]
    pub marker_predicate: String,

    /// Where statistics are written, `memory://` or `file://<dir>`
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Handling of statistics-path failures
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Reachability queries kept in flight per comparison
    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,

    /// Log filter directive handed to the monitoring layer
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_marker_predicate() -> String {
    DEFAULT_MARKER_PREDICATE.to_string()
}

fn default_store_url() -> String {
    "memory://local".to_string()
}

fn default_max_concurrent_queries() -> usize {
    DEFAULT_MAX_CONCURRENT_QUERIES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AnalyticsConfig {
    /// Load configuration from environment variables on top of the defaults
    pub fn load() -> Result<Self, CoreError> {
        let mut config = Self::default();

        if let Ok(namespace) = env::var("RDF_ANALYTICS_NAMESPACE") {
            config.namespace = namespace;
        }

        if let Ok(marker) = env::var("RDF_ANALYTICS_MARKER_PREDICATE") {
            config.marker_predicate = marker;
        }

        if let Ok(store_url) = env::var("RDF_ANALYTICS_STORE_URL") {
            config.store_url = store_url;
        }

        if let Ok(policy) = env::var("RDF_ANALYTICS_FAILURE_POLICY") {
            match policy.parse::<FailurePolicy>() {
                Ok(policy) => config.failure_policy = policy,
                Err(_) => warn!("Invalid RDF_ANALYTICS_FAILURE_POLICY value: {}", policy),
            }
        }

        if let Ok(limit) = env::var("RDF_ANALYTICS_MAX_CONCURRENT_QUERIES") {
            match limit.parse::<usize>() {
                Ok(limit) => config.max_concurrent_queries = limit,
                Err(_) => warn!("Invalid RDF_ANALYTICS_MAX_CONCURRENT_QUERIES value: {}", limit),
            }
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level;
        }

        config.validate()?;
        info!("Loaded analytics configuration");
        Ok(config)
    }

    /// Parse configuration from a YAML document; missing fields take defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CoreError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the analytics layer cannot work with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.namespace.trim().is_empty() {
            return Err(CoreError::ConfigurationError(
                "Namespace must not be empty".to_string(),
            ));
        }
        if self.marker_predicate.trim().is_empty() {
            return Err(CoreError::ConfigurationError(
                "Marker predicate must not be empty".to_string(),
            ));
        }
        if self.max_concurrent_queries == 0 {
            return Err(CoreError::ConfigurationError(
                "max_concurrent_queries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The vocabulary described by this configuration
    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::new(self.namespace.clone(), &self.marker_predicate)
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            marker_predicate: default_marker_predicate(),
            store_url: default_store_url(),
            failure_policy: FailurePolicy::default(),
            max_concurrent_queries: default_max_concurrent_queries(),
            log_level: default_log_level(),
        }
    }
}

impl From<&AnalyticsConfig> for MonitoringConfig {
    fn from(config: &AnalyticsConfig) -> Self {
        MonitoringConfig::default().with_log_filter(config.log_level.trim())
    }
}

/// Per-stage wrapper settings
///
/// When the wrapped stage is the global input, its first output graph is
/// captured for the run. When it is the global output, its first input graph
/// is compared against that capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperConfig {
    /// Stage whose output is the run's "before" snapshot
    #[serde(default, alias = "global-input", alias = "globalInput")]
    pub global_input: Option<StageId>,

    /// Stage whose input is the run's "after" snapshot
    #[serde(default, alias = "global-output", alias = "globalOutput")]
    pub global_output: Option<StageId>,
}

impl WrapperConfig {
    /// Designate both boundary stages
    pub fn new(global_input: Option<StageId>, global_output: Option<StageId>) -> Self {
        Self {
            global_input,
            global_output,
        }
    }

    /// Whether `stage` captures the run's before snapshot
    pub fn is_global_input(&self, stage: &StageId) -> bool {
        self.global_input.as_ref() == Some(stage)
    }

    /// Whether `stage` triggers the run's comparison
    pub fn is_global_output(&self, stage: &StageId) -> bool {
        self.global_output.as_ref() == Some(stage)
    }

    /// Whether any designation is set
    pub fn has_designations(&self) -> bool {
        self.global_input.is_some() || self.global_output.is_some()
    }
}
