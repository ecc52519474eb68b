//!
//! RDF Analytics Core - Enrichment analytics for RDF graph pipelines
//!
//! This crate decorates the stages of a host pipeline so that every
//! invocation records descriptive statistics about points of interest,
//! and a whole run records how much the designated output enriched the
//! designated input. Stage outputs are never altered.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - extraction, statistics, capture and comparison
pub mod domain;

/// Application layer - node shapes, decorator, registry and configuration
pub mod application;

/// Core types
pub mod types;

/// Error types
pub mod error;

// Re-export key types
pub use error::CoreError;
pub use types::{Graph, ParameterMap, Phase, RunContext, RunId, StageId, StatsRecord, Term, Triple};

pub use domain::capture::CaptureRegistry;
pub use domain::enrichment::{EnrichmentComparator, EnrichmentReport, PoiDelta};
pub use domain::poi::{GraphSummary, PoiExtractor, Vocabulary};
pub use domain::repository::{AnalyticsStore, GraphQuery};
pub use domain::stage_stats::StageStatisticsCollector;

pub use application::config::{AnalyticsConfig, FailurePolicy, WrapperConfig};
pub use application::decorator::{AnalyticsDecorator, AnalyticsServices};
pub use application::node::{
    ExecutionNode, ExecutionNodeBase, GraphNode, GraphStage, LinearNode, LinearStage, NodeKind,
    ParameterizedGraphNode, ParameterizedGraphStage, ParameterizedLinearNode,
    ParameterizedLinearStage,
};
pub use application::registry::{AnalyticsWrapper, NodeWrapper, WrapperRegistry};
pub use application::store_factory::create_store_factory;
