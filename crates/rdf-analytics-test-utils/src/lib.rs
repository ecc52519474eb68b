//! Testing utilities for the RDF analytics layer.
//!
//! Mocks and fakes of the collaborator interfaces, a graph builder, data
//! generators, scripted pipeline stages and assertions over run documents.

pub mod assertions;
pub mod builders;
pub mod data_generators;
pub mod implementations;
pub mod mocks;

/// Re-export commonly used types for convenience
pub use mockall;

pub use builders::GraphBuilder;
pub use implementations::{
    FailingAnalyticsStore, FailingGraphQuery, RecordedWrite, RecordingAnalyticsStore,
    StageRejectingAnalyticsStore,
};
pub use mocks::{
    create_mock_graph_query, AddPropertyStage, FailingStage, FnLinearStage, MergeStage,
    MockGraphQuery, SplitStage,
};
