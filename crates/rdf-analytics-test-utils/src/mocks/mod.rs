//! Mock implementations of the analytics collaborator interfaces.
//!
//! A `mockall` mock of the graph query facade and scripted pipeline stages
//! for driving wrapped nodes in tests.

pub mod graph_query;
pub mod stage_behaviors;

// Re-export all mocks and their creator functions for easy access
pub use graph_query::*;
pub use stage_behaviors::*;
