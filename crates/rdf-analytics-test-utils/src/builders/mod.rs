//! Fluent builders for test data.

mod graph;

// Re-export all builders for easy access
pub use graph::*;
