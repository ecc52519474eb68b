//! Test data generators.
//!
//! Graphs of points of interest, plain graphs and enrichment helpers.

mod graphs;

pub use graphs::*;
