//! Assertion utilities for validating run documents.

mod run_document;

// Re-export all assertion helpers for easy access
pub use run_document::*;
