//! Test implementations (fakes) of the analytics store and graph query.

mod failing;
mod recording_store;

// Re-export all fakes for easy access
pub use failing::*;
pub use recording_store::*;
