/// Collaborator traits: graph query facade and analytics store
pub mod repository;

/// Point-of-interest extraction and graph summaries
pub mod poi;

/// Stage statistics collection
pub mod stage_stats;

/// Run-scoped capture registry
pub mod capture;

/// Enrichment comparison
pub mod enrichment;
