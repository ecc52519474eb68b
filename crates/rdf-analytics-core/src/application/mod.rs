/// Execution node shapes and their adapters
pub mod node;

/// Process and per-stage configuration
pub mod config;

/// Statistics decorator over execution nodes
pub mod decorator;

/// Node wrapper registry
pub mod registry;

/// Store URL factory
pub mod store_factory;
