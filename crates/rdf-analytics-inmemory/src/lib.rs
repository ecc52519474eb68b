//! In-memory implementations for the RDF analytics layer
//!
//! This crate provides the analytics store (in memory, optionally mirrored
//! to JSON files) and the graph query facade over in-memory graphs, plus a
//! provider that wires them into a ready-to-use wrapper registry.

use std::sync::Arc;
use tracing::info;

pub mod query;
pub use query::InMemoryGraphQuery;

pub mod store;
pub use store::{InMemoryAnalyticsStore, JsonFileAnalyticsStore};

use rdf_analytics_core::{
    create_store_factory, AnalyticsConfig, AnalyticsServices, AnalyticsStore, AnalyticsWrapper,
    CaptureRegistry, CoreError, GraphQuery, WrapperRegistry,
};

/// Provider for the in-memory analytics stack
pub struct InMemoryAnalyticsProvider {
    // Documents written by every store this provider hands out
    memory: InMemoryAnalyticsStore,
    store: Arc<dyn AnalyticsStore>,
    query: Arc<dyn GraphQuery>,
    services: AnalyticsServices,
}

impl InMemoryAnalyticsProvider {
    /// Create a provider with the default configuration
    pub fn new() -> Self {
        let config = AnalyticsConfig::default();
        let memory = InMemoryAnalyticsStore::new();
        let store: Arc<dyn AnalyticsStore> = Arc::new(memory.clone());
        let query: Arc<dyn GraphQuery> = Arc::new(InMemoryGraphQuery::new());
        let services = AnalyticsServices::new(store.clone(), query.clone(), &config);
        Self {
            memory,
            store,
            query,
            services,
        }
    }

    /// Create a provider from configuration, resolving `store_url`
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let memory = InMemoryAnalyticsStore::new();
        let for_memory = memory.clone();
        let for_file = memory.clone();
        let factory = create_store_factory(
            move || for_memory.clone(),
            move |dir| JsonFileAnalyticsStore::with_store(dir, for_file.clone()),
        );
        let store = factory(&config.store_url)?;
        let query: Arc<dyn GraphQuery> = Arc::new(InMemoryGraphQuery::new());
        let services = AnalyticsServices::new(store.clone(), query.clone(), config);

        info!(store_url = %config.store_url, "Created in-memory analytics provider");
        Ok(Self {
            memory,
            store,
            query,
            services,
        })
    }

    /// The documents written through this provider
    pub fn memory_store(&self) -> &InMemoryAnalyticsStore {
        &self.memory
    }

    /// The configured analytics store
    pub fn store(&self) -> Arc<dyn AnalyticsStore> {
        self.store.clone()
    }

    /// The graph query facade
    pub fn query(&self) -> Arc<dyn GraphQuery> {
        self.query.clone()
    }

    /// The capture registry shared by all wrapped nodes
    pub fn capture_registry(&self) -> Arc<CaptureRegistry> {
        self.services.capture_registry().clone()
    }

    /// Services for building decorators directly
    pub fn services(&self) -> AnalyticsServices {
        self.services.clone()
    }

    /// A wrapper registry with the analytics wrapper registered
    pub fn create_registry(&self) -> WrapperRegistry {
        let mut registry = WrapperRegistry::new();
        registry.register(Arc::new(AnalyticsWrapper::new(self.services.clone())));
        registry
    }
}

impl Default for InMemoryAnalyticsProvider {
    fn default() -> Self {
        Self::new()
    }
}
