//! Explicit registry of node wrappers
//!
//! Hosts register wrappers at startup and look them up by type identifier
//! when building a pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::WrapperConfig;
use super::decorator::{AnalyticsDecorator, AnalyticsServices};
use super::node::ExecutionNode;
use crate::CoreError;

/// Type identifier of the analytics wrapper
pub const ANALYTICS_WRAPPER_TYPE: &str = "rdf-analytics:AnalyticsWrapper";

/// Something that decorates execution nodes
pub trait NodeWrapper: Send + Sync {
    /// Identifier the wrapper is registered under
    fn wrapper_type(&self) -> &str;

    /// Wrap `node` using the per-stage `config`
    fn wrap(&self, node: Arc<dyn ExecutionNode>, config: &WrapperConfig) -> Arc<dyn ExecutionNode>;
}

/// Wrapper producing [`AnalyticsDecorator`]s over shared services
#[derive(Clone)]
pub struct AnalyticsWrapper {
    services: AnalyticsServices,
}

impl AnalyticsWrapper {
    /// Create a wrapper whose decorators share `services`
    pub fn new(services: AnalyticsServices) -> Self {
        Self { services }
    }

    /// The services handed to each decorator
    pub fn services(&self) -> &AnalyticsServices {
        &self.services
    }
}

impl NodeWrapper for AnalyticsWrapper {
    fn wrapper_type(&self) -> &str {
        ANALYTICS_WRAPPER_TYPE
    }

    fn wrap(&self, node: Arc<dyn ExecutionNode>, config: &WrapperConfig) -> Arc<dyn ExecutionNode> {
        debug!(stage_id = %node.id(), "Wrapping node with analytics");
        Arc::new(AnalyticsDecorator::new(node, config.clone(), self.services.clone()))
    }
}

/// Wrappers by type identifier
#[derive(Default, Clone)]
pub struct WrapperRegistry {
    wrappers: HashMap<String, Arc<dyn NodeWrapper>>,
}

impl WrapperRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a wrapper under its type identifier, replacing any previous one
    pub fn register(&mut self, wrapper: Arc<dyn NodeWrapper>) {
        let wrapper_type = wrapper.wrapper_type().to_string();
        if self.wrappers.insert(wrapper_type.clone(), wrapper).is_some() {
            warn!(wrapper_type = %wrapper_type, "Replacing previously registered wrapper");
        }
    }

    /// Look up a wrapper
    pub fn get(&self, wrapper_type: &str) -> Result<Arc<dyn NodeWrapper>, CoreError> {
        self.wrappers.get(wrapper_type).cloned().ok_or_else(|| {
            CoreError::ConfigurationError(format!("Unknown wrapper type: {}", wrapper_type))
        })
    }

    /// Wrap `node` with the wrapper registered as `wrapper_type`
    pub fn wrap(
        &self,
        wrapper_type: &str,
        node: Arc<dyn ExecutionNode>,
        config: &WrapperConfig,
    ) -> Result<Arc<dyn ExecutionNode>, CoreError> {
        Ok(self.get(wrapper_type)?.wrap(node, config))
    }

    /// Registered type identifiers, sorted
    pub fn wrapper_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.wrappers.keys().cloned().collect();
        types.sort();
        types
    }
}
