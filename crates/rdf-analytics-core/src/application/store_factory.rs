use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::repository::AnalyticsStore;
use crate::CoreError;

/// Create a function that resolves a store URL to an analytics store.
///
/// `memory://...` is served by `memory_factory`, `file://<dir>` by
/// `file_factory` with the directory part of the URL. Any other scheme is a
/// configuration error.
pub fn create_store_factory<FM, M, FF, F>(
    memory_factory: FM,
    file_factory: FF,
) -> impl Fn(&str) -> Result<Arc<dyn AnalyticsStore>, CoreError> + Send + Sync
where
    FM: Fn() -> M + Send + Sync + 'static,
    M: AnalyticsStore + 'static,
    FF: Fn(PathBuf) -> Result<F, CoreError> + Send + Sync + 'static,
    F: AnalyticsStore + 'static,
{
    move |url: &str| -> Result<Arc<dyn AnalyticsStore>, CoreError> {
        if url.starts_with("memory://") {
            info!("Creating in-memory analytics store");
            Ok(Arc::new(memory_factory()))
        } else if let Some(dir) = url.strip_prefix("file://") {
            if dir.is_empty() {
                return Err(CoreError::ConfigurationError(
                    "file:// store URL needs a directory".to_string(),
                ));
            }
            info!(dir, "Creating file-backed analytics store");
            Ok(Arc::new(file_factory(PathBuf::from(dir))?))
        } else {
            error!("Unsupported analytics store URL: {}", url);
            Err(CoreError::ConfigurationError(format!(
                "Unsupported analytics store URL: {}",
                url
            )))
        }
    }
}
