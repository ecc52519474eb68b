//! In-memory and JSON file implementations of the AnalyticsStore interface
//!
//! Every run owns one document of the form
//! `{ "global": {...}, "stages": { "<stage>": {...} } }`. A write merges the
//! top-level keys of its record into the targeted section, so a stage's
//! `input` and `output` records end up side by side.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Map, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use rdf_analytics_core::{AnalyticsStore, CoreError, RunId, StageId, StatsRecord};

const GLOBAL_SECTION: &str = "global";
const STAGES_SECTION: &str = "stages";

/// In-memory implementation of AnalyticsStore
///
/// Clones share the same documents.
#[derive(Clone, Default)]
pub struct InMemoryAnalyticsStore {
    /// Map of run -> run document
    runs: Arc<RwLock<HashMap<RunId, Value>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryAnalyticsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Full document of a run
    pub async fn run_document(&self, run_id: &RunId) -> Option<Value> {
        self.runs.read().await.get(run_id).cloned()
    }

    /// Merged records of one stage within a run
    pub async fn stage_record(&self, run_id: &RunId, stage: &StageId) -> Option<Value> {
        self.runs
            .read()
            .await
            .get(run_id)
            .and_then(|doc| doc.get(STAGES_SECTION))
            .and_then(|stages| stages.get(stage.as_str()))
            .cloned()
    }

    /// Global section of a run, if anything was written to it
    pub async fn global_record(&self, run_id: &RunId) -> Option<Value> {
        self.runs
            .read()
            .await
            .get(run_id)
            .and_then(|doc| doc.get(GLOBAL_SECTION))
            .filter(|global| global.as_object().map_or(false, |m| !m.is_empty()))
            .cloned()
    }

    /// Runs with at least one record, sorted
    pub async fn runs(&self) -> Vec<RunId> {
        let mut runs: Vec<RunId> = self.runs.read().await.keys().cloned().collect();
        runs.sort();
        runs
    }

    /// Number of successful writes since creation
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn merge(&self, run_id: &RunId, stage: Option<&StageId>, record: StatsRecord) -> Result<(), CoreError> {
        let fields = match record.into_value() {
            Value::Object(fields) => fields,
            other => {
                return Err(CoreError::SerializationError(format!(
                    "Statistics record must be a JSON object, got {}",
                    other
                )))
            }
        };

        let mut runs = self.runs.write().await;
        let doc = runs
            .entry(run_id.clone())
            .or_insert_with(|| json!({ GLOBAL_SECTION: {}, STAGES_SECTION: {} }));

        let section = match stage {
            Some(stage) => doc
                .get_mut(STAGES_SECTION)
                .and_then(Value::as_object_mut)
                .map(|stages| {
                    stages
                        .entry(stage.as_str().to_string())
                        .or_insert_with(|| Value::Object(Map::new()))
                }),
            None => doc.get_mut(GLOBAL_SECTION),
        }
        .and_then(Value::as_object_mut)
        .ok_or_else(|| CoreError::StoreError(format!("Corrupt document for run {}", run_id)))?;

        for (key, value) in fields {
            section.insert(key, value);
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(run_id = %run_id, stage = ?stage, "Merged statistics record");
        Ok(())
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn write(
        &self,
        run_id: &RunId,
        stage: Option<&StageId>,
        record: StatsRecord,
    ) -> Result<(), CoreError> {
        self.merge(run_id, stage, record).await
    }
}

/// Analytics store that mirrors every run document to `<dir>/<run>.json`
#[derive(Clone)]
pub struct JsonFileAnalyticsStore {
    dir: PathBuf,
    memory: InMemoryAnalyticsStore,
    /// Per-run locks; rewrites of one run are serialized so the last
    /// rewrite carries the latest document
    file_locks: Arc<DashMap<RunId, Arc<Mutex<()>>>>,
}

impl JsonFileAnalyticsStore {
    /// Create a store writing into `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::with_store(dir, InMemoryAnalyticsStore::new())
    }

    /// Create a store that mirrors the documents of an existing in-memory store
    pub fn with_store(dir: impl Into<PathBuf>, memory: InMemoryAnalyticsStore) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "Analytics documents will be written to disk");
        Ok(Self {
            dir,
            memory,
            file_locks: Arc::new(DashMap::new()),
        })
    }

    /// Directory the documents are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a run's document
    ///
    /// ASCII letters, digits and `-` are kept; every other byte becomes `_`
    /// followed by two hex digits, so distinct runs never share a file.
    pub fn path_for(&self, run_id: &RunId) -> PathBuf {
        let mut file_name = String::with_capacity(run_id.as_str().len());
        for byte in run_id.as_str().bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                file_name.push(char::from(byte));
            } else {
                file_name.push_str(&format!("_{:02X}", byte));
            }
        }
        self.dir.join(format!("{}.json", file_name))
    }

    fn lock_for(&self, run_id: &RunId) -> Arc<Mutex<()>> {
        self.file_locks
            .entry(run_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// The in-memory documents behind the files
    pub fn memory(&self) -> &InMemoryAnalyticsStore {
        &self.memory
    }

    /// Read a run's document back from disk
    pub async fn load_run(&self, run_id: &RunId) -> Result<Option<Value>, CoreError> {
        let path = self.path_for(run_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl AnalyticsStore for JsonFileAnalyticsStore {
    async fn write(
        &self,
        run_id: &RunId,
        stage: Option<&StageId>,
        record: StatsRecord,
    ) -> Result<(), CoreError> {
        let lock = self.lock_for(run_id);
        let _guard = lock.lock().await;
        self.memory.write(run_id, stage, record).await?;

        let doc = self
            .memory
            .run_document(run_id)
            .await
            .ok_or_else(|| CoreError::StoreError(format!("Run {} vanished after write", run_id)))?;
        let bytes = serde_json::to_vec_pretty(&doc)?;
        let path = self.path_for(run_id);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::StoreError(format!("Failed to write {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Rewrote run document");
        Ok(())
    }
}
