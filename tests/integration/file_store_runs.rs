//! Runs persisted through the `file://` analytics store

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use rdf_analytics_core::{AnalyticsConfig, LinearNode, RunContext, RunId, StageId, WrapperConfig};
use rdf_analytics_inmemory::JsonFileAnalyticsStore;
use rdf_analytics_test_utils::data_generators::{enrich, poi_graph};
use rdf_analytics_test_utils::FnLinearStage;
use rdf_analytics_tests::PipelineHarness;

fn file_config(dir: &std::path::Path) -> AnalyticsConfig {
    AnalyticsConfig {
        store_url: format!("file://{}", dir.display()),
        ..AnalyticsConfig::default()
    }
}

fn harness(config: &AnalyticsConfig) -> PipelineHarness {
    let wrapper = WrapperConfig::new(
        Some(StageId::new("urn:stage:import")),
        Some(StageId::new("urn:stage:export")),
    );
    PipelineHarness::new(config, wrapper)
        .unwrap()
        .stage(Arc::new(LinearNode::new(FnLinearStage::identity("urn:stage:import"))))
        .unwrap()
        .stage(Arc::new(LinearNode::new(FnLinearStage::new("urn:stage:enrich", |g| {
            Ok(enrich(g, &[2, 2, 0]))
        }))))
        .unwrap()
        .stage(Arc::new(LinearNode::new(FnLinearStage::identity("urn:stage:export"))))
        .unwrap()
}

#[tokio::test]
async fn test_run_document_is_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());
    let harness = harness(&config);
    let ctx = RunContext::new(RunId::new("run-disk"));

    harness.run(&ctx, vec![poi_graph(3, 1)]).await.unwrap();

    let bytes = std::fs::read(dir.path().join("run-disk.json")).unwrap();
    let on_disk: Value = serde_json::from_slice(&bytes).unwrap();
    let in_memory = harness
        .provider()
        .memory_store()
        .run_document(&ctx.run_id)
        .await
        .unwrap();
    assert_eq!(on_disk, in_memory);

    assert_eq!(on_disk["global"]["enrichment"]["enriched_count"], json!(2));
    assert_eq!(on_disk["global"]["enrichment"]["max_delta"], json!(2));
    assert_eq!(on_disk["global"]["enrichment"]["avg_delta"], json!(1));
    assert_eq!(
        on_disk["stages"]["urn:stage:enrich"]["output"]["triple_count"],
        json!([10])
    );
}

#[tokio::test]
async fn test_each_run_gets_its_own_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());
    let harness = harness(&config);

    for name in ["first", "second"] {
        let ctx = RunContext::new(RunId::new(name));
        harness.run(&ctx, vec![poi_graph(3, 0)]).await.unwrap();
    }

    let reader = JsonFileAnalyticsStore::new(dir.path()).unwrap();
    for name in ["first", "second"] {
        let doc = reader.load_run(&RunId::new(name)).await.unwrap().unwrap();
        assert_eq!(doc["global"]["enrichment"]["poi_count"], json!(3));
    }
    assert!(reader.load_run(&RunId::new("third")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_harness_installs_configured_logging() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalyticsConfig {
        log_level: "warn".to_string(),
        ..file_config(dir.path())
    };
    let harness = harness(&config);

    assert_eq!(harness.monitoring_config().log_filter, "warn");
    harness.init_monitoring().unwrap();
    assert!(harness.init_monitoring().is_err());
}
