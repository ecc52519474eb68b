//! Whole-pipeline runs across every node shape

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use rdf_analytics_core::{
    AnalyticsConfig, ExecutionNodeBase, GraphNode, LinearNode, ParameterMap,
    ParameterizedLinearNode, RunContext, RunId, StageId, Vocabulary, WrapperConfig,
};
use rdf_analytics_monitoring::{init_test_tracing, LogExt};
use rdf_analytics_test_utils::assertions::{assert_enrichment_field, assert_stage_phase};
use rdf_analytics_test_utils::data_generators::poi_graph;
use rdf_analytics_test_utils::{AddPropertyStage, FnLinearStage, MergeStage, SplitStage};
use rdf_analytics_tests::PipelineHarness;

const CONFIG: &str = r#"
namespace: "http://slipo.eu/def#"
marker_predicate: category
store_url: "memory://pipeline"
failure_policy: isolate
max_concurrent_queries: 4
log_level: "info,rdf_analytics_core=debug"
"#;

const WRAPPER: &str = r#"{
    "global-input": "urn:stage:transform",
    "global-output": "urn:stage:export"
}"#;

fn harness() -> PipelineHarness {
    init_test_tracing();
    let config = AnalyticsConfig::from_yaml_str(CONFIG)
        .log_err("Invalid test configuration")
        .unwrap();
    let wrapper: WrapperConfig = serde_json::from_str(WRAPPER).unwrap();
    let marker = Vocabulary::default().marker_predicate().to_string();

    let mut params = ParameterMap::new();
    params.insert("count".to_string(), json!(3));

    PipelineHarness::new(&config, wrapper)
        .unwrap()
        .stage(Arc::new(LinearNode::new(FnLinearStage::identity("urn:stage:transform"))))
        .unwrap()
        .stage(Arc::new(GraphNode::new(SplitStage::new("urn:stage:split", marker.clone()))))
        .unwrap()
        .stage(Arc::new(GraphNode::new(MergeStage::new("urn:stage:merge", 2, 1))))
        .unwrap()
        .stage(Arc::new(ParameterizedLinearNode::new(
            AddPropertyStage::new("urn:stage:enrich", marker, "http://slipo.eu/def#phone"),
            params,
        )))
        .unwrap()
        .stage(Arc::new(LinearNode::new(FnLinearStage::identity("urn:stage:export"))))
        .unwrap()
}

#[tokio::test]
async fn test_pipeline_run_records_every_stage() {
    let harness = harness();
    let ctx = RunContext::new(RunId::generate());

    let output = harness.run(&ctx, vec![poi_graph(4, 2)]).await.unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].len(), 12 + 12);

    let doc = harness
        .provider()
        .memory_store()
        .run_document(&ctx.run_id)
        .await
        .unwrap();

    let split_output = assert_stage_phase(&doc, "urn:stage:split", "output").unwrap();
    assert_eq!(split_output["graphs"], json!(2));
    assert_eq!(split_output["poi_count"], json!([4, 0]));

    let merge_input = assert_stage_phase(&doc, "urn:stage:merge", "input").unwrap();
    assert_eq!(merge_input["triple_count"], json!([4, 8]));

    let enrich_output = assert_stage_phase(&doc, "urn:stage:enrich", "output").unwrap();
    assert_eq!(enrich_output["namespace_triples"], json!([16]));
    assert_eq!(enrich_output["triples_per_poi"], json!([6.0]));

    assert_enrichment_field(&doc, "poi_count", &json!(4)).unwrap();
    assert_enrichment_field(&doc, "enriched_count", &json!(4)).unwrap();
    assert_enrichment_field(&doc, "avg_delta", &json!(3)).unwrap();
    assert_enrichment_field(&doc, "enrichment_percentage", &json!(100.0)).unwrap();
}

#[tokio::test]
async fn test_many_runs_on_one_task() {
    let harness = harness();
    let runs: Vec<_> = (1..=6)
        .map(|n| (RunContext::new(RunId::new(format!("run-{}", n))), vec![poi_graph(n, 1)]))
        .collect();

    let results = harness.run_all(runs).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let store = harness.provider().memory_store();
    for n in 1..=6usize {
        let doc = store.run_document(&RunId::new(format!("run-{}", n))).await.unwrap();
        assert_enrichment_field(&doc, "poi_count", &json!(n)).unwrap();
        assert_enrichment_field(&doc, "total_delta", &json!(3 * n)).unwrap();
    }
    assert_eq!(harness.provider().capture_registry().pending_runs(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_runs_on_many_tasks() {
    let harness = Arc::new(harness());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let harness = harness.clone();
            tokio::spawn(async move {
                let ctx = RunContext::new(RunId::new(format!("parallel-{}", i)));
                harness.run(&ctx, vec![poi_graph(1 + i % 4, 0)]).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let store = harness.provider().memory_store();
    assert_eq!(store.runs().await.len(), 16);
    for i in 0..16usize {
        let doc = store
            .run_document(&RunId::new(format!("parallel-{}", i)))
            .await
            .unwrap();
        assert_enrichment_field(&doc, "poi_count", &json!(1 + i % 4)).unwrap();
        assert_enrichment_field(&doc, "max_delta", &json!(3)).unwrap();
    }
}

#[tokio::test]
async fn test_wrapped_nodes_keep_their_identity() {
    let harness = harness();
    let ids: Vec<StageId> = harness.nodes().iter().map(|n| n.id().clone()).collect();
    assert_eq!(
        ids,
        vec![
            StageId::new("urn:stage:transform"),
            StageId::new("urn:stage:split"),
            StageId::new("urn:stage:merge"),
            StageId::new("urn:stage:enrich"),
            StageId::new("urn:stage:export"),
        ]
    );
    assert!(harness.nodes()[3].parameters().is_some());
    assert_eq!(
        harness.monitoring_config().log_filter,
        "info,rdf_analytics_core=debug"
    );
}
