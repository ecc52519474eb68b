use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use rdf_analytics_core::application::registry::ANALYTICS_WRAPPER_TYPE;
use rdf_analytics_core::{
    CoreError, ExecutionNode, ExecutionNodeBase, Graph, GraphNode, LinearNode, LinearStage,
    NodeKind, ParameterMap, ParameterizedGraphNode, ParameterizedGraphStage,
    ParameterizedLinearNode, RunContext, RunId, StageId, Term, Triple, Vocabulary, WrapperConfig,
    WrapperRegistry,
};
use rdf_analytics_inmemory::InMemoryAnalyticsProvider;
use rdf_analytics_test_utils::assertions::{
    assert_enrichment_field, assert_no_stage_phase, assert_stage_phase, enrichment_report,
};
use rdf_analytics_test_utils::data_generators::{enrich, plain_graph, poi_graph, poi_iri};
use rdf_analytics_test_utils::{
    AddPropertyStage, FailingStage, FnLinearStage, GraphBuilder, MergeStage,
};

const IMPORT: &str = "urn:stage:import";
const ENRICH: &str = "urn:stage:enrich";
const EXPORT: &str = "urn:stage:export";

fn boundaries() -> WrapperConfig {
    WrapperConfig::new(Some(StageId::new(IMPORT)), Some(StageId::new(EXPORT)))
}

fn wrap(registry: &WrapperRegistry, node: Arc<dyn ExecutionNode>, config: &WrapperConfig) -> Arc<dyn ExecutionNode> {
    registry
        .wrap(ANALYTICS_WRAPPER_TYPE, node, config)
        .expect("analytics wrapper is registered")
}

fn linear(stage: impl LinearStage + 'static) -> Arc<dyn ExecutionNode> {
    Arc::new(LinearNode::new(stage))
}

/// A three stage pipeline: import, an enrichment stage, export
struct Pipeline {
    import: Arc<dyn ExecutionNode>,
    enrich: Arc<dyn ExecutionNode>,
    export: Arc<dyn ExecutionNode>,
}

impl Pipeline {
    fn new(registry: &WrapperRegistry, enrich_node: Arc<dyn ExecutionNode>) -> Self {
        let config = boundaries();
        Self {
            import: wrap(registry, linear(FnLinearStage::identity(IMPORT)), &config),
            enrich: wrap(registry, enrich_node, &config),
            export: wrap(registry, linear(FnLinearStage::identity(EXPORT)), &config),
        }
    }

    async fn run(&self, ctx: &RunContext, input: Graph) -> Result<Graph, CoreError> {
        let mut batch = vec![input];
        for node in [&self.import, &self.enrich, &self.export] {
            batch = node.apply(ctx, batch).await?;
        }
        Ok(batch.remove(0))
    }
}

fn add_property_node(count: u64) -> Arc<dyn ExecutionNode> {
    let stage = AddPropertyStage::new(
        ENRICH,
        Vocabulary::default().marker_predicate(),
        "http://example.org/phone",
    );
    let mut params = ParameterMap::new();
    params.insert("count".to_string(), json!(count));
    Arc::new(ParameterizedLinearNode::new(stage, params))
}

#[tokio::test]
async fn test_stage_statistics_for_ten_pois() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let node = wrap(
        &registry,
        linear(FnLinearStage::identity("urn:stage:noop")),
        &WrapperConfig::default(),
    );
    let ctx = RunContext::new(RunId::new("run-stats"));

    node.apply(&ctx, vec![poi_graph(10, 4)]).await.unwrap();

    let record = provider
        .memory_store()
        .stage_record(&ctx.run_id, &StageId::new("urn:stage:noop"))
        .await
        .unwrap();
    assert_eq!(record["input"]["poi_count"], json!([10]));
    assert_eq!(record["input"]["triple_count"], json!([50]));
    assert_eq!(record["input"]["triples_per_poi"], json!([5.0]));
    assert_eq!(record["input"], record["output"]);
}

#[tokio::test]
async fn test_full_run_writes_stage_and_global_records() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let pipeline = Pipeline::new(&registry, add_property_node(2));
    let ctx = RunContext::new(RunId::new("run-full"));

    let before = poi_graph(2, 1);
    let output = pipeline.run(&ctx, before.clone()).await.unwrap();
    assert_eq!(output.len(), 8);

    let doc = provider.memory_store().run_document(&ctx.run_id).await.unwrap();
    for stage in [IMPORT, ENRICH, EXPORT] {
        assert_stage_phase(&doc, stage, "input").unwrap();
        assert_stage_phase(&doc, stage, "output").unwrap();
    }
    assert_eq!(
        assert_stage_phase(&doc, ENRICH, "output").unwrap()["triples_per_poi"],
        json!([4.0])
    );

    assert_eq!(
        enrichment_report(&doc).unwrap(),
        &json!({
            "poi_count": 2,
            "enriched_count": 2,
            "total_delta": 4,
            "avg_delta": 2,
            "max_delta": 2,
            "enrichment_percentage": 100.0,
            "before_triples": 4,
            "after_triples": 8,
            "avg_delta_defined": true,
            "percentage_defined": true
        })
    );
    assert!(!provider.capture_registry().is_armed(&ctx.run_id));
}

#[tokio::test]
async fn test_enrichment_through_blank_node_structure() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();

    let address = Term::blank("addr");
    let before = GraphBuilder::new()
        .poi("ex:p", "cafe")
        .property("ex:p", "ex:name", "P")
        .triple(Triple::new(Term::iri("ex:p"), "ex:address", address.clone()))
        .build();
    let additions = Graph::from_triples(vec![
        Triple::new(address.clone(), "ex:street", Term::literal("Main")),
        Triple::new(address, "ex:city", Term::literal("Athens")),
    ]);
    let enrich_node = linear(FnLinearStage::new(ENRICH, move |g| Ok(g.union(&additions))));
    let pipeline = Pipeline::new(&registry, enrich_node);
    let ctx = RunContext::new(RunId::new("run-blank"));

    pipeline.run(&ctx, before).await.unwrap();

    let doc = provider.memory_store().run_document(&ctx.run_id).await.unwrap();
    assert_enrichment_field(&doc, "enriched_count", &json!(1)).unwrap();
    assert_enrichment_field(&doc, "total_delta", &json!(2)).unwrap();
    assert_enrichment_field(&doc, "avg_delta", &json!(2)).unwrap();
    assert_enrichment_field(&doc, "max_delta", &json!(2)).unwrap();
}

#[tokio::test]
async fn test_one_enriched_one_unenriched_poi() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let enrich_node = linear(FnLinearStage::new(ENRICH, |g| Ok(enrich(g, &[4, 0]))));
    let pipeline = Pipeline::new(&registry, enrich_node);
    let ctx = RunContext::new(RunId::new("run-partial"));

    pipeline.run(&ctx, poi_graph(2, 1)).await.unwrap();

    let doc = provider.memory_store().run_document(&ctx.run_id).await.unwrap();
    assert_enrichment_field(&doc, "enriched_count", &json!(1)).unwrap();
    assert_enrichment_field(&doc, "max_delta", &json!(4)).unwrap();
    assert_enrichment_field(&doc, "avg_delta", &json!(2)).unwrap();
}

#[tokio::test]
async fn test_enrichment_percentage_is_graph_growth() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let enrich_node = linear(FnLinearStage::new(ENRICH, |g| Ok(enrich(g, &[1; 20]))));
    let pipeline = Pipeline::new(&registry, enrich_node);
    let ctx = RunContext::new(RunId::new("run-growth"));

    let before = poi_graph(20, 4);
    assert_eq!(before.len(), 100);
    pipeline.run(&ctx, before).await.unwrap();

    let doc = provider.memory_store().run_document(&ctx.run_id).await.unwrap();
    assert_enrichment_field(&doc, "enrichment_percentage", &json!(20.0)).unwrap();
    assert_enrichment_field(&doc, "after_triples", &json!(120)).unwrap();
}

#[tokio::test]
async fn test_batches_without_pois_are_not_written() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let node = wrap(&registry, linear(FnLinearStage::identity("urn:stage:plain")), &WrapperConfig::default());
    let ctx = RunContext::new(RunId::new("run-plain"));

    let out = node.apply(&ctx, vec![plain_graph(5)]).await.unwrap();
    assert_eq!(out[0].len(), 5);
    assert_eq!(provider.memory_store().write_count(), 0);
    assert!(provider.memory_store().runs().await.is_empty());
}

#[tokio::test]
async fn test_output_without_pois_keeps_input_record_only() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let node = wrap(
        &registry,
        linear(FnLinearStage::new("urn:stage:drop", |_| Ok(plain_graph(1)))),
        &WrapperConfig::default(),
    );
    let ctx = RunContext::new(RunId::new("run-drop"));

    node.apply(&ctx, vec![poi_graph(3, 0)]).await.unwrap();

    let doc = provider.memory_store().run_document(&ctx.run_id).await.unwrap();
    assert_stage_phase(&doc, "urn:stage:drop", "input").unwrap();
    assert_no_stage_phase(&doc, "urn:stage:drop", "output").unwrap();
}

#[tokio::test]
async fn test_global_output_without_capture_is_skipped() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let export = wrap(&registry, linear(FnLinearStage::identity(EXPORT)), &boundaries());
    let ctx = RunContext::new(RunId::new("run-no-capture"));

    export.apply(&ctx, vec![poi_graph(2, 1)]).await.unwrap();

    assert_eq!(provider.memory_store().global_record(&ctx.run_id).await, None);
    assert!(provider
        .memory_store()
        .stage_record(&ctx.run_id, &StageId::new(EXPORT))
        .await
        .is_some());
}

#[tokio::test]
async fn test_runs_do_not_share_captures_when_interleaved() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let import = wrap(&registry, linear(FnLinearStage::identity(IMPORT)), &boundaries());
    let export = wrap(&registry, linear(FnLinearStage::identity(EXPORT)), &boundaries());
    let run_a = RunContext::new(RunId::new("run-a"));
    let run_b = RunContext::new(RunId::new("run-b"));

    import.apply(&run_a, vec![poi_graph(1, 1)]).await.unwrap();
    import.apply(&run_b, vec![poi_graph(3, 1)]).await.unwrap();
    export.apply(&run_b, vec![enrich(&poi_graph(3, 1), &[1, 1, 1])]).await.unwrap();
    export.apply(&run_a, vec![poi_graph(1, 1)]).await.unwrap();

    let store = provider.memory_store();
    let doc_a = store.run_document(&run_a.run_id).await.unwrap();
    let doc_b = store.run_document(&run_b.run_id).await.unwrap();
    assert_enrichment_field(&doc_a, "poi_count", &json!(1)).unwrap();
    assert_enrichment_field(&doc_a, "enriched_count", &json!(0)).unwrap();
    assert_enrichment_field(&doc_b, "poi_count", &json!(3)).unwrap();
    assert_enrichment_field(&doc_b, "enriched_count", &json!(3)).unwrap();
    assert_eq!(provider.capture_registry().pending_runs(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_runs_are_isolated() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let pipeline = Arc::new(Pipeline::new(&registry, add_property_node(1)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                let ctx = RunContext::new(RunId::new(format!("run-{}", i)));
                pipeline.run(&ctx, poi_graph(i + 1, 2)).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let store = provider.memory_store();
    assert_eq!(store.runs().await.len(), 8);
    for i in 0..8usize {
        let doc = store.run_document(&RunId::new(format!("run-{}", i))).await.unwrap();
        assert_enrichment_field(&doc, "poi_count", &json!(i + 1)).unwrap();
        assert_enrichment_field(&doc, "enriched_count", &json!(i + 1)).unwrap();
        assert_enrichment_field(&doc, "avg_delta", &json!(1)).unwrap();
    }
    assert_eq!(provider.capture_registry().pending_runs(), 0);
}

#[tokio::test]
async fn test_graph_node_records_whole_batch() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let merge_id = "urn:stage:merge";
    let node = wrap(
        &registry,
        Arc::new(GraphNode::new(MergeStage::new(merge_id, 2, 1))),
        &WrapperConfig::new(Some(StageId::new(merge_id)), Some(StageId::new(merge_id))),
    );
    assert_eq!(node.kind(), NodeKind::Graph);
    assert_eq!(node.in_degree(), 2);

    let ctx = RunContext::new(RunId::new("run-merge"));
    let out = node
        .apply(&ctx, vec![poi_graph(1, 0), poi_graph(2, 1)])
        .await
        .unwrap();
    assert_eq!(out.len(), 1);

    let record = provider
        .memory_store()
        .stage_record(&ctx.run_id, &StageId::new(merge_id))
        .await
        .unwrap();
    assert_eq!(record["input"]["graphs"], json!(2));
    assert_eq!(record["input"]["poi_count"], json!([1, 2]));
    assert_eq!(record["output"]["poi_count"], json!([2]));
    assert_eq!(record["output"]["triple_count"], json!([4]));
    assert_eq!(provider.memory_store().global_record(&ctx.run_id).await, None);
    assert_eq!(provider.capture_registry().pending_runs(), 0);
}

/// Keeps the first graph of the batch and drops the rest
struct KeepFirst {
    id: StageId,
}

#[async_trait]
impl ParameterizedGraphStage for KeepFirst {
    fn id(&self) -> &StageId {
        &self.id
    }

    fn in_degree(&self) -> usize {
        2
    }

    fn out_degree(&self) -> usize {
        1
    }

    async fn transform(
        &self,
        _ctx: &RunContext,
        _parameters: &ParameterMap,
        inputs: Vec<Graph>,
    ) -> Result<Vec<Graph>, CoreError> {
        Ok(inputs.into_iter().take(1).collect())
    }
}

#[tokio::test]
async fn test_parameterized_graph_node_keeps_parameters() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let mut params = ParameterMap::new();
    params.insert("strategy".to_string(), json!("keep-first"));
    let node = wrap(
        &registry,
        Arc::new(ParameterizedGraphNode::new(
            KeepFirst { id: StageId::new("urn:stage:keep") },
            params.clone(),
        )),
        &WrapperConfig::default(),
    );
    assert_eq!(node.parameters(), Some(&params));

    let first = poi_graph(2, 0);
    let ctx = RunContext::new(RunId::new("run-keep"));
    let out = node.apply(&ctx, vec![first.clone(), poi_graph(5, 0)]).await.unwrap();
    assert!(out[0].ptr_eq(&first));
}

#[tokio::test]
async fn test_stage_errors_propagate_without_records() {
    let provider = InMemoryAnalyticsProvider::new();
    let registry = provider.create_registry();
    let ctx = RunContext::new(RunId::new("run-fail"));

    let failing = wrap(&registry, linear(FailingStage::new("urn:stage:broken")), &WrapperConfig::default());
    let err = failing.apply(&ctx, vec![poi_graph(1, 0)]).await.unwrap_err();
    assert!(matches!(err, CoreError::StageError(_)));

    let identity = wrap(&registry, linear(FnLinearStage::identity("urn:stage:id")), &WrapperConfig::default());
    let err = identity
        .apply(&ctx, vec![poi_graph(1, 0), poi_graph(1, 0)])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::StageError(_)));

    assert_eq!(provider.memory_store().write_count(), 0);
}

#[tokio::test]
async fn test_poi_helpers_match_generated_iris() {
    let graph = poi_graph(3, 0);
    let pois = rdf_analytics_core::PoiExtractor::default().points_of_interest(&graph);
    assert!(pois.contains(&Term::iri(poi_iri(2))));
}
