//! Mock implementation of the GraphQuery trait.

use async_trait::async_trait;
use mockall::mock;

use rdf_analytics_core::{CoreError, Graph, GraphQuery, Term};

// Generate the mock implementation for GraphQuery
mock! {
    pub GraphQuery {}

    #[async_trait]
    impl GraphQuery for GraphQuery {
        async fn count_reachable(&self, graph: &Graph, entity: &Term) -> Result<u64, CoreError>;
    }
}

/// Creates a mock that answers with the number of triples directly on the entity.
pub fn create_mock_graph_query() -> MockGraphQuery {
    let mut mock = MockGraphQuery::new();

    mock.expect_count_reachable().returning(|graph, entity| {
        Ok(graph.iter().filter(|t| &t.subject == entity).count() as u64)
    });

    mock
}
