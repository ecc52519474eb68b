//! In-memory implementation of the GraphQuery interface

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use tracing::trace;

use rdf_analytics_core::{CoreError, Graph, GraphQuery, Term};

/// Reachability counting over an in-memory graph
///
/// Starting from the entity, IRI and blank-node terms are followed along
/// triples in both directions; literals end a path. The answer is the number
/// of triples whose subject was reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryGraphQuery;

impl InMemoryGraphQuery {
    /// Create a query facade
    pub fn new() -> Self {
        Self
    }

    /// Synchronous form of [`GraphQuery::count_reachable`]
    pub fn reachable_triples(graph: &Graph, entity: &Term) -> u64 {
        if !entity.is_resource() {
            return 0;
        }

        let mut neighbours: HashMap<&Term, Vec<&Term>> = HashMap::new();
        let mut out_degree: HashMap<&Term, u64> = HashMap::new();
        for triple in graph.iter() {
            *out_degree.entry(&triple.subject).or_insert(0) += 1;
            if triple.object.is_resource() {
                neighbours.entry(&triple.subject).or_default().push(&triple.object);
                neighbours.entry(&triple.object).or_default().push(&triple.subject);
            }
        }

        let mut seen: HashSet<&Term> = HashSet::new();
        let mut queue: VecDeque<&Term> = VecDeque::new();
        seen.insert(entity);
        queue.push_back(entity);

        let mut count = 0;
        while let Some(node) = queue.pop_front() {
            count += out_degree.get(node).copied().unwrap_or(0);
            for &next in neighbours.get(node).into_iter().flatten() {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        trace!(entity = %entity, reached = seen.len(), count, "Counted reachable triples");
        count
    }
}

#[async_trait]
impl GraphQuery for InMemoryGraphQuery {
    async fn count_reachable(&self, graph: &Graph, entity: &Term) -> Result<u64, CoreError> {
        Ok(Self::reachable_triples(graph, entity))
    }
}
