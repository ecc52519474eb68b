//! Points of interest
//!
//! A point of interest is a subject carrying exactly one triple with the
//! marker predicate. Everything here is a pure read over a snapshot.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Graph, Term};

/// Default reserved namespace
pub const DEFAULT_NAMESPACE: &str = "http://slipo.eu/def#";

/// Default local name of the marker predicate
pub const DEFAULT_MARKER_PREDICATE: &str = "category";

/// The reserved namespace and the marker predicate that flags a POI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    namespace: String,
    marker: String,
}

impl Vocabulary {
    /// Create a vocabulary from a namespace and a marker local name
    pub fn new(namespace: impl Into<String>, marker_local_name: &str) -> Self {
        let namespace = namespace.into();
        let marker = format!("{}{}", namespace, marker_local_name);
        Self { namespace, marker }
    }

    /// The reserved namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Full IRI of the marker predicate
    pub fn marker_predicate(&self) -> &str {
        &self.marker
    }

    /// Whether `predicate` lies in the reserved namespace
    pub fn in_namespace(&self, predicate: &str) -> bool {
        predicate.starts_with(&self.namespace)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE, DEFAULT_MARKER_PREDICATE)
    }
}

/// Per-graph figures computed at a wrap boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Number of points of interest
    pub poi_count: u64,
    /// Total number of triples
    pub triple_count: u64,
    /// `triple_count / poi_count`, or `0` without points of interest
    pub triples_per_poi: f64,
    /// Triples whose predicate lies in the reserved namespace
    pub namespace_triples: u64,
}

/// Ratio of triples to points of interest; never divides by zero
pub fn triples_per_poi(triple_count: u64, poi_count: u64) -> f64 {
    if poi_count > 0 {
        triple_count as f64 / poi_count as f64
    } else {
        0.0
    }
}

/// Identifies points of interest and summarises graphs
#[derive(Debug, Clone, Default)]
pub struct PoiExtractor {
    vocabulary: Vocabulary,
}

impl PoiExtractor {
    /// Create an extractor for the given vocabulary
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// The vocabulary in use
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Subjects carrying exactly one marker triple
    pub fn points_of_interest(&self, graph: &Graph) -> BTreeSet<Term> {
        let mut markers: BTreeMap<&Term, usize> = BTreeMap::new();
        for triple in graph.with_predicate(self.vocabulary.marker_predicate()) {
            *markers.entry(&triple.subject).or_default() += 1;
        }
        markers
            .into_iter()
            .filter(|(_, count)| *count == 1)
            .map(|(subject, _)| subject.clone())
            .collect()
    }

    /// Number of points of interest in `graph`
    pub fn poi_count(&self, graph: &Graph) -> u64 {
        self.points_of_interest(graph).len() as u64
    }

    /// Number of triples whose subject is `poi`
    pub fn direct_triples(&self, graph: &Graph, poi: &Term) -> u64 {
        graph.iter().filter(|t| &t.subject == poi).count() as u64
    }

    /// Triples whose predicate lies in the reserved namespace
    pub fn namespace_triples(&self, graph: &Graph) -> u64 {
        graph
            .iter()
            .filter(|t| self.vocabulary.in_namespace(&t.predicate))
            .count() as u64
    }

    /// Summarise one graph
    pub fn summarize(&self, graph: &Graph) -> GraphSummary {
        let poi_count = self.poi_count(graph);
        let triple_count = graph.len() as u64;
        GraphSummary {
            poi_count,
            triple_count,
            triples_per_poi: triples_per_poi(triple_count, poi_count),
            namespace_triples: self.namespace_triples(graph),
        }
    }

    /// Summarise every graph of a batch, preserving order
    pub fn summarize_batch(&self, graphs: &[Graph]) -> Vec<GraphSummary> {
        graphs.iter().map(|g| self.summarize(g)).collect()
    }
}
