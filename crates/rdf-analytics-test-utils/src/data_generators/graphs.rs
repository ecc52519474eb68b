//! Test data generators for graphs with points of interest.

use rdf_analytics_core::{Graph, Term, Triple, Vocabulary};

use crate::builders::GraphBuilder;

/// IRI of the `index`-th generated point of interest
pub fn poi_iri(index: usize) -> String {
    format!("http://example.org/poi/{}", index)
}

/// A graph of `pois` points of interest, each with `properties` extra literal properties
pub fn poi_graph(pois: usize, properties: usize) -> Graph {
    let mut builder = GraphBuilder::new();
    for i in 0..pois {
        let iri = poi_iri(i);
        builder = builder.poi(&iri, "amenity");
        for j in 0..properties {
            builder = builder.property(&iri, "http://example.org/prop", &format!("value-{}", j));
        }
    }
    builder.build()
}

/// A graph of `triples` triples without any point of interest
pub fn plain_graph(triples: usize) -> Graph {
    (0..triples)
        .map(|i| {
            Triple::new(
                Term::iri(format!("http://example.org/thing/{}", i)),
                "http://example.org/label",
                Term::literal(format!("thing {}", i)),
            )
        })
        .collect()
}

/// `graph` plus `additions[i]` new literal properties on the `i`-th generated POI
pub fn enrich(graph: &Graph, additions: &[usize]) -> Graph {
    let mut builder = GraphBuilder::from_graph(graph);
    for (i, count) in additions.iter().enumerate() {
        let iri = poi_iri(i);
        for j in 0..*count {
            builder = builder.property(&iri, "http://example.org/enriched", &format!("extra-{}", j));
        }
    }
    builder.build()
}

/// `graph` without any triple whose subject is the `index`-th generated POI
/// and whose predicate is not the marker
pub fn strip_properties(graph: &Graph, index: usize, vocabulary: &Vocabulary) -> Graph {
    let subject = Term::iri(poi_iri(index));
    graph
        .iter()
        .filter(|t| t.subject != subject || t.predicate == vocabulary.marker_predicate())
        .cloned()
        .collect()
}
