//! Fluent builder for test graphs.

use rdf_analytics_core::{Graph, Term, Triple, Vocabulary};

/// Builds graphs with points of interest in a given vocabulary
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    vocabulary: Vocabulary,
    triples: Vec<Triple>,
    blank_counter: usize,
}

impl GraphBuilder {
    /// Start an empty graph in the default vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty graph in `vocabulary`
    pub fn with_vocabulary(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            ..Self::default()
        }
    }

    /// Start from the triples of an existing graph
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            triples: graph.iter().cloned().collect(),
            ..Self::default()
        }
    }

    /// Add a point of interest: one marker triple with a literal category
    pub fn poi(mut self, iri: &str, category: &str) -> Self {
        self.triples.push(Triple::new(
            Term::iri(iri),
            self.vocabulary.marker_predicate(),
            Term::literal(category),
        ));
        self
    }

    /// Add a literal-valued property
    pub fn property(mut self, subject: &str, predicate: &str, value: &str) -> Self {
        self.triples
            .push(Triple::new(Term::iri(subject), predicate, Term::literal(value)));
        self
    }

    /// Add a property in the vocabulary's namespace
    pub fn namespaced_property(self, subject: &str, local_name: &str, value: &str) -> Self {
        let predicate = format!("{}{}", self.vocabulary.namespace(), local_name);
        self.property(subject, &predicate, value)
    }

    /// Link two resources
    pub fn link(mut self, subject: &str, predicate: &str, object: &str) -> Self {
        self.triples
            .push(Triple::new(Term::iri(subject), predicate, Term::iri(object)));
        self
    }

    /// Attach a blank node with literal properties to `subject`
    pub fn structure(mut self, subject: &str, predicate: &str, properties: &[(&str, &str)]) -> Self {
        let node = Term::blank(format!("b{}", self.blank_counter));
        self.blank_counter += 1;
        self.triples
            .push(Triple::new(Term::iri(subject), predicate, node.clone()));
        for (p, v) in properties {
            self.triples
                .push(Triple::new(node.clone(), *p, Term::literal(*v)));
        }
        self
    }

    /// Add an arbitrary triple
    pub fn triple(mut self, triple: Triple) -> Self {
        self.triples.push(triple);
        self
    }

    /// Finish the graph
    pub fn build(self) -> Graph {
        Graph::from_triples(self.triples)
    }
}
