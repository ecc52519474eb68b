//! Data model shared by the analytics layer.
//!
//! RDF terms, triples and immutable graph snapshots, the run and stage
//! identifiers, and the JSON statistics record written to the store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A node or value position in a triple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// A named resource
    Iri(String),
    /// An anonymous resource, scoped to its graph
    BlankNode(String),
    /// A literal value in lexical form
    Literal(String),
}

impl Term {
    /// Create an IRI term
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(value.into())
    }

    /// Create a blank node term
    pub fn blank(label: impl Into<String>) -> Self {
        Term::BlankNode(label.into())
    }

    /// Create a literal term
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(value.into())
    }

    /// Literals can never appear in subject position
    #[inline]
    pub fn is_resource(&self) -> bool {
        !matches!(self, Term::Literal(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(label) => write!(f, "_:{}", label),
            Term::Literal(value) => write!(f, "\"{}\"", value),
        }
    }
}

/// A subject/predicate/object statement
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject resource
    pub subject: Term,
    /// Predicate IRI
    pub predicate: String,
    /// Object term
    pub object: Term,
}

impl Triple {
    /// Create a new triple
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// An immutable snapshot of a set of triples
///
/// Cloning a graph shares the underlying set, so snapshots taken around a
/// stage invocation never copy triples and can never be mutated.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: Arc<BTreeSet<Triple>>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph from any collection of triples; duplicates collapse
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        Self {
            triples: Arc::new(triples.into_iter().collect()),
        }
    }

    /// Number of triples
    #[inline]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the graph holds no triples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate over all triples in a stable order
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Whether the graph contains the given triple
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Triples whose predicate equals `predicate`
    pub fn with_predicate<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| t.predicate == predicate)
    }

    /// Distinct subjects of the graph
    pub fn subjects(&self) -> BTreeSet<&Term> {
        self.triples.iter().map(|t| &t.subject).collect()
    }

    /// A new graph holding the triples of both graphs
    pub fn union(&self, other: &Graph) -> Graph {
        Graph::from_triples(self.iter().chain(other.iter()).cloned())
    }

    /// Whether two handles share the same snapshot
    pub fn ptr_eq(&self, other: &Graph) -> bool {
        Arc::ptr_eq(&self.triples, &other.triples)
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph").field("triples", &self.len()).finish()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Graph::from_triples(iter)
    }
}

/// Identifier of one pipeline execution, assigned by the pipeline engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Create a run identifier from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random run identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of a pipeline stage, usually its node URI
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub String);

impl StageId {
    /// Create a stage identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-call context handed to every stage invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// The run this invocation belongs to
    pub run_id: RunId,
}

impl RunContext {
    /// Create a context for the given run
    pub fn new(run_id: RunId) -> Self {
        Self { run_id }
    }
}

/// Runtime parameters of a parameterized stage, validated by the host
pub type ParameterMap = serde_json::Map<String, serde_json::Value>;

/// Which side of a stage invocation a record describes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The batch handed to the stage
    Input,
    /// The batch returned by the stage
    Output,
    /// A caller-defined label
    Custom(String),
}

impl Phase {
    /// The key a record for this phase is nested under
    pub fn label(&self) -> &str {
        match self {
            Phase::Input => "input",
            Phase::Output => "output",
            Phase::Custom(label) => label,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A structured statistics document written to the analytics store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct StatsRecord {
    /// The inner JSON value, always an object
    pub value: serde_json::Value,
}

impl StatsRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self {
            value: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Create a record holding `body` under `key`
    pub fn nested(key: impl Into<String>, body: serde_json::Value) -> Self {
        let mut map = serde_json::Map::new();
        map.insert(key.into(), body);
        Self {
            value: serde_json::Value::Object(map),
        }
    }

    /// Create a record from a serializable value
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            value: serde_json::to_value(value)?,
        })
    }

    /// Get the inner JSON value
    #[inline]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Take ownership of the inner JSON value
    #[inline]
    pub fn into_value(self) -> serde_json::Value {
        self.value
    }

    /// Look up a value by a path of object keys
    pub fn get_path(&self, path: &[&str]) -> Option<&serde_json::Value> {
        path.iter()
            .try_fold(&self.value, |current, key| current.get(*key))
    }
}

impl Default for StatsRecord {
    fn default() -> Self {
        Self::new()
    }
}
