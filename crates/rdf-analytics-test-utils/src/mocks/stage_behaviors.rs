//! Scripted pipeline stages for driving wrapped nodes in tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use rdf_analytics_core::{
    CoreError, Graph, GraphStage, LinearStage, ParameterMap, ParameterizedLinearStage, RunContext,
    StageId, Term, Triple,
};

type TransformFn = dyn Fn(&Graph) -> Result<Graph, CoreError> + Send + Sync;

/// Linear stage backed by a closure; counts its invocations
pub struct FnLinearStage {
    id: StageId,
    transform: Box<TransformFn>,
    calls: AtomicUsize,
}

impl FnLinearStage {
    /// Stage applying `transform` to its input
    pub fn new<F>(id: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Graph) -> Result<Graph, CoreError> + Send + Sync + 'static,
    {
        Self {
            id: StageId::new(id),
            transform: Box::new(transform),
            calls: AtomicUsize::new(0),
        }
    }

    /// Stage returning its input unchanged
    pub fn identity(id: impl Into<String>) -> Self {
        Self::new(id, |g| Ok(g.clone()))
    }

    /// How often the stage ran
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinearStage for FnLinearStage {
    fn id(&self) -> &StageId {
        &self.id
    }

    async fn transform(&self, _ctx: &RunContext, input: Graph) -> Result<Graph, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.transform)(&input)
    }
}

/// Adds properties to every subject carrying `match_predicate`.
/// The number of properties per subject comes from the `count` parameter.
pub struct AddPropertyStage {
    id: StageId,
    match_predicate: String,
    property: String,
}

impl AddPropertyStage {
    /// Enrich subjects of `match_predicate` with `property` triples
    pub fn new(id: impl Into<String>, match_predicate: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            id: StageId::new(id),
            match_predicate: match_predicate.into(),
            property: property.into(),
        }
    }
}

#[async_trait]
impl ParameterizedLinearStage for AddPropertyStage {
    fn id(&self) -> &StageId {
        &self.id
    }

    async fn transform(
        &self,
        _ctx: &RunContext,
        parameters: &ParameterMap,
        input: Graph,
    ) -> Result<Graph, CoreError> {
        let count = parameters
            .get("count")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| CoreError::StageError("Missing integer parameter: count".to_string()))?;

        let subjects: Vec<Term> = input
            .with_predicate(&self.match_predicate)
            .map(|t| t.subject.clone())
            .collect();
        let additions: Graph = subjects
            .iter()
            .flat_map(|s| {
                (0..count).map(move |i| {
                    Triple::new(s.clone(), self.property.as_str(), Term::literal(format!("added-{}", i)))
                })
            })
            .collect();

        debug!(subjects = subjects.len(), count, "Adding properties");
        Ok(input.union(&additions))
    }
}

/// Graph stage merging all inputs into `out_degree` copies of their union
pub struct MergeStage {
    id: StageId,
    in_degree: usize,
    out_degree: usize,
}

impl MergeStage {
    /// Merge `in_degree` graphs into `out_degree` identical outputs
    pub fn new(id: impl Into<String>, in_degree: usize, out_degree: usize) -> Self {
        Self {
            id: StageId::new(id),
            in_degree,
            out_degree,
        }
    }
}

#[async_trait]
impl GraphStage for MergeStage {
    fn id(&self) -> &StageId {
        &self.id
    }

    fn in_degree(&self) -> usize {
        self.in_degree
    }

    fn out_degree(&self) -> usize {
        self.out_degree
    }

    async fn transform(&self, _ctx: &RunContext, inputs: Vec<Graph>) -> Result<Vec<Graph>, CoreError> {
        let merged = inputs.iter().fold(Graph::new(), |acc, g| acc.union(g));
        Ok(vec![merged; self.out_degree])
    }
}

/// Graph stage splitting one graph into the part with and without `predicate`
pub struct SplitStage {
    id: StageId,
    predicate: String,
}

impl SplitStage {
    /// Split on triples with `predicate`
    pub fn new(id: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            id: StageId::new(id),
            predicate: predicate.into(),
        }
    }
}

#[async_trait]
impl GraphStage for SplitStage {
    fn id(&self) -> &StageId {
        &self.id
    }

    fn in_degree(&self) -> usize {
        1
    }

    fn out_degree(&self) -> usize {
        2
    }

    async fn transform(&self, _ctx: &RunContext, inputs: Vec<Graph>) -> Result<Vec<Graph>, CoreError> {
        let input = inputs.into_iter().next().unwrap_or_default();
        let (matching, rest): (Vec<Triple>, Vec<Triple>) = input
            .iter()
            .cloned()
            .partition(|t| t.predicate == self.predicate);
        Ok(vec![Graph::from_triples(matching), Graph::from_triples(rest)])
    }
}

/// Linear stage that always fails
pub struct FailingStage {
    id: StageId,
}

impl FailingStage {
    /// Failing stage with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: StageId::new(id) }
    }
}

#[async_trait]
impl LinearStage for FailingStage {
    fn id(&self) -> &StageId {
        &self.id
    }

    async fn transform(&self, _ctx: &RunContext, _input: Graph) -> Result<Graph, CoreError> {
        Err(CoreError::StageError(format!("Stage {} failed", self.id)))
    }
}
