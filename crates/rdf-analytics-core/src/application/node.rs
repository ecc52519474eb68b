//! Execution node shapes
//!
//! Host pipelines provide stages in one of four shapes: single-input/single-
//! output or multi-input/multi-output, each either static or carrying runtime
//! parameters. One small adapter per shape turns a stage into an
//! [`ExecutionNode`], the single capability every decorator works against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{Graph, ParameterMap, RunContext, StageId};
use crate::CoreError;

/// Whether a node consumes one graph or a batch wired from several ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Single input, single output
    Linear,
    /// Multiple inputs, multiple outputs
    Graph,
}

/// Non-async base trait for execution nodes
/// This trait is object-safe and carries the node's identity
pub trait ExecutionNodeBase: Send + Sync {
    /// Stable identifier of the node
    fn id(&self) -> &StageId;

    /// Shape of the node
    fn kind(&self) -> NodeKind;

    /// Number of input graphs the node expects
    fn in_degree(&self) -> usize {
        1
    }

    /// Number of output graphs the node produces
    fn out_degree(&self) -> usize {
        1
    }

    /// Runtime parameters, for parameterized nodes
    fn parameters(&self) -> Option<&ParameterMap> {
        None
    }
}

/// A node the pipeline engine can apply to a batch of graphs
#[async_trait]
pub trait ExecutionNode: ExecutionNodeBase {
    /// Transform the input batch into the output batch
    async fn apply(&self, ctx: &RunContext, inputs: Vec<Graph>) -> Result<Vec<Graph>, CoreError>;
}

/// A single-input, single-output stage
#[async_trait]
pub trait LinearStage: Send + Sync {
    /// Stable identifier of the stage
    fn id(&self) -> &StageId;

    /// Transform one graph
    async fn transform(&self, ctx: &RunContext, input: Graph) -> Result<Graph, CoreError>;
}

/// A single-input, single-output stage driven by runtime parameters
#[async_trait]
pub trait ParameterizedLinearStage: Send + Sync {
    /// Stable identifier of the stage
    fn id(&self) -> &StageId;

    /// Transform one graph under the given parameters
    async fn transform(
        &self,
        ctx: &RunContext,
        parameters: &ParameterMap,
        input: Graph,
    ) -> Result<Graph, CoreError>;
}

/// A multi-input, multi-output stage
#[async_trait]
pub trait GraphStage: Send + Sync {
    /// Stable identifier of the stage
    fn id(&self) -> &StageId;

    /// Number of input graphs
    fn in_degree(&self) -> usize;

    /// Number of output graphs
    fn out_degree(&self) -> usize;

    /// Transform the input batch
    async fn transform(&self, ctx: &RunContext, inputs: Vec<Graph>) -> Result<Vec<Graph>, CoreError>;
}

/// A multi-input, multi-output stage driven by runtime parameters
#[async_trait]
pub trait ParameterizedGraphStage: Send + Sync {
    /// Stable identifier of the stage
    fn id(&self) -> &StageId;

    /// Number of input graphs
    fn in_degree(&self) -> usize;

    /// Number of output graphs
    fn out_degree(&self) -> usize;

    /// Transform the input batch under the given parameters
    async fn transform(
        &self,
        ctx: &RunContext,
        parameters: &ParameterMap,
        inputs: Vec<Graph>,
    ) -> Result<Vec<Graph>, CoreError>;
}

fn single_input(id: &StageId, mut inputs: Vec<Graph>) -> Result<Graph, CoreError> {
    if inputs.len() != 1 {
        return Err(CoreError::StageError(format!(
            "Linear stage {} expects exactly one input graph, got {}",
            id,
            inputs.len()
        )));
    }
    Ok(inputs.remove(0))
}

fn check_arity(id: &StageId, side: &str, expected: usize, actual: usize) -> Result<(), CoreError> {
    if expected != actual {
        return Err(CoreError::StageError(format!(
            "Stage {} declares {} {} graphs, got {}",
            id, expected, side, actual
        )));
    }
    Ok(())
}

/// Adapter for [`LinearStage`]
pub struct LinearNode<S> {
    stage: S,
}

impl<S: LinearStage> LinearNode<S> {
    /// Adapt a linear stage
    pub fn new(stage: S) -> Self {
        Self { stage }
    }
}

impl<S: LinearStage> ExecutionNodeBase for LinearNode<S> {
    fn id(&self) -> &StageId {
        self.stage.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Linear
    }
}

#[async_trait]
impl<S: LinearStage> ExecutionNode for LinearNode<S> {
    async fn apply(&self, ctx: &RunContext, inputs: Vec<Graph>) -> Result<Vec<Graph>, CoreError> {
        let input = single_input(self.id(), inputs)?;
        Ok(vec![self.stage.transform(ctx, input).await?])
    }
}

/// Adapter for [`ParameterizedLinearStage`]
pub struct ParameterizedLinearNode<S> {
    stage: S,
    parameters: ParameterMap,
}

impl<S: ParameterizedLinearStage> ParameterizedLinearNode<S> {
    /// Adapt a parameterized linear stage with its validated parameters
    pub fn new(stage: S, parameters: ParameterMap) -> Self {
        Self { stage, parameters }
    }
}

impl<S: ParameterizedLinearStage> ExecutionNodeBase for ParameterizedLinearNode<S> {
    fn id(&self) -> &StageId {
        self.stage.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Linear
    }

    fn parameters(&self) -> Option<&ParameterMap> {
        Some(&self.parameters)
    }
}

#[async_trait]
impl<S: ParameterizedLinearStage> ExecutionNode for ParameterizedLinearNode<S> {
    async fn apply(&self, ctx: &RunContext, inputs: Vec<Graph>) -> Result<Vec<Graph>, CoreError> {
        let input = single_input(self.id(), inputs)?;
        Ok(vec![self.stage.transform(ctx, &self.parameters, input).await?])
    }
}

/// Adapter for [`GraphStage`]
pub struct GraphNode<S> {
    stage: S,
}

impl<S: GraphStage> GraphNode<S> {
    /// Adapt a graph stage
    pub fn new(stage: S) -> Self {
        Self { stage }
    }
}

impl<S: GraphStage> ExecutionNodeBase for GraphNode<S> {
    fn id(&self) -> &StageId {
        self.stage.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Graph
    }

    fn in_degree(&self) -> usize {
        self.stage.in_degree()
    }

    fn out_degree(&self) -> usize {
        self.stage.out_degree()
    }
}

#[async_trait]
impl<S: GraphStage> ExecutionNode for GraphNode<S> {
    async fn apply(&self, ctx: &RunContext, inputs: Vec<Graph>) -> Result<Vec<Graph>, CoreError> {
        check_arity(self.id(), "input", self.in_degree(), inputs.len())?;
        let outputs = self.stage.transform(ctx, inputs).await?;
        check_arity(self.id(), "output", self.out_degree(), outputs.len())?;
        Ok(outputs)
    }
}

/// Adapter for [`ParameterizedGraphStage`]
pub struct ParameterizedGraphNode<S> {
    stage: S,
    parameters: ParameterMap,
}

impl<S: ParameterizedGraphStage> ParameterizedGraphNode<S> {
    /// Adapt a parameterized graph stage with its validated parameters
    pub fn new(stage: S, parameters: ParameterMap) -> Self {
        Self { stage, parameters }
    }
}

impl<S: ParameterizedGraphStage> ExecutionNodeBase for ParameterizedGraphNode<S> {
    fn id(&self) -> &StageId {
        self.stage.id()
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Graph
    }

    fn in_degree(&self) -> usize {
        self.stage.in_degree()
    }

    fn out_degree(&self) -> usize {
        self.stage.out_degree()
    }

    fn parameters(&self) -> Option<&ParameterMap> {
        Some(&self.parameters)
    }
}

#[async_trait]
impl<S: ParameterizedGraphStage> ExecutionNode for ParameterizedGraphNode<S> {
    async fn apply(&self, ctx: &RunContext, inputs: Vec<Graph>) -> Result<Vec<Graph>, CoreError> {
        check_arity(self.id(), "input", self.in_degree(), inputs.len())?;
        let outputs = self.stage.transform(ctx, &self.parameters, inputs).await?;
        check_arity(self.id(), "output", self.out_degree(), outputs.len())?;
        Ok(outputs)
    }
}
