//! Tree nodes
//!
//! A node is a Decision point, a Chance point or a Terminal payoff. Nodes are
//! owned by the [`DataModel`](crate::models::DataModel) arena and referenced
//! by [`NodeId`].

use crate::expression::{EvalError, Scope};
use crate::models::computed::ComputedValues;
use crate::models::edge::EdgeId;
use crate::models::errors::ProbabilityError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Arena handle for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The analyst picks one outgoing edge
    Decision,
    /// Nature picks an outgoing edge by probability
    Chance,
    /// Leaf carrying a payoff
    Terminal,
}

#[derive(Debug, Clone)]
pub struct Node {
    uuid: Uuid,
    name: String,
    kind: NodeKind,
    pub(crate) parent_edge: Option<EdgeId>,
    pub(crate) child_edges: Vec<EdgeId>,

    /// Literal or expression payoff (Terminal only)
    payoff: Option<String>,

    /// Statements binding variables into this node's scope
    code: Option<String>,

    pub(crate) scope: Option<Scope>,
    pub(crate) computed: ComputedValues,

    pub(crate) code_error: Option<EvalError>,
    pub(crate) payoff_error: Option<EvalError>,
    pub(crate) distribution_error: Option<ProbabilityError>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            kind,
            parent_edge: None,
            child_edges: Vec::new(),
            payoff: None,
            code: None,
            scope: None,
            computed: ComputedValues::default(),
            code_error: None,
            payoff_error: None,
            distribution_error: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_decision(&self) -> bool {
        self.kind == NodeKind::Decision
    }

    pub fn is_chance(&self) -> bool {
        self.kind == NodeKind::Chance
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == NodeKind::Terminal
    }

    pub fn parent_edge(&self) -> Option<EdgeId> {
        self.parent_edge
    }

    pub fn child_edges(&self) -> &[EdgeId] {
        &self.child_edges
    }

    pub fn payoff(&self) -> Option<&str> {
        self.payoff.as_deref()
    }

    pub fn set_payoff(&mut self, payoff: Option<String>) {
        self.payoff = payoff;
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn set_code(&mut self, code: Option<String>) {
        self.code = code;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Variables visible to this node's expressions, once evaluated
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    pub fn computed(&self) -> &ComputedValues {
        &self.computed
    }

    /// Last error from this node's code block
    pub fn code_error(&self) -> Option<&EvalError> {
        self.code_error.as_ref()
    }

    /// Last error from a Terminal node's payoff expression
    pub fn payoff_error(&self) -> Option<&EvalError> {
        self.payoff_error.as_ref()
    }

    /// Set when a Chance node's probabilities could not be reconciled
    pub fn distribution_error(&self) -> Option<&ProbabilityError> {
        self.distribution_error.as_ref()
    }

    pub fn has_errors(&self) -> bool {
        self.code_error.is_some() || self.payoff_error.is_some() || self.distribution_error.is_some()
    }

    pub(crate) fn clear_computed_values(&mut self) {
        self.computed.clear();
        self.payoff_error = None;
        self.distribution_error = None;
    }
}
