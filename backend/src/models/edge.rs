//! Tree edges
//!
//! An edge connects exactly one parent node to exactly one child node and
//! carries an optional payoff expression and, under a Chance parent, a
//! probability expression (literal, expression or the `#` placeholder).

use crate::expression::EvalError;
use crate::models::computed::ComputedValues;
use crate::models::node::NodeId;
use crate::models::errors::ProbabilityError;
use serde::Serialize;
use uuid::Uuid;

/// Arena handle for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    uuid: Uuid,
    name: String,
    parent: NodeId,
    child: NodeId,
    payoff: Option<String>,
    probability: Option<String>,
    pub(crate) computed: ComputedValues,
    pub(crate) payoff_error: Option<EvalError>,
    pub(crate) probability_error: Option<ProbabilityError>,
}

impl Edge {
    pub(crate) fn new(parent: NodeId, child: NodeId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: String::new(),
            parent,
            child,
            payoff: None,
            probability: None,
            computed: ComputedValues::default(),
            payoff_error: None,
            probability_error: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn child(&self) -> NodeId {
        self.child
    }

    pub fn payoff(&self) -> Option<&str> {
        self.payoff.as_deref()
    }

    pub fn set_payoff(&mut self, payoff: Option<String>) {
        self.payoff = payoff;
    }

    pub fn probability(&self) -> Option<&str> {
        self.probability.as_deref()
    }

    pub fn set_probability(&mut self, probability: Option<String>) {
        self.probability = probability;
    }

    pub fn computed(&self) -> &ComputedValues {
        &self.computed
    }

    pub fn payoff_error(&self) -> Option<&EvalError> {
        self.payoff_error.as_ref()
    }

    pub fn probability_error(&self) -> Option<&ProbabilityError> {
        self.probability_error.as_ref()
    }

    pub(crate) fn clear_computed_values(&mut self) {
        self.computed.clear();
        self.payoff_error = None;
        self.probability_error = None;
    }
}
