//! Expected-value minimization
//!
//! Same aggregation as maximization, but Decision nodes take the smallest
//! branch. Used when payoffs are costs.

use crate::models::RuleId;
use crate::objective::rule::{ChanceAggregation, DecisionSelection, ObjectiveRule};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedValueMinimization;

impl ObjectiveRule for ExpectedValueMinimization {
    fn id(&self) -> RuleId {
        RuleId::ExpectedValueMinimization
    }

    fn chance_aggregation(&self) -> ChanceAggregation {
        ChanceAggregation::Expectation
    }

    fn decision_selection(&self) -> DecisionSelection {
        DecisionSelection::Minimize
    }
}
