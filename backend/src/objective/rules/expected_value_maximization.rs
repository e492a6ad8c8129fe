//! Expected-value maximization
//!
//! The classic criterion: Chance nodes take the probability-weighted sum of
//! their branches, Decision nodes take the branch with the largest value.
//! This is the default rule.

use crate::models::RuleId;
use crate::objective::rule::{ChanceAggregation, DecisionSelection, ObjectiveRule};

/// Maximize expected payoff
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedValueMaximization;

impl ObjectiveRule for ExpectedValueMaximization {
    fn id(&self) -> RuleId {
        RuleId::ExpectedValueMaximization
    }

    fn chance_aggregation(&self) -> ChanceAggregation {
        ChanceAggregation::Expectation
    }

    fn decision_selection(&self) -> DecisionSelection {
        DecisionSelection::Maximize
    }
}
