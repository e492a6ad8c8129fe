//! Minimin: for cost trees, assume the cheapest outcome at every Chance
//! node and take the cheapest branch.

use crate::models::RuleId;
use crate::objective::rule::{ChanceAggregation, DecisionSelection, ObjectiveRule};

#[derive(Debug, Clone, Copy, Default)]
pub struct MiniMin;

impl ObjectiveRule for MiniMin {
    fn id(&self) -> RuleId {
        RuleId::MiniMin
    }

    fn chance_aggregation(&self) -> ChanceAggregation {
        ChanceAggregation::Minimum
    }

    fn decision_selection(&self) -> DecisionSelection {
        DecisionSelection::Minimize
    }
}
