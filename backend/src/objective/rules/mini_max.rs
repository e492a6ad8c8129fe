//! Minimax: for cost trees, assume the most expensive outcome at every
//! Chance node and take the branch whose worst case is cheapest.

use crate::models::RuleId;
use crate::objective::rule::{ChanceAggregation, DecisionSelection, ObjectiveRule};

#[derive(Debug, Clone, Copy, Default)]
pub struct MiniMax;

impl ObjectiveRule for MiniMax {
    fn id(&self) -> RuleId {
        RuleId::MiniMax
    }

    fn chance_aggregation(&self) -> ChanceAggregation {
        ChanceAggregation::Maximum
    }

    fn decision_selection(&self) -> DecisionSelection {
        DecisionSelection::Minimize
    }
}
