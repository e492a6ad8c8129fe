//! Maximin: assume nature plays against you at every Chance node, then pick
//! the branch whose worst case is best. Probabilities are ignored.

use crate::models::RuleId;
use crate::objective::rule::{ChanceAggregation, DecisionSelection, ObjectiveRule};

#[derive(Debug, Clone, Copy, Default)]
pub struct MaxiMin;

impl ObjectiveRule for MaxiMin {
    fn id(&self) -> RuleId {
        RuleId::MaxiMin
    }

    fn chance_aggregation(&self) -> ChanceAggregation {
        ChanceAggregation::Minimum
    }

    fn decision_selection(&self) -> DecisionSelection {
        DecisionSelection::Maximize
    }
}
