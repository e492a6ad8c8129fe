//! Maximax: the optimist's criterion. Chance nodes propagate their best
//! branch and Decision nodes take the largest.

use crate::models::RuleId;
use crate::objective::rule::{ChanceAggregation, DecisionSelection, ObjectiveRule};

#[derive(Debug, Clone, Copy, Default)]
pub struct MaxiMax;

impl ObjectiveRule for MaxiMax {
    fn id(&self) -> RuleId {
        RuleId::MaxiMax
    }

    fn chance_aggregation(&self) -> ChanceAggregation {
        ChanceAggregation::Maximum
    }

    fn decision_selection(&self) -> DecisionSelection {
        DecisionSelection::Maximize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Number;
    use crate::models::{DataModel, EdgeId, NodeKind, RuleSlots};
    use crate::objective::evaluation::eval_expressions_for_node;

    fn slots(model: &DataModel, edge: EdgeId) -> RuleSlots {
        model.edge(edge).unwrap().computed().rule(RuleId::MaxiMax).clone()
    }

    #[test]
    fn test_best_best_case() {
        // a: {0, 100}, b: {30, 40}, probabilities are irrelevant
        let mut model = DataModel::new();
        let root = model.add_node(NodeKind::Decision, "root");
        let chance_a = model.add_node(NodeKind::Chance, "a");
        let chance_b = model.add_node(NodeKind::Chance, "b");
        let edge_a = model.add_edge(root, chance_a).unwrap();
        let edge_b = model.add_edge(root, chance_b).unwrap();
        let leaves = [("a_low", "0"), ("a_high", "100"), ("b_low", "30"), ("b_high", "40")];
        let mut edges = Vec::new();
        for (i, (name, payoff)) in leaves.iter().enumerate() {
            let parent = if i < 2 { chance_a } else { chance_b };
            let probability = if i % 2 == 0 { "0.9" } else { "#" };
            let leaf = model.add_terminal(*name, *payoff);
            edges.push(model.connect(parent, leaf, None, Some(probability)).unwrap());
        }
        let (a_low, a_high) = (edges[0], edges[1]);
        eval_expressions_for_node(&mut model, root, true, true, false).unwrap();

        let rule = MaxiMax;
        let payoff = rule.compute_payoff(&mut model, root).unwrap();
        rule.compute_optimal(&mut model, root).unwrap();

        assert_eq!(payoff, Some(Number::from_integer(100)));
        assert_eq!(slots(&model, edge_a).optimal, Some(true));
        assert_eq!(slots(&model, edge_b).optimal, Some(false));
        assert_eq!(slots(&model, a_low).probability, Some(Number::from_integer(0)));
        assert_eq!(slots(&model, a_high).probability, Some(Number::from_integer(1)));
    }
}
