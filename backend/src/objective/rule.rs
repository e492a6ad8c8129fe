//! Objective rule abstraction
//!
//! A rule is an optimization criterion: how branch values aggregate through
//! Chance nodes and how the best branch is chosen at Decision nodes. The six
//! registered rules differ only in those two choices, so the traversal itself
//! lives here as default trait methods.
//!
//! # Two passes
//!
//! Rules always run [`ObjectiveRule::compute_payoff`] (post-order) before
//! [`ObjectiveRule::compute_optimal`] (pre-order). The second pass reads the
//! payoffs written by the first, so the order is required.
//!
//! # Branch values
//!
//! Taking an edge is worth `edge payoff + child payoff`; that branch value is
//! what Decision nodes compare and what the range rules fold at Chance nodes.
//! The expectation at a Chance node weights only the child payoff:
//! `Σ (probability × child payoff + edge payoff)`. Missing payoffs and
//! unresolved probabilities count as zero.
//!
//! Each rule writes into its own [`RuleSlots`](crate::models::RuleSlots), so
//! rules never overwrite one another. An arithmetic overflow leaves the
//! affected payoff absent and is recorded in that slot's `error`; the pass
//! carries on with the rest of the tree.

use crate::expression::{Number, NumberError};
use crate::models::{DataModel, EdgeId, NodeId, NodeKind, RuleId, RuleSlots};
use crate::objective::manager::ManagerError;
use tracing::debug;

/// How a Chance node folds its branch values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanceAggregation {
    /// Probability-weighted sum
    Expectation,
    /// Worst case: smallest branch value
    Minimum,
    /// Best case: largest branch value
    Maximum,
}

/// Which branch a Decision node takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSelection {
    Maximize,
    Minimize,
}

impl DecisionSelection {
    fn prefers(self, candidate: Number, current: Number) -> bool {
        match self {
            DecisionSelection::Maximize => candidate > current,
            DecisionSelection::Minimize => candidate < current,
        }
    }
}

/// Optimization criterion evaluated over a subtree
///
/// Implementors only declare their identity and their two semantics; the
/// default methods do the traversal.
///
/// # Example
///
/// ```rust
/// use decision_tree_core_rs::models::{DataModel, NodeKind};
/// use decision_tree_core_rs::objective::{ExpectedValueMaximization, ObjectiveRule};
/// use decision_tree_core_rs::objective::eval_expressions_for_node;
///
/// let mut model = DataModel::new();
/// let root = model.add_node(NodeKind::Decision, "invest?");
/// let yes = model.add_terminal("yes", "10");
/// let no = model.add_terminal("no", "-5");
/// model.add_edge(root, yes).unwrap();
/// model.add_edge(root, no).unwrap();
/// eval_expressions_for_node(&mut model, root, true, true, false).unwrap();
///
/// let rule = ExpectedValueMaximization;
/// let payoff = rule.compute_payoff(&mut model, root).unwrap();
/// rule.compute_optimal(&mut model, root).unwrap();
/// assert_eq!(payoff.and_then(|p| p.to_i64()), Some(10));
/// ```
pub trait ObjectiveRule: Send + Sync {
    fn id(&self) -> RuleId;

    fn chance_aggregation(&self) -> ChanceAggregation;

    fn decision_selection(&self) -> DecisionSelection;

    /// Registered rule name
    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Post-order pass: write this rule's payoff on every node and edge of
    /// the subtree and return the payoff of `node`
    fn compute_payoff(
        &self,
        model: &mut DataModel,
        node: NodeId,
    ) -> Result<Option<Number>, ManagerError> {
        let rule = self.id();

        // Reverse pre-order visits every child before its parent
        for id in model.get_all_nodes_in_subtree(node)?.into_iter().rev() {
            let current = model.node(id)?;
            let kind = current.kind();
            let declared = current.computed().base().payoff;
            let edges: Vec<EdgeId> = current.child_edges().to_vec();

            if kind == NodeKind::Terminal {
                let slots = model.node_mut(id)?.computed.rule_mut(rule);
                slots.payoff = Some(declared.unwrap_or(Number::ZERO));
                slots.error = None;
                continue;
            }

            let mut branches = Vec::with_capacity(edges.len());
            for edge_id in edges {
                let child = model.edge(edge_id)?.child();
                let child_payoff = model
                    .node(child)?
                    .computed()
                    .rule(rule)
                    .payoff
                    .unwrap_or(Number::ZERO);
                let edge = model.edge_mut(edge_id)?;
                let edge_payoff = edge.computed().base().payoff.unwrap_or(Number::ZERO);
                let probability = edge.computed().base().probability;
                let value = record(
                    edge.computed.rule_mut(rule),
                    child_payoff.checked_add(&edge_payoff),
                );
                branches.push(Branch {
                    child: child_payoff,
                    edge: edge_payoff,
                    value,
                    probability,
                });
            }

            let payoff = match kind {
                NodeKind::Chance => aggregate_chance(self.chance_aggregation(), &branches),
                _ => Ok(select_branch(self.decision_selection(), &branch_values(&branches))
                    .map_or(Number::ZERO, |(_, value)| value)),
            };
            if let Err(e) = &payoff {
                debug!(node = id.index(), rule = rule.name(), error = %e, "payoff aggregation failed");
            }
            record(model.node_mut(id)?.computed.rule_mut(rule), payoff);
        }

        Ok(model.node(node)?.computed().rule(rule).payoff)
    }

    /// Pre-order pass: mark the optimal edge at every Decision node, the
    /// optimal path from `node`, and each edge's pseudo-probability
    fn compute_optimal(&self, model: &mut DataModel, node: NodeId) -> Result<(), ManagerError> {
        mark_optimal(self, model, node)
    }
}

/// One outgoing edge as seen by aggregation
#[derive(Debug, Clone, Copy)]
struct Branch {
    child: Number,
    edge: Number,
    /// `child + edge`; absent when the sum overflowed
    value: Option<Number>,
    probability: Option<Number>,
}

/// Store an arithmetic result in a rule slot and return the payoff written
fn record(
    slots: &mut RuleSlots,
    result: Result<Number, NumberError>,
) -> Option<Number> {
    match result {
        Ok(value) => {
            slots.payoff = Some(value);
            slots.error = None;
        }
        Err(e) => {
            slots.payoff = None;
            slots.error = Some(e);
        }
    }
    slots.payoff
}

fn branch_values(branches: &[Branch]) -> Vec<Number> {
    branches
        .iter()
        .map(|branch| branch.value.unwrap_or(Number::ZERO))
        .collect()
}

fn aggregate_chance(
    aggregation: ChanceAggregation,
    branches: &[Branch],
) -> Result<Number, NumberError> {
    let values = branch_values(branches);
    let payoff = match aggregation {
        ChanceAggregation::Expectation => {
            let mut sum = Number::ZERO;
            for branch in branches {
                let weight = branch.probability.unwrap_or(Number::ZERO);
                let term = branch.child.checked_mul(&weight)?.checked_add(&branch.edge)?;
                sum = sum.checked_add(&term)?;
            }
            sum
        }
        ChanceAggregation::Minimum => values.into_iter().min().unwrap_or(Number::ZERO),
        ChanceAggregation::Maximum => values.into_iter().max().unwrap_or(Number::ZERO),
    };
    Ok(payoff)
}

/// First value (declaration order) that the selection prefers over all others
fn select_branch(selection: DecisionSelection, values: &[Number]) -> Option<(usize, Number)> {
    let mut best: Option<(usize, Number)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if !selection.prefers(value, current) => {}
            _ => best = Some((index, value)),
        }
    }
    best
}

fn mark_optimal<R: ObjectiveRule + ?Sized>(
    rule: &R,
    model: &mut DataModel,
    root: NodeId,
) -> Result<(), ManagerError> {
    let id = rule.id();
    let mut stack = vec![(root, true)];

    while let Some((node, on_path)) = stack.pop() {
        let current = model.node_mut(node)?;
        current.computed.rule_mut(id).optimal = Some(on_path);
        let kind = current.kind();
        let edges: Vec<EdgeId> = current.child_edges().to_vec();

        // Decision choice, or the first extreme branch of a range rule
        let selection = match (kind, rule.chance_aggregation()) {
            (NodeKind::Decision, _) => Some(rule.decision_selection()),
            (NodeKind::Chance, ChanceAggregation::Minimum) => Some(DecisionSelection::Minimize),
            (NodeKind::Chance, ChanceAggregation::Maximum) => Some(DecisionSelection::Maximize),
            _ => None,
        };
        let chosen = match selection {
            Some(selection) => {
                let mut values = Vec::with_capacity(edges.len());
                for &edge_id in &edges {
                    let payoff = model.edge(edge_id)?.computed().rule(id).payoff;
                    values.push(payoff.unwrap_or(Number::ZERO));
                }
                select_branch(selection, &values).map(|(index, _)| index)
            }
            None => None,
        };

        let mut children = Vec::with_capacity(edges.len());
        for (index, edge_id) in edges.into_iter().enumerate() {
            let edge = model.edge_mut(edge_id)?;
            let is_chosen = chosen == Some(index);
            let pseudo = Some(if is_chosen { Number::ONE } else { Number::ZERO });
            // (edge optimal, edge probability, child on the optimal path)
            let (optimal, probability, child_on_path) = match kind {
                NodeKind::Decision => (is_chosen, pseudo, on_path && is_chosen),
                _ if selection.is_none() => (on_path, edge.computed().base().probability, on_path),
                _ => (on_path, pseudo, on_path),
            };
            let slots = edge.computed.rule_mut(id);
            slots.optimal = Some(optimal);
            slots.probability = probability;
            children.push((edge.child(), child_on_path));
        }
        stack.extend(children.into_iter().rev());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(value: i64) -> Number {
        Number::from_integer(value)
    }

    fn branch(child: i64, edge: i64, probability: Option<Number>) -> Branch {
        Branch {
            child: n(child),
            edge: n(edge),
            value: Some(n(child + edge)),
            probability,
        }
    }

    #[test]
    fn test_select_branch_first_best_wins() {
        let values = vec![n(3), n(7), n(7), n(1)];
        assert_eq!(
            select_branch(DecisionSelection::Maximize, &values),
            Some((1, n(7)))
        );
        assert_eq!(
            select_branch(DecisionSelection::Minimize, &values),
            Some((3, n(1)))
        );
        assert_eq!(select_branch(DecisionSelection::Maximize, &[]), None);
    }

    #[test]
    fn test_expectation_adds_edge_payoff_unweighted() {
        let half = Number::new(1, 2).unwrap();
        let branches = vec![branch(10, 4, Some(half)), branch(20, 4, Some(half))];
        // 0.5 * 10 + 4 + 0.5 * 20 + 4
        assert_eq!(
            aggregate_chance(ChanceAggregation::Expectation, &branches).unwrap(),
            n(23)
        );
    }

    #[test]
    fn test_expectation_treats_unresolved_probability_as_zero() {
        let half = Number::new(1, 2).unwrap();
        let branches = vec![branch(10, 0, Some(half)), branch(100, 0, None)];
        assert_eq!(
            aggregate_chance(ChanceAggregation::Expectation, &branches).unwrap(),
            n(5)
        );
    }

    #[test]
    fn test_range_aggregation_ignores_probability() {
        let branches = vec![
            branch(-2, 0, Some(Number::ONE)),
            branch(5, 4, Some(Number::ZERO)),
        ];
        assert_eq!(
            aggregate_chance(ChanceAggregation::Minimum, &branches).unwrap(),
            n(-2)
        );
        assert_eq!(
            aggregate_chance(ChanceAggregation::Maximum, &branches).unwrap(),
            n(9)
        );
        assert_eq!(
            aggregate_chance(ChanceAggregation::Maximum, &[]).unwrap(),
            Number::ZERO
        );
    }

    #[test]
    fn test_expectation_overflow_is_an_error() {
        let big = Number::new(i128::MAX, 1).unwrap();
        let branches = vec![Branch {
            child: big,
            edge: Number::ONE,
            value: None,
            probability: Some(Number::ONE),
        }];
        assert_eq!(
            aggregate_chance(ChanceAggregation::Expectation, &branches),
            Err(NumberError::Overflow)
        );
    }

    #[test]
    fn test_record_clears_previous_error() {
        let mut slots = RuleSlots::default();
        assert_eq!(record(&mut slots, Err(NumberError::Overflow)), None);
        assert_eq!(slots.error, Some(NumberError::Overflow));
        assert_eq!(record(&mut slots, Ok(n(4))), Some(n(4)));
        assert_eq!(slots.error, None);
    }
}
