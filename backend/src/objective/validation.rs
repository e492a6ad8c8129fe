// Tree Validation
//
// Post-evaluation checks that report every problem in one pass:
// - Code block errors (global and per node)
// - Payoff errors (terminal and edge)
// - Probability errors and invalid distributions
// - Distributions that resolve but do not sum to exactly 1
// - Individual probabilities outside [0, 1]
// - Decision/Chance nodes without children
// - Rule payoffs that could not be computed (arithmetic overflow)
//
// Recomputation itself never fails on these; validation exists so a host can
// surface them.

use crate::expression::{EvalError, Number, NumberError};
use crate::models::{ComputedValues, DataModel, EdgeId, NodeId, NodeKind, ProbabilityError, RuleId};
use thiserror::Error;

/// Validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Global code failed: {0}")]
    GlobalCode(EvalError),

    #[error("Code of node {node:?} failed: {error}")]
    NodeCode { node: NodeId, error: EvalError },

    #[error("Payoff of node {node:?} failed: {error}")]
    NodePayoff { node: NodeId, error: EvalError },

    #[error("Payoff of edge {edge:?} failed: {error}")]
    EdgePayoff { edge: EdgeId, error: EvalError },

    #[error("Probability of edge {edge:?} is invalid: {error}")]
    EdgeProbability { edge: EdgeId, error: ProbabilityError },

    #[error("Distribution of node {node:?} is invalid: {error}")]
    InvalidDistribution { node: NodeId, error: ProbabilityError },

    #[error("Probabilities of node {node:?} sum to {sum}, not 1")]
    IncompleteDistribution { node: NodeId, sum: Number },

    #[error("Probability {value} of edge {edge:?} is outside [0, 1]")]
    ProbabilityOutOfRange { edge: EdgeId, value: Number },

    #[error("Node {0:?} has no children")]
    MissingChildren(NodeId),

    #[error("Payoff of node {node:?} under {} failed: {error}", .rule.name())]
    RulePayoff {
        node: NodeId,
        rule: RuleId,
        error: NumberError,
    },

    #[error("Branch value of edge {edge:?} under {} failed: {error}", .rule.name())]
    RuleBranchValue {
        edge: EdgeId,
        rule: RuleId,
        error: NumberError,
    },
}

/// Validation result
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// True iff `value` lies in [0, 1]
pub fn validate_probability(value: Number) -> bool {
    value >= Number::ZERO && value <= Number::ONE
}

/// Validate an evaluated model
///
/// Reads the diagnostics and base slots written by the expression driver, so
/// run it after `ObjectiveRulesManager::eval_expressions` or a recomputation
/// with expression re-evaluation. Rule payoff failures are reported for the
/// rules that have been run.
///
/// # Returns
///
/// Ok(()) if all checks pass, Err(errors) otherwise
pub fn validate_tree(model: &DataModel) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(error) = model.code_error() {
        errors.push(ValidationError::GlobalCode(error.clone()));
    }

    for (id, node) in model.nodes() {
        if let Some(error) = node.code_error() {
            errors.push(ValidationError::NodeCode {
                node: id,
                error: error.clone(),
            });
        }
        if let Some(error) = node.payoff_error() {
            errors.push(ValidationError::NodePayoff {
                node: id,
                error: error.clone(),
            });
        }
        if node.kind() != NodeKind::Terminal && node.child_edges().is_empty() {
            errors.push(ValidationError::MissingChildren(id));
        }
        if node.kind() == NodeKind::Chance {
            validate_distribution(model, id, &mut errors);
        }
        for (rule, error) in rule_errors(node.computed()) {
            errors.push(ValidationError::RulePayoff {
                node: id,
                rule,
                error,
            });
        }
    }

    for edge_id in model.edge_ids() {
        let Ok(edge) = model.edge(edge_id) else {
            continue;
        };
        if let Some(error) = edge.payoff_error() {
            errors.push(ValidationError::EdgePayoff {
                edge: edge_id,
                error: error.clone(),
            });
        }
        if let Some(error) = edge.probability_error() {
            errors.push(ValidationError::EdgeProbability {
                edge: edge_id,
                error: error.clone(),
            });
        }
        for (rule, error) in rule_errors(edge.computed()) {
            errors.push(ValidationError::RuleBranchValue {
                edge: edge_id,
                rule,
                error,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn rule_errors(computed: &ComputedValues) -> Vec<(RuleId, NumberError)> {
    RuleId::ALL
        .iter()
        .filter_map(|&rule| computed.rule(rule).error.clone().map(|error| (rule, error)))
        .collect()
}

fn validate_distribution(model: &DataModel, id: NodeId, errors: &mut Vec<ValidationError>) {
    let Ok(node) = model.node(id) else {
        return;
    };
    if let Some(error) = node.distribution_error() {
        errors.push(ValidationError::InvalidDistribution {
            node: id,
            error: error.clone(),
        });
        return;
    }
    if node.child_edges().is_empty() {
        return;
    }

    let mut sum = Number::ZERO;
    for &edge_id in node.child_edges() {
        let Ok(edge) = model.edge(edge_id) else {
            continue;
        };
        let Some(value) = edge.computed().base().probability else {
            continue;
        };
        if !validate_probability(value) {
            errors.push(ValidationError::ProbabilityOutOfRange {
                edge: edge_id,
                value,
            });
        }
        match sum.checked_add(&value) {
            Ok(total) => sum = total,
            Err(_) => return,
        }
    }
    if sum != Number::ONE {
        errors.push(ValidationError::IncompleteDistribution { node: id, sum });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::ObjectiveRulesManager;

    fn evaluated(model: &mut DataModel) {
        ObjectiveRulesManager::default()
            .eval_expressions(model, true, true, false)
            .unwrap();
    }

    #[test]
    fn test_probability_range() {
        assert!(validate_probability(Number::ZERO));
        assert!(validate_probability(Number::ONE));
        assert!(validate_probability("0.5".parse().unwrap()));
        assert!(!validate_probability("-0.1".parse().unwrap()));
        assert!(!validate_probability("1.01".parse().unwrap()));
    }

    #[test]
    fn test_complete_tree_is_valid() {
        let mut model = DataModel::new();
        let root = model.add_node(NodeKind::Chance, "root");
        let a = model.add_terminal("a", "1");
        let b = model.add_terminal("b", "2");
        model.connect(root, a, None, Some("0.25")).unwrap();
        model.connect(root, b, None, Some("#")).unwrap();
        evaluated(&mut model);
        assert_eq!(validate_tree(&model), Ok(()));
    }

    #[test]
    fn test_incomplete_distribution_reported() {
        let mut model = DataModel::new();
        let root = model.add_node(NodeKind::Chance, "root");
        let a = model.add_terminal("a", "1");
        model.connect(root, a, None, Some("0.5")).unwrap();
        evaluated(&mut model);
        assert_eq!(
            validate_tree(&model),
            Err(vec![ValidationError::IncompleteDistribution {
                node: root,
                sum: "0.5".parse().unwrap(),
            }])
        );
    }

    #[test]
    fn test_collects_every_problem() {
        let mut model = DataModel::new();
        model.set_code(Some("broken = ".to_string()));
        let root = model.add_node(NodeKind::Decision, "root");
        let empty = model.add_node(NodeKind::Chance, "empty");
        let leaf = model.add_terminal("leaf", "unknown + 1");
        model.add_edge(root, empty).unwrap();
        model.add_edge(root, leaf).unwrap();
        evaluated(&mut model);

        let errors = validate_tree(&model).unwrap_err();
        assert!(matches!(errors[0], ValidationError::GlobalCode(_)));
        assert!(errors.contains(&ValidationError::MissingChildren(empty)));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::NodePayoff { node, error: EvalError::UndefinedVariable(_) } if *node == leaf
        )));
    }
}
