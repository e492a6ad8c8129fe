//! Tree validation and snapshots
//!
//! validate_tree reports every problem left behind by an evaluation pass;
//! recomputation itself never fails on them.

mod common;

use common::{init_test_logging, model_from_json, num, single_root};
use decision_tree_core_rs::models::{DataModel, NodeKind};
use decision_tree_core_rs::objective::{
    compute_snapshot_hash, validate_probability, validate_tree, ComputedSnapshot,
    ObjectiveRulesManager, ProbabilityError, ValidationError,
};
use decision_tree_core_rs::EvalError;

fn recomputed(json: &str) -> DataModel {
    let mut model = model_from_json(json);
    ObjectiveRulesManager::default()
        .recompute(&mut model, true, true)
        .unwrap();
    model
}

// ============================================================================
// Test 1: Probability values
// ============================================================================

#[test]
fn test_probability_validator_bounds() {
    init_test_logging();
    assert!(validate_probability(num("0")));
    assert!(validate_probability(num("1")));
    assert!(validate_probability(num("0.999")));
    assert!(!validate_probability(num("1.001")));
    assert!(!validate_probability(num("-0.001")));
}

// ============================================================================
// Test 2: Tree checks
// ============================================================================

#[test]
fn test_valid_tree_passes() {
    let model = recomputed(
        r##"{
      "roots": [{
        "type": "decision",
        "children": [
          {"child": {"type": "chance", "children": [
            {"probability": "1/3", "child": {"type": "terminal", "payoff": 3}},
            {"probability": "#", "child": {"type": "terminal", "payoff": 6}}
          ]}},
          {"child": {"type": "terminal", "payoff": 1}}
        ]
      }]
    }"##,
    );
    assert_eq!(validate_tree(&model), Ok(()));
}

#[test]
fn test_incomplete_distribution_is_reported() {
    let model = recomputed(
        r#"{
      "roots": [{
        "type": "chance",
        "children": [
          {"probability": 0.2, "child": {"type": "terminal", "payoff": 1}},
          {"probability": 0.3, "child": {"type": "terminal", "payoff": 2}}
        ]
      }]
    }"#,
    );
    let root = single_root(&model);
    assert_eq!(
        validate_tree(&model),
        Err(vec![ValidationError::IncompleteDistribution {
            node: root,
            sum: num("0.5"),
        }])
    );
}

#[test]
fn test_out_of_range_probability_with_valid_sum() {
    let model = recomputed(
        r#"{
      "roots": [{
        "type": "chance",
        "children": [
          {"probability": 1.5, "child": {"type": "terminal", "payoff": 1}},
          {"probability": -0.5, "child": {"type": "terminal", "payoff": 2}}
        ]
      }]
    }"#,
    );
    let errors = validate_tree(&model).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ValidationError::ProbabilityOutOfRange { .. })));
}

#[test]
fn test_reports_all_problem_kinds() {
    let model = recomputed(
        r##"{
      "roots": [{
        "type": "decision",
        "code": "a = ",
        "children": [
          {"payoff": "1 / 0", "child": {"type": "chance", "children": [
            {"probability": 0.9, "child": {"type": "terminal", "payoff": 1}},
            {"probability": 0.3, "child": {"type": "terminal", "payoff": 2}},
            {"probability": "#", "child": {"type": "terminal", "payoff": 3}}
          ]}},
          {"child": {"type": "decision"}}
        ]
      }]
    }"##,
    );
    let errors = validate_tree(&model).unwrap_err();

    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::NodeCode { error, .. } if error.is_syntax())));
    assert!(errors.iter().any(|e| matches!(
        e,
        ValidationError::EdgePayoff {
            error: EvalError::DivisionByZero,
            ..
        }
    )));
    assert!(errors.iter().any(|e| matches!(
        e,
        ValidationError::InvalidDistribution {
            error: ProbabilityError::SumOutOfRange { .. },
            ..
        }
    )));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::MissingChildren(_))));
}

#[test]
fn test_assignment_probability_is_reported() {
    let mut model = DataModel::new();
    let root = model.add_node(NodeKind::Chance, "root");
    let a = model.add_terminal("a", "1");
    let b = model.add_terminal("b", "2");
    let bad = model.connect(root, a, None, Some("p = 1")).unwrap();
    model.connect(root, b, None, Some("#")).unwrap();
    ObjectiveRulesManager::default()
        .recompute(&mut model, true, true)
        .unwrap();

    let errors = validate_tree(&model).unwrap_err();
    assert!(errors.contains(&ValidationError::EdgeProbability {
        edge: bad,
        error: ProbabilityError::AssignmentExpression("p = 1".to_string()),
    }));
}

// ============================================================================
// Test 3: Snapshots
// ============================================================================

#[test]
fn test_snapshot_lists_errors_and_slots() {
    let model = recomputed(
        r#"{
      "roots": [{
        "type": "chance",
        "children": [
          {"probability": "q", "child": {"type": "terminal", "payoff": 1}}
        ]
      }]
    }"#,
    );
    let snapshot = ComputedSnapshot::capture(&model);
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.edges.len(), 1);
    assert!(snapshot.edges[0].errors[0].starts_with("probability:"));
    assert!(snapshot.nodes[0].errors[0].starts_with("distribution:"));

    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"expected-value-maximization\""));
    assert_eq!(compute_snapshot_hash(&snapshot).unwrap().len(), 64);
}
