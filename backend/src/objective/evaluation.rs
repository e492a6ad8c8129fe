// Tree Evaluation Driver
//
// Top-down, rule-agnostic walk that rebuilds expression scopes, runs node
// code blocks and fills the base `payoff`/`probability` slots every rule
// consumes. Failures are recorded on the node or edge that caused them and
// never stop the walk.

use crate::expression::{
    evaluate_number, execute_code, has_assignment_expression, is_auto_placeholder, Number, Scope,
};
use crate::models::{DataModel, EdgeId, ModelError, NodeId, NodeKind, ProbabilityError};
use tracing::{debug, warn};

/// Evaluate the document-level code block into a fresh global scope
pub fn eval_global_code(model: &mut DataModel) {
    let mut scope = Scope::new();
    model.code_error = None;
    if let Some(code) = model.code().map(str::to_string) {
        if let Err(e) = execute_code(&code, &mut scope) {
            debug!(error = %e, "global code failed");
            model.code_error = Some(e);
        }
    }
    model.expression_scope = scope;
}

/// Walk the subtree rooted at `node`
///
/// Nodes are visited parent before children, in edge declaration order. The
/// walk keeps its own stack, so tree depth is bounded only by memory.
///
/// # Arguments
///
/// * `eval_code` - Re-run code blocks (implies rebuilding scopes)
/// * `eval_numeric` - Re-evaluate payoff and probability expressions
/// * `init_scope` - Rebuild scopes even when `eval_code` is false
pub fn eval_expressions_for_node(
    model: &mut DataModel,
    node: NodeId,
    eval_code: bool,
    eval_numeric: bool,
    init_scope: bool,
) -> Result<(), ModelError> {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if model.node(current)?.scope.is_none() || init_scope || eval_code {
            init_scope_for_node(model, current)?;
        }

        if eval_code {
            run_node_code(model, current)?;
        }

        if eval_numeric {
            eval_numeric_fields(model, current)?;
        }

        let children = child_nodes(model, current)?;
        stack.extend(children.into_iter().rev());
    }
    Ok(())
}

/// Seed a node's scope from its parent node (or the global scope for a root)
fn init_scope_for_node(model: &mut DataModel, node: NodeId) -> Result<(), ModelError> {
    let seeded = match model.parent_node(node) {
        Some(parent) => match &model.node(parent)?.scope {
            Some(parent_scope) => parent_scope.child(),
            None => model.expression_scope.child(),
        },
        None => model.expression_scope.child(),
    };
    model.node_mut(node)?.scope = Some(seeded);
    Ok(())
}

fn run_node_code(model: &mut DataModel, node: NodeId) -> Result<(), ModelError> {
    let target = model.node_mut(node)?;
    target.code_error = None;
    let Some(code) = target.code().map(str::to_string) else {
        return Ok(());
    };
    let scope = target.scope.get_or_insert_with(Scope::new);
    if let Err(e) = execute_code(&code, scope) {
        debug!(node = node.index(), error = %e, "node code failed");
        target.code_error = Some(e);
    }
    Ok(())
}

fn child_nodes(model: &DataModel, node: NodeId) -> Result<Vec<NodeId>, ModelError> {
    model
        .node(node)?
        .child_edges()
        .iter()
        .map(|&edge| model.edge(edge).map(|e| e.child()))
        .collect()
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty()).map(str::to_string)
}

fn eval_numeric_fields(model: &mut DataModel, node: NodeId) -> Result<(), ModelError> {
    let current = model.node(node)?;
    let scope = current.scope.clone().unwrap_or_default();
    let kind = current.kind();
    let edges: Vec<EdgeId> = current.child_edges().to_vec();

    if kind == NodeKind::Terminal {
        let payoff = non_empty(current.payoff());
        let target = model.node_mut(node)?;
        target.payoff_error = None;
        target.computed.base_mut().payoff = None;
        if let Some(source) = payoff {
            match evaluate_number(&source, &scope) {
                Ok(value) => target.computed.base_mut().payoff = Some(value),
                Err(e) => target.payoff_error = Some(e),
            }
        }
        return Ok(());
    }

    // Edge payoffs: evaluated in this (the parent's) scope, failures are per edge
    for &edge_id in &edges {
        let edge = model.edge_mut(edge_id)?;
        edge.payoff_error = None;
        edge.computed.base_mut().payoff = None;
        if let Some(source) = non_empty(edge.payoff()) {
            match evaluate_number(&source, &scope) {
                Ok(value) => edge.computed.base_mut().payoff = Some(value),
                Err(e) => edge.payoff_error = Some(e),
            }
        }
    }

    if kind == NodeKind::Chance {
        resolve_probabilities(model, node, &edges, &scope)?;
    }
    Ok(())
}

/// Evaluate explicit probabilities and split the residual among `#` edges
fn resolve_probabilities(
    model: &mut DataModel,
    node: NodeId,
    edges: &[EdgeId],
    scope: &Scope,
) -> Result<(), ModelError> {
    let mut sum = Number::ZERO;
    let mut auto_edges = Vec::new();
    let mut invalid_count = 0usize;

    for &edge_id in edges {
        let edge = model.edge_mut(edge_id)?;
        edge.probability_error = None;
        edge.computed.base_mut().probability = None;

        let Some(source) = non_empty(edge.probability()) else {
            edge.probability_error = Some(ProbabilityError::Missing);
            invalid_count += 1;
            continue;
        };

        if is_auto_placeholder(&source) {
            auto_edges.push(edge_id);
            continue;
        }

        if has_assignment_expression(&source) {
            warn!(edge = edge_id.index(), probability = %source, "assignment in probability expression");
            edge.probability_error = Some(ProbabilityError::AssignmentExpression(source));
            continue;
        }

        match evaluate_number(&source, scope) {
            Ok(probability) => {
                edge.computed.base_mut().probability = Some(probability);
                match sum.checked_add(&probability) {
                    Ok(total) => sum = total,
                    Err(e) => {
                        edge.probability_error = Some(ProbabilityError::Evaluation(e.into()));
                        invalid_count += 1;
                    }
                }
            }
            Err(e) => {
                edge.probability_error = Some(ProbabilityError::Evaluation(e));
                invalid_count += 1;
            }
        }
    }

    let in_range = sum >= Number::ZERO && sum <= Number::ONE;
    let target = model.node_mut(node)?;
    target.distribution_error = if invalid_count > 0 {
        Some(ProbabilityError::InvalidEdges {
            count: invalid_count,
        })
    } else if !in_range {
        Some(ProbabilityError::SumOutOfRange { sum })
    } else {
        None
    };

    if auto_edges.is_empty() || invalid_count > 0 || !in_range {
        return Ok(());
    }

    let residual = Number::ONE
        .checked_sub(&sum)
        .and_then(|rest| rest.checked_div(&Number::from_integer(auto_edges.len() as i64)));
    match residual {
        Ok(share) => {
            for edge_id in auto_edges {
                model.edge_mut(edge_id)?.computed.base_mut().probability = Some(share);
            }
        }
        Err(e) => {
            model.node_mut(node)?.distribution_error =
                Some(ProbabilityError::Evaluation(e.into()));
        }
    }
    Ok(())
}
