// Computed-Value Snapshot
//
// Ordered, serializable copy of every computed slot and diagnostic in a
// model, plus a canonical SHA-256 fingerprint. Two passes that produce the
// same slots produce the same hash.

use crate::models::{BaseSlots, DataModel, EdgeId, NodeId, NodeKind, RuleId, RuleSlots};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub base: BaseSlots,
    /// Keyed by rule name
    pub rules: BTreeMap<&'static str, RuleSlots>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSnapshot {
    pub id: EdgeId,
    pub parent: NodeId,
    pub child: NodeId,
    pub base: BaseSlots,
    pub rules: BTreeMap<&'static str, RuleSlots>,
    pub errors: Vec<String>,
}

fn rule_map(slot: impl Fn(RuleId) -> RuleSlots) -> BTreeMap<&'static str, RuleSlots> {
    RuleId::ALL.iter().map(|&id| (id.name(), slot(id))).collect()
}

impl ComputedSnapshot {
    /// Capture the current computed state of `model`
    pub fn capture(model: &DataModel) -> Self {
        let nodes = model
            .nodes()
            .map(|(id, node)| {
                let errors = [
                    node.code_error().map(|e| format!("code: {}", e)),
                    node.payoff_error().map(|e| format!("payoff: {}", e)),
                    node.distribution_error().map(|e| format!("distribution: {}", e)),
                ]
                .into_iter()
                .flatten()
                .collect();
                NodeSnapshot {
                    id,
                    name: node.name().to_string(),
                    kind: node.kind(),
                    base: node.computed().base().clone(),
                    rules: rule_map(|rule| node.computed().rule(rule).clone()),
                    errors,
                }
            })
            .collect();

        let edges = model
            .edges()
            .iter()
            .zip(model.edge_ids())
            .map(|(edge, id)| {
                let errors = [
                    edge.payoff_error().map(|e| format!("payoff: {}", e)),
                    edge.probability_error().map(|e| format!("probability: {}", e)),
                ]
                .into_iter()
                .flatten()
                .collect();
                EdgeSnapshot {
                    id,
                    parent: edge.parent(),
                    child: edge.child(),
                    base: edge.computed().base().clone(),
                    rules: rule_map(|rule| edge.computed().rule(rule).clone()),
                    errors,
                }
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// SHA-256 hex digest of the snapshot's JSON form
///
/// Field order is fixed by the struct definitions and rule maps are sorted,
/// so the serialization is canonical.
pub fn compute_snapshot_hash(snapshot: &ComputedSnapshot) -> Result<String, serde_json::Error> {
    let json = snapshot.to_json()?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
