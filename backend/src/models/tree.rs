//! Tree model
//!
//! Arena holding every node and edge of a forest of decision trees. The
//! objective rules and the rules manager only traverse it and write into the
//! designated computed-value slots; they never add, move or remove nodes.
//!
//! # Critical Invariants
//!
//! 1. Every node except a root has exactly one incoming edge
//! 2. No cycles: a node is never attached below one of its descendants
//! 3. Terminal nodes have no outgoing edges

use crate::expression::{EvalError, Scope};
use crate::models::edge::{Edge, EdgeId};
use crate::models::node::{Node, NodeId, NodeKind};
use crate::models::types::{EdgeDef, NodeDef, TreeDef};
use thiserror::Error;

/// Errors from structural operations on the model
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Node {0:?} is not in the model")]
    UnknownNode(NodeId),

    #[error("Edge {0:?} is not in the model")]
    UnknownEdge(EdgeId),

    #[error("Node {0:?} already has a parent edge")]
    ChildAlreadyAttached(NodeId),

    #[error("Attaching {child:?} below {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("Terminal node {0:?} cannot have outgoing edges")]
    TerminalWithChildren(NodeId),
}

#[derive(Debug, Clone, Default)]
pub struct DataModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,

    /// Document-level code block, evaluated into the global scope
    code: Option<String>,

    pub(crate) expression_scope: Scope,
    pub(crate) code_error: Option<EvalError>,
}

impl DataModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from a serde tree definition
    ///
    /// # Example
    ///
    /// ```rust
    /// use decision_tree_core_rs::models::{DataModel, TreeDef};
    ///
    /// let json = r#"{
    ///   "roots": [{
    ///     "type": "decision",
    ///     "children": [
    ///       {"child": {"type": "terminal", "payoff": 10}},
    ///       {"child": {"type": "terminal", "payoff": -5}}
    ///     ]
    ///   }]
    /// }"#;
    /// let def: TreeDef = serde_json::from_str(json).unwrap();
    /// let model = DataModel::from_def(&def).unwrap();
    /// assert_eq!(model.get_roots().len(), 1);
    /// assert_eq!(model.edges().len(), 2);
    /// ```
    pub fn from_def(def: &TreeDef) -> Result<Self, ModelError> {
        let mut model = DataModel::new();
        model.code = def.code.clone();
        for root in &def.roots {
            model.insert_def(root)?;
        }
        Ok(model)
    }

    fn insert_def(&mut self, def: &NodeDef) -> Result<NodeId, ModelError> {
        let id = self.add_node(def.kind(), def.name());
        let node = &mut self.nodes[id.0];
        node.set_code(def.code().map(str::to_string));
        if let NodeDef::Terminal {
            payoff: Some(payoff),
            ..
        } = def
        {
            node.set_payoff(Some(payoff.to_text()));
        }

        for EdgeDef {
            name,
            payoff,
            probability,
            child,
        } in def.children()
        {
            let child_id = self.insert_def(child)?;
            let edge_id = self.add_edge(id, child_id)?;
            let edge = &mut self.edges[edge_id.0];
            edge.set_name(name.clone());
            edge.set_payoff(payoff.as_ref().map(|p| p.to_text()));
            edge.set_probability(probability.as_ref().map(|p| p.to_text()));
        }
        Ok(id)
    }

    // ========================================================================
    // Structure
    // ========================================================================

    pub fn add_node(&mut self, kind: NodeKind, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, name));
        id
    }

    /// Add a Terminal node with a literal or expression payoff
    pub fn add_terminal(&mut self, name: impl Into<String>, payoff: impl Into<String>) -> NodeId {
        let id = self.add_node(NodeKind::Terminal, name);
        self.nodes[id.0].set_payoff(Some(payoff.into()));
        id
    }

    /// Connect `parent` to the root `child`
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> Result<EdgeId, ModelError> {
        let parent_node = self.node(parent)?;
        if parent_node.is_terminal() {
            return Err(ModelError::TerminalWithChildren(parent));
        }
        if self.node(child)?.parent_edge.is_some() {
            return Err(ModelError::ChildAlreadyAttached(child));
        }
        // child is a root, so a cycle exists only if it is parent's root
        if self.root_of(parent) == child {
            return Err(ModelError::Cycle { parent, child });
        }

        let id = EdgeId(self.edges.len());
        self.edges.push(Edge::new(parent, child));
        self.nodes[parent.0].child_edges.push(id);
        self.nodes[child.0].parent_edge = Some(id);
        Ok(id)
    }

    /// Convenience: add an edge and set its payoff and probability expressions
    pub fn connect(
        &mut self,
        parent: NodeId,
        child: NodeId,
        payoff: Option<&str>,
        probability: Option<&str>,
    ) -> Result<EdgeId, ModelError> {
        let id = self.add_edge(parent, child)?;
        let edge = &mut self.edges[id.0];
        edge.set_payoff(payoff.map(str::to_string));
        edge.set_probability(probability.map(str::to_string));
        Ok(id)
    }

    fn root_of(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.parent_node(id) {
            id = parent;
        }
        id
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn node(&self, id: NodeId) -> Result<&Node, ModelError> {
        self.nodes.get(id.0).ok_or(ModelError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, ModelError> {
        self.nodes.get_mut(id.0).ok_or(ModelError::UnknownNode(id))
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge, ModelError> {
        self.edges.get(id.0).ok_or(ModelError::UnknownEdge(id))
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge, ModelError> {
        self.edges.get_mut(id.0).ok_or(ModelError::UnknownEdge(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Every edge in the model
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        let edge = self.nodes.get(id.0)?.parent_edge?;
        self.edges.get(edge.0).map(|e| e.parent())
    }

    /// Nodes without an incoming edge, in insertion order
    pub fn get_roots(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.parent_edge.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// `root` and all its descendants in pre-order
    pub fn get_all_nodes_in_subtree(&self, root: NodeId) -> Result<Vec<NodeId>, ModelError> {
        self.node(root)?;
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            result.push(id);
            let node = &self.nodes[id.0];
            for edge in node.child_edges.iter().rev() {
                stack.push(self.edges[edge.0].child());
            }
        }
        Ok(result)
    }

    // ========================================================================
    // Global code and scope
    // ========================================================================

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn set_code(&mut self, code: Option<String>) {
        self.code = code;
    }

    /// Scope seeded by the document-level code block
    pub fn expression_scope(&self) -> &Scope {
        &self.expression_scope
    }

    pub fn code_error(&self) -> Option<&EvalError> {
        self.code_error.as_ref()
    }

    // ========================================================================
    // Computed values
    // ========================================================================

    /// Clear computed slots and diagnostics of every node in the subtree and
    /// of their outgoing edges
    pub fn clear_computed_values(&mut self, root: NodeId) -> Result<(), ModelError> {
        for id in self.get_all_nodes_in_subtree(root)? {
            let node = &mut self.nodes[id.0];
            node.clear_computed_values();
            for edge in node.child_edges.iter() {
                self.edges[edge.0].clear_computed_values();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_and_subtree_order() {
        let mut model = DataModel::new();
        let root = model.add_node(NodeKind::Decision, "root");
        let chance = model.add_node(NodeKind::Chance, "chance");
        let a = model.add_terminal("a", "1");
        let b = model.add_terminal("b", "2");
        let c = model.add_terminal("c", "3");
        model.add_edge(root, chance).unwrap();
        model.add_edge(root, c).unwrap();
        model.add_edge(chance, a).unwrap();
        model.add_edge(chance, b).unwrap();

        assert_eq!(model.get_roots(), vec![root]);
        assert_eq!(
            model.get_all_nodes_in_subtree(root).unwrap(),
            vec![root, chance, a, b, c]
        );
        assert_eq!(model.parent_node(a), Some(chance));
        assert_eq!(model.parent_node(root), None);
    }

    #[test]
    fn test_second_parent_rejected() {
        let mut model = DataModel::new();
        let p1 = model.add_node(NodeKind::Decision, "p1");
        let p2 = model.add_node(NodeKind::Decision, "p2");
        let leaf = model.add_terminal("leaf", "0");
        model.add_edge(p1, leaf).unwrap();
        assert_eq!(
            model.add_edge(p2, leaf),
            Err(ModelError::ChildAlreadyAttached(leaf))
        );
    }

    #[test]
    fn test_cycle_rejected() {
        let mut model = DataModel::new();
        let a = model.add_node(NodeKind::Decision, "a");
        let b = model.add_node(NodeKind::Chance, "b");
        model.add_edge(a, b).unwrap();
        assert_eq!(
            model.add_edge(b, a),
            Err(ModelError::Cycle { parent: b, child: a })
        );
        assert_eq!(
            model.add_edge(a, a),
            Err(ModelError::Cycle { parent: a, child: a })
        );
    }

    #[test]
    fn test_terminal_cannot_have_children() {
        let mut model = DataModel::new();
        let leaf = model.add_terminal("leaf", "0");
        let other = model.add_terminal("other", "0");
        assert_eq!(
            model.add_edge(leaf, other),
            Err(ModelError::TerminalWithChildren(leaf))
        );
    }

    #[test]
    fn test_unknown_node() {
        let model = DataModel::new();
        assert_eq!(
            model.get_all_nodes_in_subtree(NodeId(3)).unwrap_err(),
            ModelError::UnknownNode(NodeId(3))
        );
    }
}
