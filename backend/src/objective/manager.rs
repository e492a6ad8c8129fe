// Objective Rules Manager
//
// Owns the six registered rules, tracks the current one, and drives full or
// subtree recomputation: optional expression re-evaluation, then
// compute_payoff → compute_optimal → display probability for each rule.

use crate::models::{DataModel, ModelError, NodeId, NodeKind, RuleId};
use crate::objective::config::ManagerConfig;
use crate::objective::evaluation::{eval_expressions_for_node, eval_global_code};
use crate::objective::rule::ObjectiveRule;
use crate::objective::rules::create_rule;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace};

/// Hard failures of the manager API
///
/// Bad user data never produces one of these, including arithmetic
/// overflow; it is recorded on the offending node or edge instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ManagerError {
    #[error("Unknown objective rule: {0}")]
    UnknownRule(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Canonical rule names in registration order
pub fn rule_names() -> Vec<&'static str> {
    RuleId::ALL.iter().map(|id| id.name()).collect()
}

pub fn is_valid_rule_name(name: &str) -> bool {
    RuleId::from_name(name).is_some()
}

pub struct ObjectiveRulesManager {
    /// Rule implementations, in registration order
    rules: Vec<Box<dyn ObjectiveRule>>,

    current: RuleId,
}

impl std::fmt::Debug for ObjectiveRulesManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectiveRulesManager")
            .field("rules", &rule_names())
            .field("current", &self.current.name())
            .finish()
    }
}

impl Default for ObjectiveRulesManager {
    fn default() -> Self {
        Self::with_rule(RuleId::ExpectedValueMaximization)
    }
}

impl ObjectiveRulesManager {
    /// Create a manager with `current_rule` selected
    ///
    /// # Errors
    ///
    /// `ManagerError::UnknownRule` if the name is not registered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use decision_tree_core_rs::objective::ObjectiveRulesManager;
    ///
    /// let manager = ObjectiveRulesManager::new("maxi-min").unwrap();
    /// assert_eq!(manager.current_rule().name(), "maxi-min");
    /// assert!(ObjectiveRulesManager::new("best-guess").is_err());
    /// ```
    pub fn new(current_rule: &str) -> Result<Self, ManagerError> {
        let id = RuleId::from_name(current_rule)
            .ok_or_else(|| ManagerError::UnknownRule(current_rule.to_string()))?;
        Ok(Self::with_rule(id))
    }

    pub fn with_rule(current: RuleId) -> Self {
        Self {
            rules: RuleId::ALL.iter().map(|&id| create_rule(id)).collect(),
            current,
        }
    }

    pub fn from_config(config: &ManagerConfig) -> Result<Self, ManagerError> {
        Self::new(&config.current_rule)
    }

    // ========================================================================
    // Rule registry
    // ========================================================================

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn is_valid_rule_name(&self, name: &str) -> bool {
        is_valid_rule_name(name)
    }

    /// Make `name` the rule used by single-rule recomputation
    pub fn select_rule(&mut self, name: &str) -> Result<(), ManagerError> {
        self.current =
            RuleId::from_name(name).ok_or_else(|| ManagerError::UnknownRule(name.to_string()))?;
        debug!(rule = name, "selected objective rule");
        Ok(())
    }

    pub fn current_rule(&self) -> &dyn ObjectiveRule {
        self.rule(self.current)
    }

    pub fn current_rule_id(&self) -> RuleId {
        self.current
    }

    pub fn rule(&self, id: RuleId) -> &dyn ObjectiveRule {
        // built from RuleId::ALL, so the slot index is the registration index
        self.rules[id.index()].as_ref()
    }

    // ========================================================================
    // Recomputation
    // ========================================================================

    /// Recompute every root of the forest
    ///
    /// # Arguments
    ///
    /// * `all_rules` - Run all six rules instead of only the current one
    /// * `reevaluate_expressions` - First re-run global code, node code and
    ///   every payoff/probability expression
    pub fn recompute(
        &self,
        model: &mut DataModel,
        all_rules: bool,
        reevaluate_expressions: bool,
    ) -> Result<(), ManagerError> {
        let start = Instant::now();
        trace!(all_rules, reevaluate_expressions, "recomputing rules");

        if reevaluate_expressions {
            self.eval_expressions(model, true, true, false)?;
        }
        for root in model.get_roots() {
            self.run_rules(model, root, all_rules)?;
        }

        trace!(elapsed_us = start.elapsed().as_micros() as u64, "recomputation finished");
        Ok(())
    }

    /// Recompute a single subtree after a local edit
    ///
    /// With `reevaluate_expressions` only the subtree is cleared and
    /// re-evaluated; its root scope is seeded from the parent node's scope.
    pub fn recompute_subtree(
        &self,
        model: &mut DataModel,
        root: NodeId,
        all_rules: bool,
        reevaluate_expressions: bool,
    ) -> Result<(), ManagerError> {
        let start = Instant::now();
        trace!(root = root.index(), all_rules, "recomputing rules for subtree");

        if reevaluate_expressions {
            model.clear_computed_values(root)?;
            eval_expressions_for_node(model, root, true, true, true)?;
        }
        self.run_rules(model, root, all_rules)?;

        trace!(elapsed_us = start.elapsed().as_micros() as u64, "subtree recomputation finished");
        Ok(())
    }

    fn run_rules(
        &self,
        model: &mut DataModel,
        root: NodeId,
        all_rules: bool,
    ) -> Result<(), ManagerError> {
        let selected: Vec<&dyn ObjectiveRule> = if all_rules {
            self.rules.iter().map(|rule| rule.as_ref()).collect()
        } else {
            vec![self.current_rule()]
        };
        for rule in selected {
            rule.compute_payoff(model, root)?;
            rule.compute_optimal(model, root)?;
            self.set_display_probability(model, rule.id())?;
        }
        Ok(())
    }

    /// Run the expression driver over the whole forest
    ///
    /// `eval_code` also re-runs the global code block. Each root's subtree is
    /// cleared before it is walked.
    pub fn eval_expressions(
        &self,
        model: &mut DataModel,
        eval_code: bool,
        eval_numeric: bool,
        init_scopes: bool,
    ) -> Result<(), ManagerError> {
        debug!(eval_code, eval_numeric, init_scopes, "evaluating expressions");
        if eval_code {
            eval_global_code(model);
        }
        for root in model.get_roots() {
            model.clear_computed_values(root)?;
            eval_expressions_for_node(model, root, eval_code, eval_numeric, init_scopes)?;
        }
        Ok(())
    }

    /// Write the `$probability` slot of every edge for `rule`
    ///
    /// Decision edges show the rule's pseudo-probability, Chance edges the
    /// resolved probability.
    pub fn set_display_probability(
        &self,
        model: &mut DataModel,
        rule: RuleId,
    ) -> Result<(), ManagerError> {
        let edge_ids: Vec<_> = model.edge_ids().collect();
        for edge_id in edge_ids {
            let parent_kind = model.node(model.edge(edge_id)?.parent())?.kind();
            let edge = model.edge_mut(edge_id)?;
            let shown = match parent_kind {
                NodeKind::Decision => edge.computed().rule(rule).probability,
                NodeKind::Chance => edge.computed().base().probability,
                NodeKind::Terminal => None,
            };
            edge.computed.rule_mut(rule).display_probability = shown;
        }
        Ok(())
    }

    /// Clear computed slots and diagnostics of a subtree
    pub fn clear_tree(&self, model: &mut DataModel, root: NodeId) -> Result<(), ManagerError> {
        model.clear_computed_values(root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Number;

    #[test]
    fn test_registry_order() {
        let manager = ObjectiveRulesManager::default();
        assert_eq!(
            manager.rule_names(),
            vec![
                "expected-value-maximization",
                "expected-value-minimization",
                "maxi-min",
                "maxi-max",
                "mini-min",
                "mini-max",
            ]
        );
        assert_eq!(manager.rule_names(), rule_names());
    }

    #[test]
    fn test_select_unknown_rule_keeps_current() {
        let mut manager = ObjectiveRulesManager::default();
        let err = manager.select_rule("expected-value").unwrap_err();
        assert_eq!(err, ManagerError::UnknownRule("expected-value".to_string()));
        assert_eq!(manager.current_rule_id(), RuleId::ExpectedValueMaximization);

        manager.select_rule("mini-max").unwrap();
        assert_eq!(manager.current_rule_id(), RuleId::MiniMax);
        assert_eq!(manager.rule(RuleId::MaxiMax).id(), RuleId::MaxiMax);
    }

    #[test]
    fn test_single_rule_leaves_other_slots_empty() {
        let mut model = DataModel::new();
        let root = model.add_node(NodeKind::Decision, "root");
        let leaf = model.add_terminal("leaf", "3");
        model.add_edge(root, leaf).unwrap();

        let manager = ObjectiveRulesManager::new("maxi-max").unwrap();
        manager.recompute(&mut model, false, true).unwrap();

        let computed = model.node(root).unwrap().computed();
        assert_eq!(computed.rule(RuleId::MaxiMax).payoff, Some(Number::from_integer(3)));
        assert_eq!(computed.rule(RuleId::ExpectedValueMaximization).payoff, None);
    }

    #[test]
    fn test_unknown_node_is_a_hard_failure() {
        let mut model = DataModel::new();
        let manager = ObjectiveRulesManager::default();
        let err = manager
            .recompute_subtree(&mut model, NodeId(7), true, true)
            .unwrap_err();
        assert_eq!(err, ManagerError::Model(ModelError::UnknownNode(NodeId(7))));
    }
}
