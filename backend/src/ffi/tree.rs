//! PyO3 wrapper for a decision tree and its rules manager
//!
//! The Python side hands over a JSON tree definition, triggers recomputation
//! and reads computed values back as JSON.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{json_error_to_py, manager_error_to_py, model_error_to_py, parse_manager_config};
use crate::models::{DataModel, TreeDef};
use crate::objective::{
    compute_snapshot_hash, validate_tree, ComputedSnapshot, ObjectiveRulesManager,
};

/// Python wrapper owning a model and a manager
///
/// # Example (from Python)
///
/// ```python
/// from decision_tree_core_rs import DecisionTree
///
/// tree = DecisionTree(tree_json, {"current_rule": "maxi-min"})
/// tree.recompute(all_rules=True, reevaluate_expressions=True)
/// values = json.loads(tree.computed_values_json())
/// ```
#[pyclass(name = "DecisionTree")]
pub struct PyDecisionTree {
    model: DataModel,
    manager: ObjectiveRulesManager,
}

#[pymethods]
impl PyDecisionTree {
    /// Build a tree from its JSON definition
    ///
    /// # Errors
    ///
    /// Raises ValueError if the JSON is malformed, the structure is invalid,
    /// or `current_rule` is not a registered rule name.
    #[new]
    #[pyo3(signature = (tree_json, config=None))]
    fn new(tree_json: &str, config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let def: TreeDef = serde_json::from_str(tree_json).map_err(json_error_to_py)?;
        let model = DataModel::from_def(&def).map_err(model_error_to_py)?;
        let manager = ObjectiveRulesManager::from_config(&parse_manager_config(config)?)
            .map_err(manager_error_to_py)?;
        Ok(PyDecisionTree { model, manager })
    }

    #[staticmethod]
    fn rule_names() -> Vec<&'static str> {
        crate::objective::rule_names()
    }

    fn current_rule(&self) -> &'static str {
        self.manager.current_rule().name()
    }

    /// Raises ValueError for an unknown rule name
    fn select_rule(&mut self, name: &str) -> PyResult<()> {
        self.manager.select_rule(name).map_err(manager_error_to_py)
    }

    #[pyo3(signature = (all_rules=false, reevaluate_expressions=false))]
    fn recompute(&mut self, all_rules: bool, reevaluate_expressions: bool) -> PyResult<()> {
        self.manager
            .recompute(&mut self.model, all_rules, reevaluate_expressions)
            .map_err(manager_error_to_py)
    }

    /// Every computed slot and diagnostic, as JSON
    fn computed_values_json(&self) -> PyResult<String> {
        ComputedSnapshot::capture(&self.model)
            .to_json()
            .map_err(json_error_to_py)
    }

    fn snapshot_hash(&self) -> PyResult<String> {
        compute_snapshot_hash(&ComputedSnapshot::capture(&self.model)).map_err(json_error_to_py)
    }

    /// Problems found in the last evaluation, one message each
    fn validate(&self) -> Vec<String> {
        match validate_tree(&self.model) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }
}
