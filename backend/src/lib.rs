//! Decision Tree Core - Rust Engine
//!
//! Evaluation core for decision-analysis trees: expression scopes, residual
//! probability resolution and six objective rules computed side by side.
//!
//! # Architecture
//!
//! - **expression**: Exact numbers, expression language, copy-on-write scopes
//! - **models**: Arena-backed tree model and computed-value slots
//! - **objective**: Evaluation driver, objective rules, rules manager,
//!   validation and snapshots
//!
//! # Critical Invariants
//!
//! 1. All payoff and probability arithmetic is exact (no floats)
//! 2. Each rule writes only its own slots
//! 3. Bad expressions and arithmetic overflow are recorded where they occur
//!    and never abort a pass
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod expression;
pub mod models;
pub mod objective;

// Re-exports for convenience
pub use expression::{EvalError, Number, Scope, SyntaxError, Value};
pub use models::{
    ComputedField, DataModel, Edge, EdgeId, ModelError, Node, NodeId, NodeKind, RuleId, TreeDef,
};
pub use objective::{
    validate_tree, ManagerConfig, ManagerError, ObjectiveRule, ObjectiveRulesManager,
    ProbabilityError, ValidationError,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn decision_tree_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::tree::PyDecisionTree>()?;
    Ok(())
}
