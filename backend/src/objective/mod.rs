//! Objective evaluation
//!
//! Everything that turns an expression-annotated tree into computed values:
//!
//! - [`evaluation`]: rule-agnostic driver filling scopes and base slots
//! - [`rule`]: the [`ObjectiveRule`] trait and its shared two-pass algorithm
//! - [`rules`]: the six registered criteria
//! - [`manager`]: rule registry and recomputation entry points
//! - [`validation`]: post-evaluation problem report
//! - [`snapshot`]: serializable copy of computed slots with a SHA-256 hash
//!
//! # Example
//!
//! ```rust
//! use decision_tree_core_rs::models::{DataModel, NodeKind, RuleId};
//! use decision_tree_core_rs::objective::ObjectiveRulesManager;
//!
//! let mut model = DataModel::new();
//! let market = model.add_node(NodeKind::Chance, "market");
//! let up = model.add_terminal("up", "20");
//! let down = model.add_terminal("down", "0");
//! model.connect(market, up, None, Some("0.4")).unwrap();
//! model.connect(market, down, None, Some("#")).unwrap();
//!
//! let manager = ObjectiveRulesManager::default();
//! manager.recompute(&mut model, true, true).unwrap();
//!
//! let payoff = model.node(market).unwrap().computed()
//!     .rule(RuleId::ExpectedValueMaximization).payoff.unwrap();
//! assert_eq!(payoff.to_i64(), Some(8));
//! ```

pub mod config;
pub mod evaluation;
pub mod manager;
pub mod rule;
pub mod rules;
pub mod snapshot;
pub mod validation;

pub use config::ManagerConfig;
pub use crate::models::ProbabilityError;
pub use evaluation::{eval_expressions_for_node, eval_global_code};
pub use manager::{is_valid_rule_name, rule_names, ManagerError, ObjectiveRulesManager};
pub use rule::{ChanceAggregation, DecisionSelection, ObjectiveRule};
pub use rules::{
    create_rule, ExpectedValueMaximization, ExpectedValueMinimization, MaxiMax, MaxiMin,
    MiniMax, MiniMin,
};
pub use snapshot::{compute_snapshot_hash, ComputedSnapshot, EdgeSnapshot, NodeSnapshot};
pub use validation::{validate_probability, validate_tree, ValidationError, ValidationResult};
