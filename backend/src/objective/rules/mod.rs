//! Registered objective rules
//!
//! Registration order matters: it is the order `recompute` runs rules in when
//! all rules are requested, and the order of [`rule_names`](crate::objective::rule_names).

mod expected_value_maximization;
mod expected_value_minimization;
mod maxi_max;
mod maxi_min;
mod mini_max;
mod mini_min;

pub use expected_value_maximization::ExpectedValueMaximization;
pub use expected_value_minimization::ExpectedValueMinimization;
pub use maxi_max::MaxiMax;
pub use maxi_min::MaxiMin;
pub use mini_max::MiniMax;
pub use mini_min::MiniMin;

use crate::models::RuleId;
use crate::objective::rule::ObjectiveRule;

/// Factory: rule implementation for an id
pub fn create_rule(id: RuleId) -> Box<dyn ObjectiveRule> {
    match id {
        RuleId::ExpectedValueMaximization => Box::new(ExpectedValueMaximization),
        RuleId::ExpectedValueMinimization => Box::new(ExpectedValueMinimization),
        RuleId::MaxiMin => Box::new(MaxiMin),
        RuleId::MaxiMax => Box::new(MaxiMax),
        RuleId::MiniMin => Box::new(MiniMin),
        RuleId::MiniMax => Box::new(MiniMax),
    }
}
