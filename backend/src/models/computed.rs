//! Computed-value slots
//!
//! Every node and edge carries one set of rule-independent base slots (filled
//! by the expression driver) and one set of slots per objective rule. Rule
//! slots live in a fixed array indexed by [`RuleId`], so evaluating one rule
//! never touches another rule's results.

use crate::expression::{Number, NumberError, Value};
use serde::{Deserialize, Serialize};

/// Closed enumeration of the registered objective rules, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    ExpectedValueMaximization,
    ExpectedValueMinimization,
    MaxiMin,
    MaxiMax,
    MiniMin,
    MiniMax,
}

impl RuleId {
    pub const ALL: [RuleId; 6] = [
        RuleId::ExpectedValueMaximization,
        RuleId::ExpectedValueMinimization,
        RuleId::MaxiMin,
        RuleId::MaxiMax,
        RuleId::MiniMin,
        RuleId::MiniMax,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleId::ExpectedValueMaximization => "expected-value-maximization",
            RuleId::ExpectedValueMinimization => "expected-value-minimization",
            RuleId::MaxiMin => "maxi-min",
            RuleId::MaxiMax => "maxi-max",
            RuleId::MiniMin => "mini-min",
            RuleId::MiniMax => "mini-max",
        }
    }

    pub fn from_name(name: &str) -> Option<RuleId> {
        RuleId::ALL.into_iter().find(|rule| rule.name() == name)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Field names a renderer can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputedField {
    Payoff,
    Probability,
    Optimal,
    /// `$probability`: what the renderer shows on an edge
    DisplayProbability,
}

/// Rule-independent values written by the expression driver
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BaseSlots {
    pub payoff: Option<Number>,
    pub probability: Option<Number>,
}

/// Values written by one objective rule
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleSlots {
    pub payoff: Option<Number>,
    /// Resolved probability (chance edges) or pseudo-probability (decision edges)
    pub probability: Option<Number>,
    pub optimal: Option<bool>,
    pub display_probability: Option<Number>,
    /// Set when this rule's payoff overflowed; `payoff` is then absent
    pub error: Option<NumberError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComputedValues {
    base: BaseSlots,
    rules: [RuleSlots; 6],
}

impl ComputedValues {
    pub fn base(&self) -> &BaseSlots {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseSlots {
        &mut self.base
    }

    pub fn rule(&self, rule: RuleId) -> &RuleSlots {
        &self.rules[rule.index()]
    }

    pub fn rule_mut(&mut self, rule: RuleId) -> &mut RuleSlots {
        &mut self.rules[rule.index()]
    }

    /// Look up a slot by (rule, field); `None` rule means the base slots
    pub fn value(&self, rule: Option<RuleId>, field: ComputedField) -> Option<Value> {
        match rule {
            None => match field {
                ComputedField::Payoff => self.base.payoff.map(Value::Number),
                ComputedField::Probability => self.base.probability.map(Value::Number),
                ComputedField::Optimal | ComputedField::DisplayProbability => None,
            },
            Some(rule) => {
                let slots = self.rule(rule);
                match field {
                    ComputedField::Payoff => slots.payoff.map(Value::Number),
                    ComputedField::Probability => slots.probability.map(Value::Number),
                    ComputedField::Optimal => slots.optimal.map(Value::Bool),
                    ComputedField::DisplayProbability => {
                        slots.display_probability.map(Value::Number)
                    }
                }
            }
        }
    }

    pub fn clear(&mut self) {
        *self = ComputedValues::default();
    }

    pub fn clear_rule(&mut self, rule: RuleId) {
        self.rules[rule.index()] = RuleSlots::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_names_round_trip() {
        for rule in RuleId::ALL {
            assert_eq!(RuleId::from_name(rule.name()), Some(rule));
        }
        assert_eq!(RuleId::from_name("maximum-regret"), None);
    }

    #[test]
    fn test_serde_names_match_registry() {
        let json = serde_json::to_string(&RuleId::MaxiMin).unwrap();
        assert_eq!(json, "\"maxi-min\"");
        let parsed: RuleId = serde_json::from_str("\"expected-value-minimization\"").unwrap();
        assert_eq!(parsed, RuleId::ExpectedValueMinimization);
    }

    #[test]
    fn test_rule_slots_are_isolated() {
        let mut values = ComputedValues::default();
        values.rule_mut(RuleId::MaxiMin).payoff = Some(Number::from_integer(3));
        values.rule_mut(RuleId::MiniMax).payoff = Some(Number::from_integer(-3));
        assert_eq!(
            values.value(Some(RuleId::MaxiMin), ComputedField::Payoff),
            Some(Value::Number(Number::from_integer(3)))
        );
        values.clear_rule(RuleId::MaxiMin);
        assert_eq!(values.rule(RuleId::MaxiMin).payoff, None);
        assert_eq!(
            values.rule(RuleId::MiniMax).payoff,
            Some(Number::from_integer(-3))
        );
    }

    #[test]
    fn test_base_slots_have_no_optimal_field() {
        let mut values = ComputedValues::default();
        values.base_mut().probability = Some(Number::ONE);
        assert_eq!(
            values.value(None, ComputedField::Probability),
            Some(Value::Number(Number::ONE))
        );
        assert_eq!(values.value(None, ComputedField::Optimal), None);
    }
}
