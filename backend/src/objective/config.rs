//! Manager configuration
//!
//! The only configuration surface of the core: which rule is current.

use crate::models::RuleId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Registered rule name used by single-rule recomputation
    pub current_rule: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            current_rule: RuleId::ExpectedValueMaximization.name().to_string(),
        }
    }
}

impl ManagerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_field_missing() {
        let config = ManagerConfig::from_json("{}").unwrap();
        assert_eq!(config.current_rule, "expected-value-maximization");
    }

    #[test]
    fn test_reads_rule_name() {
        let config = ManagerConfig::from_json(r#"{"current_rule": "mini-min"}"#).unwrap();
        assert_eq!(config.current_rule, "mini-min");
    }
}
