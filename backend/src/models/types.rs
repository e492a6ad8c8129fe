// Tree Definition Format
//
// serde input format used by hosts (and tests) to build a DataModel.
// Numeric fields accept either a JSON number or an expression string:
//
//   {"type": "chance", "children": [
//       {"probability": 0.4, "child": {"type": "terminal", "payoff": 20}},
//       {"probability": "#",  "child": {"type": "terminal", "payoff": "base * 2"}}
//   ]}

use crate::models::node::NodeKind;
use serde::{Deserialize, Serialize};

fn default_version() -> String {
    "1.0".to_string()
}

/// A forest of decision trees plus the document-level code block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDef {
    /// Schema version (currently "1.0")
    #[serde(default = "default_version")]
    pub version: String,

    /// Global code block seeding every root's scope
    #[serde(default)]
    pub code: Option<String>,

    pub roots: Vec<NodeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeDef {
    Decision {
        #[serde(default)]
        name: String,

        #[serde(default)]
        code: Option<String>,

        #[serde(default)]
        children: Vec<EdgeDef>,
    },

    Chance {
        #[serde(default)]
        name: String,

        #[serde(default)]
        code: Option<String>,

        #[serde(default)]
        children: Vec<EdgeDef>,
    },

    Terminal {
        #[serde(default)]
        name: String,

        #[serde(default)]
        code: Option<String>,

        #[serde(default)]
        payoff: Option<ExprSource>,
    },
}

impl NodeDef {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeDef::Decision { .. } => NodeKind::Decision,
            NodeDef::Chance { .. } => NodeKind::Chance,
            NodeDef::Terminal { .. } => NodeKind::Terminal,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeDef::Decision { name, .. }
            | NodeDef::Chance { name, .. }
            | NodeDef::Terminal { name, .. } => name,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            NodeDef::Decision { code, .. }
            | NodeDef::Chance { code, .. }
            | NodeDef::Terminal { code, .. } => code.as_deref(),
        }
    }

    pub fn children(&self) -> &[EdgeDef] {
        match self {
            NodeDef::Decision { children, .. } | NodeDef::Chance { children, .. } => children,
            NodeDef::Terminal { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDef {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub payoff: Option<ExprSource>,

    /// Literal, expression, or "#" for the residual probability
    #[serde(default)]
    pub probability: Option<ExprSource>,

    pub child: NodeDef,
}

/// A literal JSON number or expression text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExprSource {
    Number(serde_json::Number),
    Text(String),
}

impl ExprSource {
    pub fn to_text(&self) -> String {
        match self {
            ExprSource::Number(n) => n.to_string(),
            ExprSource::Text(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_sources() {
        let json = r##"{
            "code": "base = 10",
            "roots": [{
                "type": "chance",
                "name": "market",
                "children": [
                    {"probability": 0.4, "child": {"type": "terminal", "payoff": 20}},
                    {"probability": "#", "payoff": "base", "child": {"type": "terminal"}}
                ]
            }]
        }"##;
        let def: TreeDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.version, "1.0");
        assert_eq!(def.code.as_deref(), Some("base = 10"));

        let root = &def.roots[0];
        assert_eq!(root.kind(), NodeKind::Chance);
        assert_eq!(root.name(), "market");
        let children = root.children();
        assert_eq!(children[0].probability.as_ref().unwrap().to_text(), "0.4");
        assert_eq!(children[1].probability.as_ref().unwrap().to_text(), "#");
        assert_eq!(children[1].payoff.as_ref().unwrap().to_text(), "base");
    }

    #[test]
    fn test_unknown_node_type_rejected() {
        let json = r#"{"roots": [{"type": "lottery"}]}"#;
        assert!(serde_json::from_str::<TreeDef>(json).is_err());
    }
}
