//! Shared helpers for integration tests
#![allow(dead_code)]

use decision_tree_core_rs::models::{DataModel, NodeId, NodeKind, TreeDef};
use decision_tree_core_rs::Number;
use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TEST_LOGGING: Once = Once::new();

/// Install a stderr subscriber once per test binary (`RUST_LOG` filters it)
pub fn init_test_logging() {
    TEST_LOGGING.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer())
            .with(env_filter)
            .try_init();
    });
}

pub fn num(text: &str) -> Number {
    text.parse().expect("valid number literal")
}

/// Build a model from a JSON tree definition
pub fn model_from_json(json: &str) -> DataModel {
    let def: TreeDef = serde_json::from_str(json).expect("valid tree json");
    DataModel::from_def(&def).expect("valid tree")
}

pub fn single_root(model: &DataModel) -> NodeId {
    let roots = model.get_roots();
    assert_eq!(roots.len(), 1, "expected exactly one root");
    roots[0]
}

/// Chain of Chance nodes, outermost first
///
/// Each node sends `probability` to the next node and the residual `#` to a
/// leaf worth 1; the innermost node splits between leaves worth 2 and 1.
pub fn chance_chain(model: &mut DataModel, depth: usize, probability: &str) -> Vec<NodeId> {
    assert!(depth > 0, "chain needs at least one node");
    let innermost = model.add_node(NodeKind::Chance, format!("chance-{}", depth - 1));
    let two = model.add_terminal("two", "2");
    let one = model.add_terminal("one", "1");
    model.connect(innermost, two, None, Some(probability)).expect("fresh child");
    model.connect(innermost, one, None, Some("#")).expect("fresh child");

    let mut chain = vec![innermost];
    for level in (0..depth - 1).rev() {
        let node = model.add_node(NodeKind::Chance, format!("chance-{}", level));
        let leaf = model.add_terminal(format!("leaf-{}", level), "1");
        let inner = chain[chain.len() - 1];
        model.connect(node, inner, None, Some(probability)).expect("fresh child");
        model.connect(node, leaf, None, Some("#")).expect("fresh child");
        chain.push(node);
    }
    chain.reverse();
    chain
}
