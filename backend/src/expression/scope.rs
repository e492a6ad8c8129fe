// Expression Scope
//
// Hierarchical variable environment. A child scope is a snapshot of its
// parent: it shares the parent's binding layers by reference and writes only
// into its own local layer. A later write by the parent copies the parent's
// local layer (copy-on-write), so descendants keep the values they were
// seeded with until they are rebuilt.

use crate::expression::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

type Bindings = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Frozen ancestor layers, outermost first
    inherited: Vec<Arc<Bindings>>,

    /// Bindings made in this scope
    local: Arc<Bindings>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot this scope as the starting point for a child
    pub fn child(&self) -> Scope {
        let mut inherited = self.inherited.clone();
        if !self.local.is_empty() {
            inherited.push(Arc::clone(&self.local));
        }
        Scope {
            inherited,
            local: Arc::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.local
            .get(name)
            .or_else(|| self.inherited.iter().rev().find_map(|layer| layer.get(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        Arc::make_mut(&mut self.local).insert(name.into(), value);
    }

    /// Names bound directly in this scope (not inherited)
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.local.keys().map(String::as_str)
    }

    /// Flattened view of every visible binding
    pub fn bindings(&self) -> BTreeMap<String, Value> {
        let mut all = BTreeMap::new();
        for layer in self.inherited.iter().chain(std::iter::once(&self.local)) {
            for (name, value) in layer.iter() {
                all.insert(name.clone(), value.clone());
            }
        }
        all
    }

    pub fn clear(&mut self) {
        self.inherited.clear();
        self.local = Arc::default();
    }
}
