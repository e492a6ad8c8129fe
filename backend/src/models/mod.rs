//! Tree model for the decision tree engine

pub mod computed;
pub mod edge;
pub mod errors;
pub mod node;
pub mod tree;
pub mod types;

// Re-exports
pub use computed::{BaseSlots, ComputedField, ComputedValues, RuleId, RuleSlots};
pub use edge::{Edge, EdgeId};
pub use errors::ProbabilityError;
pub use node::{Node, NodeId, NodeKind};
pub use tree::{DataModel, ModelError};
pub use types::{EdgeDef, ExprSource, NodeDef, TreeDef};
