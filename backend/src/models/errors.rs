//! Diagnostics stored on nodes and edges

use crate::expression::{EvalError, Number};
use thiserror::Error;

/// Why a probability or a whole Chance distribution could not be resolved
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProbabilityError {
    #[error("Probability must be a pure expression, found an assignment: {0}")]
    AssignmentExpression(String),

    #[error("Probability is missing")]
    Missing,

    #[error("Probability could not be evaluated: {0}")]
    Evaluation(EvalError),

    #[error("{count} edge probabilities are invalid")]
    InvalidEdges { count: usize },

    #[error("Probabilities sum to {sum}, outside [0, 1]")]
    SumOutOfRange { sum: Number },
}
