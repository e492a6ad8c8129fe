// Expression & Scope Subsystem
//
// Edge payoffs, edge probabilities and terminal payoffs may be written as
// expressions; nodes may carry code blocks that bind variables for their
// subtree.
//
// Architecture:
// - number.rs: Exact rational arithmetic (no float drift)
// - value.rs: Runtime values (number, boolean, string)
// - lexer.rs / parser.rs / types.rs: Text → syntax tree
// - scope.rs: Copy-on-write hierarchical variable scopes
// - interpreter.rs: Evaluation, code execution, placeholder classifiers

pub mod interpreter;
pub mod lexer;
pub mod number;
pub mod parser;
pub mod scope;
pub mod types;
pub mod value;

pub use interpreter::{
    evaluate, evaluate_number, execute_code, has_assignment_expression, is_auto_placeholder,
    is_valid_expression, EvalError, AUTO_PROBABILITY_MARKER,
};
pub use number::{Number, NumberError};
pub use parser::{parse_program, SyntaxError};
pub use scope::Scope;
pub use value::Value;
