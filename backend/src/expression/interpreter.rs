// Expression Interpreter
//
// Evaluates payoff/probability expressions and node code blocks against a
// Scope. Arithmetic is exact (see number.rs); comparisons are therefore
// deterministic and need no epsilon.

use crate::expression::number::{Number, NumberError};
use crate::expression::parser::{parse_program, SyntaxError};
use crate::expression::scope::Scope;
use crate::expression::types::{BinaryOp, Expr, LogicalOp, Stmt, UnaryOp};
use crate::expression::value::Value;
use std::cmp::Ordering;
use thiserror::Error;

/// Marker meaning "assign me the residual probability"
pub const AUTO_PROBABILITY_MARKER: &str = "#";

/// Errors that can occur during expression evaluation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid arguments to {function}: {reason}")]
    InvalidArguments { function: String, reason: String },

    #[error("Assignment is not allowed in an expression")]
    AssignmentInExpression,
}

impl EvalError {
    /// True for malformed text, false for failures while evaluating well-formed text
    pub fn is_syntax(&self) -> bool {
        matches!(self, EvalError::Syntax(_))
    }
}

impl From<NumberError> for EvalError {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::DivisionByZero => EvalError::DivisionByZero,
            NumberError::Overflow => EvalError::Overflow,
            NumberError::InvalidLiteral(text) => {
                EvalError::Syntax(SyntaxError::new(format!("Invalid number literal: {}", text), 0))
            }
        }
    }
}

// ============================================================================
// CLASSIFIERS
// ============================================================================

/// True if the text is the auto-probability placeholder, regardless of spacing
pub fn is_auto_placeholder(source: &str) -> bool {
    source.trim() == AUTO_PROBABILITY_MARKER
}

/// True if the text parses and binds a variable anywhere
pub fn has_assignment_expression(source: &str) -> bool {
    parse_program(source)
        .map(|program| program.has_assignment())
        .unwrap_or(false)
}

/// True if the text is a single well-formed expression with no assignment
pub fn is_valid_expression(source: &str) -> bool {
    !source.trim().is_empty()
        && parse_program(source)
            .and_then(|program| program.into_expression())
            .is_ok()
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Evaluate a single expression
///
/// # Arguments
///
/// * `source` - Expression text
/// * `numeric` - Require a numeric result (booleans convert to 0/1)
/// * `scope` - Variables visible to the expression
///
/// # Example
///
/// ```rust
/// use decision_tree_core_rs::expression::{evaluate, Number, Scope, Value};
///
/// let mut scope = Scope::new();
/// scope.set("price", Value::Number("2.5".parse().unwrap()));
/// let total = evaluate("price * 4", true, &scope).unwrap();
/// assert_eq!(total, Value::Number(Number::from_integer(10)));
/// ```
pub fn evaluate(source: &str, numeric: bool, scope: &Scope) -> Result<Value, EvalError> {
    let program = parse_program(source)?;
    if program.has_assignment() {
        return Err(EvalError::AssignmentInExpression);
    }
    let expr = program.into_expression()?;
    let value = evaluate_expr(&expr, scope)?;
    if numeric {
        Ok(Value::Number(to_number(value)?))
    } else {
        Ok(value)
    }
}

/// Evaluate an expression in numeric context and unwrap the number
pub fn evaluate_number(source: &str, scope: &Scope) -> Result<Number, EvalError> {
    let value = evaluate(source, true, scope)?;
    to_number(value)
}

/// Execute a code block, binding its assignments into `scope`
///
/// The whole block is parsed before anything runs, so a syntax error leaves
/// the scope untouched. A runtime error stops execution; bindings made by
/// earlier statements remain.
pub fn execute_code(source: &str, scope: &mut Scope) -> Result<(), EvalError> {
    let program = parse_program(source)?;
    for stmt in &program.statements {
        match stmt {
            Stmt::Assign { name, value } => {
                let value = evaluate_expr(value, scope)?;
                scope.set(name.clone(), value);
            }
            Stmt::Expr(expr) => {
                evaluate_expr(expr, scope)?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// EVALUATION
// ============================================================================

fn to_number(value: Value) -> Result<Number, EvalError> {
    match value {
        Value::Number(n) => Ok(n),
        Value::Bool(b) => Ok(if b { Number::ONE } else { Number::ZERO }),
        other => Err(EvalError::TypeMismatch {
            expected: "number",
            found: other.type_name(),
        }),
    }
}

fn expect_number(value: &Value) -> Result<Number, EvalError> {
    value.as_number().ok_or(EvalError::TypeMismatch {
        expected: "number",
        found: value.type_name(),
    })
}

fn expect_bool(value: &Value) -> Result<bool, EvalError> {
    value.as_bool().ok_or(EvalError::TypeMismatch {
        expected: "boolean",
        found: value.type_name(),
    })
}

pub fn evaluate_expr(expr: &Expr, scope: &Scope) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),

        Expr::Variable(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

        Expr::Unary { op, operand } => {
            let value = evaluate_expr(operand, scope)?;
            match op {
                UnaryOp::Negate => Ok(Value::Number(expect_number(&value)?.checked_neg()?)),
                UnaryOp::Plus => Ok(Value::Number(expect_number(&value)?)),
                UnaryOp::Not => Ok(Value::Bool(!expect_bool(&value)?)),
            }
        }

        Expr::Binary { op, left, right } => {
            let left = evaluate_expr(left, scope)?;
            let right = evaluate_expr(right, scope)?;
            evaluate_binary(*op, &left, &right)
        }

        // Short-circuit: the right operand is only evaluated when needed
        Expr::Logical { op, left, right } => {
            let left = expect_bool(&evaluate_expr(left, scope)?)?;
            match (op, left) {
                (LogicalOp::And, false) => Ok(Value::Bool(false)),
                (LogicalOp::Or, true) => Ok(Value::Bool(true)),
                _ => Ok(Value::Bool(expect_bool(&evaluate_expr(right, scope)?)?)),
            }
        }

        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            if expect_bool(&evaluate_expr(condition, scope)?)? {
                evaluate_expr(then_branch, scope)
            } else {
                evaluate_expr(else_branch, scope)
            }
        }

        Expr::Call { function, args } => {
            let args = args
                .iter()
                .map(|arg| evaluate_expr(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            call_builtin(function, &args)
        }
    }
}

fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{}{}", a, b))),
            _ => Ok(Value::Number(
                expect_number(left)?.checked_add(&expect_number(right)?)?,
            )),
        },
        BinaryOp::Subtract => Ok(Value::Number(
            expect_number(left)?.checked_sub(&expect_number(right)?)?,
        )),
        BinaryOp::Multiply => Ok(Value::Number(
            expect_number(left)?.checked_mul(&expect_number(right)?)?,
        )),
        BinaryOp::Divide => Ok(Value::Number(
            expect_number(left)?.checked_div(&expect_number(right)?)?,
        )),
        BinaryOp::Remainder => Ok(Value::Number(
            expect_number(left)?.checked_rem(&expect_number(right)?)?,
        )),
        BinaryOp::Power => {
            let base = expect_number(left)?;
            let exponent = expect_number(right)?;
            let exponent = exponent
                .to_i64()
                .ok_or_else(|| EvalError::InvalidArguments {
                    function: "^".to_string(),
                    reason: format!("exponent {} is not an integer", exponent),
                })?;
            Ok(Value::Number(base.checked_pow(exponent)?))
        }
        BinaryOp::Equal => Ok(Value::Bool(values_equal(left, right)?)),
        BinaryOp::NotEqual => Ok(Value::Bool(!values_equal(left, right)?)),
        BinaryOp::LessThan => compare(left, right, |o| o == Ordering::Less),
        BinaryOp::LessOrEqual => compare(left, right, |o| o != Ordering::Greater),
        BinaryOp::GreaterThan => compare(left, right, |o| o == Ordering::Greater),
        BinaryOp::GreaterOrEqual => compare(left, right, |o| o != Ordering::Less),
    }
}

fn values_equal(left: &Value, right: &Value) -> Result<bool, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Text(a), Value::Text(b)) => Ok(a == b),
        _ => Err(EvalError::TypeMismatch {
            expected: left.type_name(),
            found: right.type_name(),
        }),
    }
}

fn compare(
    left: &Value,
    right: &Value,
    accept: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    let ordering = expect_number(left)?.cmp(&expect_number(right)?);
    Ok(Value::Bool(accept(ordering)))
}

// ============================================================================
// BUILT-IN FUNCTIONS
// ============================================================================

fn call_builtin(function: &str, args: &[Value]) -> Result<Value, EvalError> {
    let arity = |expected: usize| -> Result<(), EvalError> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(EvalError::InvalidArguments {
                function: function.to_string(),
                reason: format!("expected {} argument(s), got {}", expected, args.len()),
            })
        }
    };

    match function {
        "min" | "max" => {
            if args.is_empty() {
                return Err(EvalError::InvalidArguments {
                    function: function.to_string(),
                    reason: "empty value list".to_string(),
                });
            }
            let numbers = args
                .iter()
                .map(expect_number)
                .collect::<Result<Vec<_>, _>>()?;
            let picked = if function == "min" {
                numbers.into_iter().min()
            } else {
                numbers.into_iter().max()
            };
            Ok(Value::Number(picked.unwrap_or_default()))
        }
        "abs" => {
            arity(1)?;
            Ok(Value::Number(expect_number(&args[0])?.abs()?))
        }
        "floor" => {
            arity(1)?;
            Ok(Value::Number(expect_number(&args[0])?.floor()))
        }
        "ceil" => {
            arity(1)?;
            Ok(Value::Number(expect_number(&args[0])?.ceil()))
        }
        "round" => {
            arity(1)?;
            Ok(Value::Number(expect_number(&args[0])?.round()))
        }
        "clamp" => {
            arity(3)?;
            let value = expect_number(&args[0])?;
            let min = expect_number(&args[1])?;
            let max = expect_number(&args[2])?;
            if min > max {
                return Err(EvalError::InvalidArguments {
                    function: function.to_string(),
                    reason: format!("lower bound {} exceeds upper bound {}", min, max),
                });
            }
            Ok(Value::Number(value.max(min).min(max)))
        }
        _ => Err(EvalError::UnknownFunction(function.to_string())),
    }
}
