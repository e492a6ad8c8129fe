// Expression Language - Syntax Tree
//
// Parsed form of payoff/probability expressions and node code blocks.
// Produced by parser.rs, walked by interpreter.rs.

use crate::expression::number::Number;

/// A parsed code block or expression: a sequence of statements
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    /// True if any statement binds a variable
    pub fn has_assignment(&self) -> bool {
        self.statements
            .iter()
            .any(|stmt| matches!(stmt, Stmt::Assign { .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `name = value`
    Assign { name: String, value: Expr },

    /// Bare expression (evaluated for its errors, result discarded in code blocks)
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Number),
    Bool(bool),
    Text(String),
    Variable(String),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Short-circuit `and` / `or`
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `condition ? then_branch : else_branch`
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    Call {
        function: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}
