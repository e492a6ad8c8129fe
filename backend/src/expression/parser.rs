// Expression Language - Parser
//
// Recursive-descent parser over the token stream from lexer.rs.
// Precedence, lowest first:
//   ?:  or  and  == !=  < <= > >=  + -  * / %  unary  ^  call/primary

use crate::expression::lexer::{tokenize, Spanned, Token};
use crate::expression::types::{BinaryOp, Expr, LogicalOp, Program, Stmt, UnaryOp};
use thiserror::Error;

/// Malformed expression text
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Syntax error at position {position}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Parse a code block (zero or more statements)
pub fn parse_program(source: &str) -> Result<Program, SyntaxError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: source.len(),
    };
    parser.program()
}

impl Program {
    /// The program's only statement as an expression
    ///
    /// Empty programs, assignments and multiple statements are rejected.
    pub fn into_expression(self) -> Result<Expr, SyntaxError> {
        let mut statements = self.statements.into_iter();
        match (statements.next(), statements.next()) {
            (Some(Stmt::Expr(expr)), None) => Ok(expr),
            (None, _) => Err(SyntaxError::new("Empty expression", 0)),
            (Some(Stmt::Assign { name, .. }), None) => Err(SyntaxError::new(
                format!("Assignment to '{}' is not allowed in an expression", name),
                0,
            )),
            (Some(_), Some(_)) => Err(SyntaxError::new(
                "Expected a single expression, found several statements",
                0,
            )),
        }
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset).map(|s| &s.token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|s| s.position)
            .unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), SyntaxError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> SyntaxError {
        match self.peek() {
            Some(token) => SyntaxError::new(
                format!("Expected {}, found {:?}", what, token),
                self.position(),
            ),
            None => SyntaxError::new(
                format!("Expected {}, found end of input", what),
                self.position(),
            ),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(name)) if name == keyword)
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn program(&mut self) -> Result<Program, SyntaxError> {
        let mut statements = Vec::new();
        loop {
            while self.eat(&Token::Separator) {}
            if self.peek().is_none() {
                break;
            }
            statements.push(self.statement()?);
            if self.peek().is_some() && !self.eat(&Token::Separator) {
                return Err(self.unexpected("end of statement"));
            }
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        if let (Some(Token::Ident(name)), Some(Token::Assign)) = (self.peek(), self.peek_at(1)) {
            if is_reserved(name) {
                return Err(SyntaxError::new(
                    format!("Cannot assign to reserved word '{}'", name),
                    self.position(),
                ));
            }
            self.pos += 2;
            let value = self.expression()?;
            return Ok(Stmt::Assign {
                name: name.clone(),
                value,
            });
        }
        Ok(Stmt::Expr(self.expression()?))
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn expression(&mut self) -> Result<Expr, SyntaxError> {
        let condition = self.or()?;
        if self.eat(&Token::Question) {
            let then_branch = self.expression()?;
            self.expect(&Token::Colon, "':'")?;
            let else_branch = self.expression()?;
            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }
        Ok(condition)
    }

    fn or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.and()?;
        while self.eat(&Token::OrOr) || self.eat_keyword("or") {
            let right = self.and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.equality()?;
        while self.eat(&Token::AndAnd) || self.eat_keyword("and") {
            let right = self.equality()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, SyntaxError>,
        operator: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr, SyntaxError> {
        let mut left = operand(self)?;
        while let Some(op) = self.peek().and_then(operator) {
            self.pos += 1;
            let right = operand(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(Self::comparison, |token| match token {
            Token::EqualEqual => Some(BinaryOp::Equal),
            Token::NotEqual => Some(BinaryOp::NotEqual),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(Self::additive, |token| match token {
            Token::Less => Some(BinaryOp::LessThan),
            Token::LessEqual => Some(BinaryOp::LessOrEqual),
            Token::Greater => Some(BinaryOp::GreaterThan),
            Token::GreaterEqual => Some(BinaryOp::GreaterOrEqual),
            _ => None,
        })
    }

    fn additive(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(Self::multiplicative, |token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Subtract),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(Self::unary, |token| match token {
            Token::Star => Some(BinaryOp::Multiply),
            Token::Slash => Some(BinaryOp::Divide),
            Token::Percent => Some(BinaryOp::Remainder),
            _ => None,
        })
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek() {
            Some(Token::Minus) => Some(UnaryOp::Negate),
            Some(Token::Plus) => Some(UnaryOp::Plus),
            Some(Token::Bang) => Some(UnaryOp::Not),
            Some(Token::Ident(name)) if name == "not" => Some(UnaryOp::Not),
            _ => None,
        };
        match op {
            Some(op) => {
                self.pos += 1;
                let operand = self.unary()?;
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }
            None => self.power(),
        }
    }

    /// Right-associative; binds tighter than unary minus on its left (`-2^2 == -4`)
    fn power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Power,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        let position = self.position();
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(*n)),
            Some(Token::Text(s)) => Ok(Expr::Text(s.clone())),
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "and" | "or" | "not" => Err(SyntaxError::new(
                    format!("Unexpected keyword '{}'", name),
                    position,
                )),
                _ if self.eat(&Token::LParen) => {
                    let args = self.arguments()?;
                    Ok(Expr::Call {
                        function: name.clone(),
                        args,
                    })
                }
                _ => Ok(Expr::Variable(name.clone())),
            },
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(token) => Err(SyntaxError::new(
                format!("Unexpected token {:?}", token),
                position,
            )),
            None => Err(SyntaxError::new("Unexpected end of input", position)),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            self.expect(&Token::Comma, "',' or ')'")?;
        }
    }
}

fn is_reserved(name: &str) -> bool {
    matches!(name, "true" | "false" | "and" | "or" | "not")
}
