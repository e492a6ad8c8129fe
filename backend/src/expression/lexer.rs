// Expression Language - Lexer
//
// Splits expression/code text into tokens. `#` starts a comment that runs to
// the end of the line, so the auto-probability marker on its own lexes to
// nothing (callers classify it before parsing).

use crate::expression::number::{Number, NumberError};
use crate::expression::parser::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Number),
    Ident(String),
    Text(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    NotEqual,
    Bang,
    AndAnd,
    OrOr,
    Assign,
    Question,
    Colon,
    LParen,
    RParen,
    Comma,
    /// `;` or newline
    Separator,
}

/// Token with its byte offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let c = bytes[pos];

        let token = match c {
            b' ' | b'\t' | b'\r' => {
                pos += 1;
                continue;
            }
            b'#' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
                continue;
            }
            b'\n' | b';' => {
                pos += 1;
                Token::Separator
            }
            b'0'..=b'9' | b'.' => {
                pos = scan_number(bytes, pos);
                let literal = &source[start..pos];
                let number = literal.parse::<Number>().map_err(|e| match e {
                    NumberError::Overflow => {
                        SyntaxError::new(format!("Number literal too large: {}", literal), start)
                    }
                    _ => SyntaxError::new(format!("Invalid number literal: {}", literal), start),
                })?;
                Token::Number(number)
            }
            b'"' | b'\'' => {
                pos += 1;
                let content_start = pos;
                while pos < bytes.len() && bytes[pos] != c {
                    pos += 1;
                }
                if pos >= bytes.len() {
                    return Err(SyntaxError::new("Unterminated string literal", start));
                }
                let text = source[content_start..pos].to_string();
                pos += 1;
                Token::Text(text)
            }
            c if c.is_ascii_alphabetic() || c == b'_' || c == b'$' => {
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'$')
                {
                    pos += 1;
                }
                Token::Ident(source[start..pos].to_string())
            }
            _ => {
                let next = bytes.get(pos + 1).copied();
                let (token, width) = match (c, next) {
                    (b'<', Some(b'=')) => (Token::LessEqual, 2),
                    (b'>', Some(b'=')) => (Token::GreaterEqual, 2),
                    (b'=', Some(b'=')) => (Token::EqualEqual, 2),
                    (b'!', Some(b'=')) => (Token::NotEqual, 2),
                    (b'&', Some(b'&')) => (Token::AndAnd, 2),
                    (b'|', Some(b'|')) => (Token::OrOr, 2),
                    (b'+', _) => (Token::Plus, 1),
                    (b'-', _) => (Token::Minus, 1),
                    (b'*', _) => (Token::Star, 1),
                    (b'/', _) => (Token::Slash, 1),
                    (b'%', _) => (Token::Percent, 1),
                    (b'^', _) => (Token::Caret, 1),
                    (b'<', _) => (Token::Less, 1),
                    (b'>', _) => (Token::Greater, 1),
                    (b'=', _) => (Token::Assign, 1),
                    (b'!', _) => (Token::Bang, 1),
                    (b'?', _) => (Token::Question, 1),
                    (b':', _) => (Token::Colon, 1),
                    (b'(', _) => (Token::LParen, 1),
                    (b')', _) => (Token::RParen, 1),
                    (b',', _) => (Token::Comma, 1),
                    _ => {
                        let ch = source[start..].chars().next().unwrap_or('?');
                        return Err(SyntaxError::new(
                            format!("Unexpected character '{}'", ch),
                            start,
                        ));
                    }
                };
                pos += width;
                token
            }
        };

        tokens.push(Spanned {
            token,
            position: start,
        });
    }

    Ok(tokens)
}

/// Advance over `digits [. digits] [e [+-] digits]`
fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
        pos += 1;
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut lookahead = pos + 1;
        if lookahead < bytes.len() && (bytes[lookahead] == b'+' || bytes[lookahead] == b'-') {
            lookahead += 1;
        }
        if lookahead < bytes.len() && bytes[lookahead].is_ascii_digit() {
            pos = lookahead;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_tokenize_arithmetic() {
        assert_eq!(
            kinds("a + 1.5*b"),
            vec![
                Token::Ident("a".to_string()),
                Token::Plus,
                Token::Number("1.5".parse().unwrap()),
                Token::Star,
                Token::Ident("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("<= >= == != && ||"),
            vec![
                Token::LessEqual,
                Token::GreaterEqual,
                Token::EqualEqual,
                Token::NotEqual,
                Token::AndAnd,
                Token::OrOr,
            ]
        );
    }

    #[test]
    fn test_comment_and_separators() {
        assert_eq!(
            kinds("x = 1 # set x\ny = 2"),
            vec![
                Token::Ident("x".to_string()),
                Token::Assign,
                Token::Number(Number::from_integer(1)),
                Token::Separator,
                Token::Ident("y".to_string()),
                Token::Assign,
                Token::Number(Number::from_integer(2)),
            ]
        );
        assert!(kinds("#").is_empty());
    }

    #[test]
    fn test_exponent_literal() {
        assert_eq!(kinds("1e3"), vec![Token::Number(Number::from_integer(1000))]);
    }

    #[test]
    fn test_errors_carry_position() {
        let err = tokenize("a @ b").unwrap_err();
        assert_eq!(err.position, 2);
        assert!(tokenize("'open").is_err());
        assert!(tokenize("1.2.3").is_err());
    }
}
