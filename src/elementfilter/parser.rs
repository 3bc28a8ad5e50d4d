//! Recursive descent parser for element filter expressions.
//!
//! Grammar (in rough EBNF, low to high precedence):
//!
//! filter      = kinds ("with" or_expr)? EOF
//! kinds       = kind ("," kind)*
//! kind        = "nodes" | "ways" | "relations" (singular forms accepted)
//! or_expr     = and_expr ("or" and_expr)*
//! and_expr    = unary_expr ("and" unary_expr)*
//! unary_expr  = "not"? primary
//! primary     = "(" or_expr ")" | predicate
//! predicate   = "!" key
//!             | key ("=" value | "!=" value | "~" alternation
//!                    | "!~" alternation | compare_op NUMBER)?
//! alternation = value ("|" value)*
//! key         = IDENT | STRING
//! value       = IDENT | STRING | NUMBER
//! compare_op  = ">" | ">=" | "<" | "<="

use crate::mapdata::ElementKind;

use super::ast::{CompareOp, ElementFilter, ElementKinds, Expr};
use super::error::{ParseError, ParseResult};
use super::lexer::{SpannedToken, Token, tokenize};

/// Parser state.
struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> &SpannedToken {
        // tokenize always appends Eof, so the stream is never empty and the
        // position never walks past the final token
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Build a syntax error from the current token.
    fn unexpected(&self, expected: &str) -> ParseError {
        let found = self.current();
        match found.token {
            Token::Eof => ParseError::UnexpectedEndOfInput {
                expected: expected.to_string(),
                position: found.offset,
            },
            _ => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.token.to_string(),
                position: found.offset,
            },
        }
    }

    /// Parse the kind selector prefix: kind ("," kind)*
    fn parse_kind_selector(&mut self) -> ParseResult<ElementKinds> {
        let mut kinds = ElementKinds::default();
        loop {
            let Token::Ident(name) = self.peek() else {
                return Err(self.unexpected("an element kind ('nodes', 'ways' or 'relations')"));
            };
            let name = name.clone();
            let offset = self.current().offset;
            self.bump();

            let Some(kind) = ElementKind::from_selector(&name) else {
                return Err(ParseError::UnknownElementKind {
                    name,
                    position: offset,
                });
            };
            if !kinds.insert(kind) {
                return Err(ParseError::DuplicateElementKind {
                    name,
                    position: offset,
                });
            }

            if !self.eat(&Token::Comma) {
                return Ok(kinds);
            }
        }
    }

    /// Parse OR expression: and_expr ("or" and_expr)*
    fn parse_or_expr(&mut self) -> ParseResult<Expr> {
        let first = self.parse_and_expr()?;
        if !matches!(self.peek(), Token::Or) {
            return Ok(first);
        }

        let mut children = vec![first];
        while self.eat(&Token::Or) {
            children.push(self.parse_and_expr()?);
        }
        Ok(Expr::Or(children))
    }

    /// Parse AND expression: unary_expr ("and" unary_expr)*
    fn parse_and_expr(&mut self) -> ParseResult<Expr> {
        let first = self.parse_unary_expr()?;
        if !matches!(self.peek(), Token::And) {
            return Ok(first);
        }

        let mut children = vec![first];
        while self.eat(&Token::And) {
            children.push(self.parse_unary_expr()?);
        }
        Ok(Expr::And(children))
    }

    /// Parse unary expression: "not"? primary
    fn parse_unary_expr(&mut self) -> ParseResult<Expr> {
        if self.eat(&Token::Not) {
            let inner = self.parse_primary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    /// Parse primary expression: "(" or_expr ")" | predicate
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            Token::LParen => {
                self.bump();
                let inner = self.parse_or_expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.unexpected("')'"));
                }
                Ok(inner)
            }
            Token::Bang => {
                self.bump();
                let key = self.parse_key()?;
                Ok(Expr::KeyMissing { key })
            }
            Token::Ident(_) | Token::Str(_) => self.parse_predicate(),
            _ => Err(self.unexpected("a tag key, '!' or '('")),
        }
    }

    /// Parse a tag predicate: key with an optional comparison.
    fn parse_predicate(&mut self) -> ParseResult<Expr> {
        let key = self.parse_key()?;
        match self.peek() {
            Token::Eq => {
                self.bump();
                let value = self.parse_value()?;
                Ok(Expr::ValueEquals { key, value })
            }
            Token::NotEq => {
                self.bump();
                let value = self.parse_value()?;
                Ok(Expr::ValueNotEquals { key, value })
            }
            Token::Like => {
                self.bump();
                let values = self.parse_alternation()?;
                Ok(Expr::ValueAnyOf { key, values })
            }
            Token::NotLike => {
                self.bump();
                let values = self.parse_alternation()?;
                Ok(Expr::ValueNoneOf { key, values })
            }
            Token::Gt => self.parse_compare(key, CompareOp::Gt),
            Token::Ge => self.parse_compare(key, CompareOp::Ge),
            Token::Lt => self.parse_compare(key, CompareOp::Lt),
            Token::Le => self.parse_compare(key, CompareOp::Le),
            _ => Ok(Expr::KeyExists { key }),
        }
    }

    fn parse_compare(&mut self, key: String, op: CompareOp) -> ParseResult<Expr> {
        self.bump();
        let Token::Number { value, .. } = self.peek() else {
            return Err(self.unexpected("a number"));
        };
        let value = *value;
        self.bump();
        Ok(Expr::Compare { key, op, value })
    }

    fn parse_key(&mut self) -> ParseResult<String> {
        let key = match self.peek() {
            Token::Ident(key) | Token::Str(key) => key.clone(),
            _ => return Err(self.unexpected("a tag key")),
        };
        self.bump();
        Ok(key)
    }

    /// Parse a single value: IDENT | STRING | NUMBER
    fn parse_value(&mut self) -> ParseResult<String> {
        let value = match self.peek() {
            Token::Ident(value) | Token::Str(value) => value.clone(),
            Token::Number { text, .. } => text.clone(),
            _ => return Err(self.unexpected("a tag value")),
        };
        self.bump();
        Ok(value)
    }

    /// Parse alternation: value ("|" value)*
    fn parse_alternation(&mut self) -> ParseResult<Vec<String>> {
        let mut values = vec![self.parse_value()?];
        while self.eat(&Token::Pipe) {
            values.push(self.parse_value()?);
        }
        Ok(values)
    }
}

/// Parse a filter expression like `ways with surface ~ paved|unpaved`.
///
/// The kind selector prefix is required; the `with` clause is optional
/// (a bare selector matches every element of those kinds).
pub fn parse_filter(input: &str) -> ParseResult<ElementFilter> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);

    let kinds = parser.parse_kind_selector()?;
    let root = if parser.eat(&Token::With) {
        Some(parser.parse_or_expr()?.simplify())
    } else {
        None
    };

    // Ensure we consumed all tokens
    if !matches!(parser.peek(), Token::Eof) {
        let expected = if root.is_some() {
            "'and', 'or' or end of input"
        } else {
            "'with' or end of input"
        };
        return Err(parser.unexpected(expected));
    }

    Ok(ElementFilter::new(kinds, root))
}
