//! Lexer/tokenizer for the element filter language.

use std::fmt;

use winnow::ascii::space0;
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::take_while;

use super::error::ParseError;

/// Token types for the filter language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare identifier: tag key, unquoted value or kind selector name.
    Ident(String),
    /// Quoted literal (single or double quotes).
    Str(String),
    /// Numeric literal; the raw text is kept for use as an equality value.
    Number { value: f64, text: String },

    // Comparison operators
    Eq,      // =
    NotEq,   // !=
    Like,    // ~
    NotLike, // !~
    Gt,      // >
    Ge,      // >=
    Lt,      // <
    Le,      // <=

    // Keywords
    And,
    Or,
    Not,
    With,

    // Punctuation
    Bang,  // ! (key non-existence prefix)
    Pipe,  // | (alternation separator)
    Comma, // , (kind selector separator)
    LParen,
    RParen,

    // End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "'{s}'"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Number { text, .. } => write!(f, "number {text}"),
            Token::Eq => write!(f, "'='"),
            Token::NotEq => write!(f, "'!='"),
            Token::Like => write!(f, "'~'"),
            Token::NotLike => write!(f, "'!~'"),
            Token::Gt => write!(f, "'>'"),
            Token::Ge => write!(f, "'>='"),
            Token::Lt => write!(f, "'<'"),
            Token::Le => write!(f, "'<='"),
            Token::And => write!(f, "'and'"),
            Token::Or => write!(f, "'or'"),
            Token::Not => write!(f, "'not'"),
            Token::With => write!(f, "'with'"),
            Token::Bang => write!(f, "'!'"),
            Token::Pipe => write!(f, "'|'"),
            Token::Comma => write!(f, "','"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with its 0-based character offset in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub offset: usize,
}

// Manually define the result type for resilience against winnow version changes
type LexResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// Lex an identifier or keyword.
/// First character: alphabetic or underscore; rest may also contain digits,
/// colons, dashes and dots (covers OSM keys like `surface:note`).
fn lex_ident(input: &mut &str) -> LexResult<Token> {
    let first = take_while(1.., |c: char| c.is_alphabetic() || c == '_').parse_next(input)?;
    let rest = take_while(0.., |c: char| {
        c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
    })
    .parse_next(input)?;

    let word = format!("{first}{rest}");
    Ok(match word.as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "with" => Token::With,
        _ => Token::Ident(word),
    })
}

/// Lex a number (signed decimal).
fn lex_number(input: &mut &str) -> LexResult<Token> {
    let neg = opt('-').parse_next(input)?;
    let digits = take_while(1.., |c: char| c.is_ascii_digit() || c == '.').parse_next(input)?;
    let text = if neg.is_some() {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    let value: f64 = text
        .parse()
        .map_err(|_| winnow::error::ErrMode::Backtrack(winnow::error::ContextError::default()))?;
    Ok(Token::Number { value, text })
}

/// Lex a quoted literal. No escape sequences; the literal ends at the next
/// occurrence of the opening quote character.
fn lex_quoted(input: &mut &str) -> LexResult<Token> {
    let mut quote = alt(('"', '\'')).parse_next(input)?;
    let body = take_while(0.., move |c: char| c != quote).parse_next(input)?;
    let body = body.to_string();
    quote.parse_next(input)?;
    Ok(Token::Str(body))
}

/// Lex a single token.
fn lex_token(input: &mut &str) -> LexResult<Token> {
    alt((
        // Multi-char operators first
        "!=".value(Token::NotEq),
        "!~".value(Token::NotLike),
        ">=".value(Token::Ge),
        "<=".value(Token::Le),
        // Single-char operators and punctuation
        "=".value(Token::Eq),
        "~".value(Token::Like),
        ">".value(Token::Gt),
        "<".value(Token::Lt),
        "!".value(Token::Bang),
        "|".value(Token::Pipe),
        ",".value(Token::Comma),
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        // Number before ident to catch negative numbers
        lex_number,
        lex_quoted,
        lex_ident,
    ))
    .parse_next(input)
}

/// Tokenize the entire input. The returned stream always ends with
/// [`Token::Eof`].
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        let _ = space0::<_, winnow::error::ContextError>.parse_next(&mut remaining);
        let offset = char_offset(input, remaining);

        if remaining.is_empty() {
            tokens.push(SpannedToken {
                token: Token::Eof,
                offset,
            });
            return Ok(tokens);
        }

        let unconsumed = remaining;
        match lex_token(&mut remaining) {
            Ok(token) => tokens.push(SpannedToken { token, offset }),
            Err(_) => {
                // remaining is non-empty here
                let character = unconsumed.chars().next().unwrap_or('\0');
                return Err(if matches!(character, '"' | '\'') {
                    ParseError::UnterminatedLiteral { position: offset }
                } else {
                    ParseError::UnexpectedCharacter {
                        character,
                        position: offset,
                    }
                });
            }
        }
    }
}

/// Character offset of `remaining` within `input`.
fn char_offset(input: &str, remaining: &str) -> usize {
    input[..input.len() - remaining.len()].chars().count()
}
