//! Error type for filter parsing.

use thiserror::Error;

/// A specialized Result type for filter parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Error raised when a filter expression cannot be parsed.
///
/// All positions are 0-based character offsets into the query string.
/// Evaluation of a successfully parsed filter never fails, so this is the
/// only error the engine produces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character the tokenizer does not recognize.
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    /// A quoted literal with no closing quote.
    #[error("unterminated string literal at position {position}")]
    UnterminatedLiteral { position: usize },

    /// A token that does not fit the grammar at this point.
    #[error("expected {expected}, found {found} at position {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    /// The expression stopped short of a complete filter.
    #[error("expected {expected}, found end of input at position {position}")]
    UnexpectedEndOfInput { expected: String, position: usize },

    /// A kind selector entry that is not a known element kind.
    #[error("unknown element kind '{name}' at position {position}")]
    UnknownElementKind { name: String, position: usize },

    /// The same element kind listed twice in the selector.
    #[error("duplicate element kind '{name}' at position {position}")]
    DuplicateElementKind { name: String, position: usize },
}

impl ParseError {
    /// The character offset the error points at.
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedCharacter { position, .. }
            | ParseError::UnterminatedLiteral { position }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEndOfInput { position, .. }
            | ParseError::UnknownElementKind { position, .. }
            | ParseError::DuplicateElementKind { position, .. } => *position,
        }
    }
}
