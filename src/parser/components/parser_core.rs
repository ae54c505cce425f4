// Parser Core Implementation
//
// Parser state and the token-consumption primitives shared by the statement
// and expression parsers.

use std::iter::Peekable;
use std::mem;
use std::vec::IntoIter;

use thiserror::Error;

use crate::parser::lexer::{Lexer, LexicalError, Token, TokenKind};

/// Syntax errors raised while building the AST.
///
/// The first structural violation aborts the parse; there is no recovery and
/// no partial tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("expected {expected:?}, found {found:?} ('{lexeme}') at position {position}")]
    ExpectedToken {
        expected: TokenKind,
        found: TokenKind,
        lexeme: String,
        position: usize,
    },
    #[error("unexpected token {found:?} ('{lexeme}') at position {position}")]
    UnexpectedToken {
        found: TokenKind,
        lexeme: String,
        position: usize,
    },
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, SyntaxError>;

/// Recursive-descent parser over a tokenized query
pub struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    pub(crate) current: Token,
}

impl Parser {
    /// Create a new parser over the given query text.
    ///
    /// The whole input is tokenized up front, so malformed text fails here
    /// with a `LexicalError` before any grammar work starts.
    pub fn new(input: &str) -> Result<Self, LexicalError> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut tokens = tokens.into_iter().peekable();
        let current = tokens.next().unwrap_or_else(|| Token::eof(0));
        Ok(Parser { tokens, current })
    }

    /// Advance to the next token, returning the one just left behind
    pub(crate) fn advance(&mut self) -> Token {
        let end = self.current.position + self.current.literal.chars().count();
        let next = self.tokens.next().unwrap_or_else(|| Token::eof(end));
        mem::replace(&mut self.current, next)
    }

    /// Check whether the current token matches the given kind
    pub(crate) fn current_is(&self, kind: &TokenKind) -> bool {
        kind_matches(&self.current.kind, kind)
    }

    /// Check whether the token after the current one matches the given kind
    pub(crate) fn peek_is(&mut self, kind: &TokenKind) -> bool {
        self.tokens.peek().is_some_and(|t| kind_matches(&t.kind, kind))
    }

    /// Consume the current token if it matches, or raise a syntax error
    /// naming the expected kind, the actual token and its position
    pub(crate) fn expect(&mut self, expected: TokenKind) -> ParseResult<Token> {
        if kind_matches(&self.current.kind, &expected) {
            Ok(self.advance())
        } else {
            Err(SyntaxError::ExpectedToken {
                expected,
                found: self.current.kind.clone(),
                lexeme: self.current.literal.clone(),
                position: self.current.position,
            })
        }
    }

    /// Consume an identifier, preserving its original casing.
    ///
    /// A small fixed set of keywords is also accepted here so that names
    /// like `Order`, `Count` or `Year` stay usable as entity and property
    /// names; the set is exactly ORDER, BY, VALUES and the aggregate and
    /// scalar function keywords.
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<String> {
        if matches!(self.current.kind, TokenKind::Identifier(_)) || keyword_as_identifier(&self.current.kind) {
            let token = self.advance();
            Ok(token.literal)
        } else {
            Err(SyntaxError::ExpectedToken {
                expected: TokenKind::Identifier(String::new()),
                found: self.current.kind.clone(),
                lexeme: self.current.literal.clone(),
                position: self.current.position,
            })
        }
    }

    /// Build an unexpected-token error for the current token
    pub(crate) fn unexpected(&self) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            found: self.current.kind.clone(),
            lexeme: self.current.literal.clone(),
            position: self.current.position,
        }
    }
}

/// Match token kinds by variant, ignoring any carried value.
///
/// An expected `Identifier("")` therefore matches any identifier, the same
/// for the other value-carrying kinds.
pub(crate) fn kind_matches(actual: &TokenKind, expected: &TokenKind) -> bool {
    mem::discriminant(actual) == mem::discriminant(expected)
}

/// The finite whitelist of keywords accepted in identifier position
fn keyword_as_identifier(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Order
            | TokenKind::By
            | TokenKind::Count
            | TokenKind::Sum
            | TokenKind::Avg
            | TokenKind::Min
            | TokenKind::Max
            | TokenKind::Upper
            | TokenKind::Lower
            | TokenKind::Length
            | TokenKind::Substring
            | TokenKind::Trim
            | TokenKind::Concat
            | TokenKind::Year
            | TokenKind::Month
            | TokenKind::Day
            | TokenKind::Hour
            | TokenKind::Minute
            | TokenKind::Second
            | TokenKind::Now
            | TokenKind::Values
    )
}
