// Query Parser Entry Point
//
// Dispatches on the leading token to one of the three top-level productions.

use crate::parser::ast::Query;
use crate::parser::lexer::TokenKind;

use super::components::parser_core::{ParseResult, Parser};
use super::components::{parse_delete, parse_select, parse_update};

impl Parser {
    /// Parse the input as a single query.
    ///
    /// A trailing semicolon is accepted; anything left over after the query
    /// is a syntax error.
    pub fn parse(&mut self) -> ParseResult<Query> {
        let query = match self.current.kind {
            TokenKind::Select => parse_select(self)?,
            TokenKind::Update => parse_update(self)?,
            TokenKind::Delete => parse_delete(self)?,
            _ => return Err(self.unexpected()),
        };

        if self.current_is(&TokenKind::Semicolon) {
            self.advance();
        }
        self.expect(TokenKind::Eof)?;

        Ok(query)
    }
}
