// DML Query Parser Implementation
//
// This module implements parsing for UPDATE and DELETE queries.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;

use super::parser_core::{ParseResult, Parser};
use super::parser_expressions::parse_expression;
use super::parser_select::parse_optional_alias;

/// Parse an UPDATE query
pub fn parse_update(parser: &mut Parser) -> ParseResult<Query> {
    parser.expect(TokenKind::Update)?;

    let entity_name = parser.parse_identifier()?;
    let alias = parse_optional_alias(parser)?;

    parser.expect(TokenKind::Set)?;

    let mut assignments = vec![parse_assignment(parser)?];
    while parser.current_is(&TokenKind::Comma) {
        parser.advance();
        assignments.push(parse_assignment(parser)?);
    }

    let where_clause = if parser.current_is(&TokenKind::Where) {
        parser.advance();
        Some(WhereClause {
            condition: parse_expression(parser)?,
        })
    } else {
        None
    };

    Ok(Query::Update(UpdateQuery {
        entity_name,
        alias,
        assignments,
        where_clause,
    }))
}

/// Parse one `property = value` assignment.
///
/// The target may be written qualified (`u.Name`) or bare (`Name`); only the
/// simple property name is kept.
fn parse_assignment(parser: &mut Parser) -> ParseResult<SetAssignment> {
    let first = parser.parse_identifier()?;
    let property_name = if parser.current_is(&TokenKind::Dot) {
        parser.advance();
        parser.parse_identifier()?
    } else {
        first
    };

    parser.expect(TokenKind::Eq)?;
    let value = parse_expression(parser)?;

    Ok(SetAssignment {
        property_name,
        value,
    })
}

/// Parse a DELETE query
pub fn parse_delete(parser: &mut Parser) -> ParseResult<Query> {
    parser.expect(TokenKind::Delete)?;
    parser.expect(TokenKind::From)?;

    let entity_name = parser.parse_identifier()?;
    let alias = parse_optional_alias(parser)?;

    let where_clause = if parser.current_is(&TokenKind::Where) {
        parser.advance();
        Some(WhereClause {
            condition: parse_expression(parser)?,
        })
    } else {
        None
    };

    Ok(Query::Delete(DeleteQuery {
        entity_name,
        alias,
        where_clause,
    }))
}
