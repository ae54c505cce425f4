// SELECT Query Parser Implementation
//
// This module implements the SELECT production: select list, FROM clause
// with relationship joins, and the optional filtering/grouping/ordering
// clauses.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;

use super::parser_core::{ParseResult, Parser};
use super::parser_expressions::parse_expression;

/// Parse a complete SELECT query
pub fn parse_select(parser: &mut Parser) -> ParseResult<Query> {
    Ok(Query::Select(parse_select_query(parser)?))
}

/// Parse a SELECT query body; also used for subqueries, which is why the
/// trailing semicolon/end-of-input handling lives with the caller
pub fn parse_select_query(parser: &mut Parser) -> ParseResult<SelectQuery> {
    parser.expect(TokenKind::Select)?;

    let distinct = if parser.current_is(&TokenKind::Distinct) {
        parser.advance();
        true
    } else {
        false
    };

    let items = parse_select_items(parser)?;
    let select = SelectClause { distinct, items };

    let from = if parser.current_is(&TokenKind::From) {
        parser.advance();
        Some(parse_from_clause(parser)?)
    } else {
        None
    };

    let where_clause = if parser.current_is(&TokenKind::Where) {
        parser.advance();
        Some(WhereClause {
            condition: parse_expression(parser)?,
        })
    } else {
        None
    };

    let group_by = if parser.current_is(&TokenKind::Group) {
        parser.advance();
        parser.expect(TokenKind::By)?;
        Some(GroupByClause {
            items: parse_expression_list(parser)?,
        })
    } else {
        None
    };

    let having = if parser.current_is(&TokenKind::Having) {
        parser.advance();
        Some(HavingClause {
            condition: parse_expression(parser)?,
        })
    } else {
        None
    };

    let order_by = if parser.current_is(&TokenKind::Order) {
        parser.advance();
        parser.expect(TokenKind::By)?;
        Some(parse_order_by_items(parser)?)
    } else {
        None
    };

    Ok(SelectQuery {
        select,
        from,
        where_clause,
        group_by,
        having,
        order_by,
    })
}

/// Parse the select list; at least one item is required
fn parse_select_items(parser: &mut Parser) -> ParseResult<Vec<SelectItem>> {
    let mut items = Vec::new();
    loop {
        let expr = parse_expression(parser)?;
        let alias = parse_optional_alias(parser)?;
        items.push(SelectItem { expr, alias });

        if parser.current_is(&TokenKind::Comma) {
            parser.advance();
            continue;
        }
        break;
    }
    Ok(items)
}

/// Parse the FROM clause: root entity references followed by joins
fn parse_from_clause(parser: &mut Parser) -> ParseResult<FromClause> {
    let mut items = vec![parse_from_item(parser)?];
    while parser.current_is(&TokenKind::Comma) {
        parser.advance();
        items.push(parse_from_item(parser)?);
    }

    let mut joins = Vec::new();
    while matches!(
        parser.current.kind,
        TokenKind::Join | TokenKind::Inner | TokenKind::Left | TokenKind::Right | TokenKind::Full
    ) {
        joins.push(parse_join_clause(parser)?);
    }

    Ok(FromClause { items, joins })
}

/// Parse one root entity reference with an optional alias
fn parse_from_item(parser: &mut Parser) -> ParseResult<FromItem> {
    let entity_name = parser.parse_identifier()?;
    let alias = parse_optional_alias(parser)?;
    Ok(FromItem { entity_name, alias })
}

/// Parse a relationship join.
///
/// The join target must have the shape `alias.name`; anything else fails
/// right here. Whether the name is a declared relationship is checked later
/// during translation.
fn parse_join_clause(parser: &mut Parser) -> ParseResult<JoinClause> {
    let join_type = parse_join_type(parser)?;

    let source_alias = parser.parse_identifier()?;
    parser.expect(TokenKind::Dot)?;
    let relationship_name = parser.parse_identifier()?;
    let alias = parse_optional_alias(parser)?;

    let on_condition = if parser.current_is(&TokenKind::On) {
        parser.advance();
        Some(parse_expression(parser)?)
    } else {
        None
    };

    Ok(JoinClause {
        join_type,
        source_alias,
        relationship_name,
        alias,
        on_condition,
    })
}

/// Parse the join flavor; bare JOIN means INNER JOIN and OUTER is optional
/// after LEFT/RIGHT/FULL
fn parse_join_type(parser: &mut Parser) -> ParseResult<JoinType> {
    match parser.current.kind {
        TokenKind::Join => {
            parser.advance();
            Ok(JoinType::Inner)
        }
        TokenKind::Inner => {
            parser.advance();
            parser.expect(TokenKind::Join)?;
            Ok(JoinType::Inner)
        }
        TokenKind::Left => {
            parser.advance();
            if parser.current_is(&TokenKind::Outer) {
                parser.advance();
            }
            parser.expect(TokenKind::Join)?;
            Ok(JoinType::Left)
        }
        TokenKind::Right => {
            parser.advance();
            if parser.current_is(&TokenKind::Outer) {
                parser.advance();
            }
            parser.expect(TokenKind::Join)?;
            Ok(JoinType::Right)
        }
        TokenKind::Full => {
            parser.advance();
            if parser.current_is(&TokenKind::Outer) {
                parser.advance();
            }
            parser.expect(TokenKind::Join)?;
            Ok(JoinType::Full)
        }
        _ => Err(parser.unexpected()),
    }
}

/// Parse a comma-separated expression list (GROUP BY items)
fn parse_expression_list(parser: &mut Parser) -> ParseResult<Vec<Expression>> {
    let mut items = vec![parse_expression(parser)?];
    while parser.current_is(&TokenKind::Comma) {
        parser.advance();
        items.push(parse_expression(parser)?);
    }
    Ok(items)
}

/// Parse ORDER BY sort keys; direction defaults to ascending
fn parse_order_by_items(parser: &mut Parser) -> ParseResult<OrderByClause> {
    let mut items = Vec::new();
    loop {
        let expr = parse_expression(parser)?;
        let direction = if parser.current_is(&TokenKind::Asc) {
            parser.advance();
            SortDirection::Asc
        } else if parser.current_is(&TokenKind::Desc) {
            parser.advance();
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        items.push(OrderByItem { expr, direction });

        if parser.current_is(&TokenKind::Comma) {
            parser.advance();
            continue;
        }
        break;
    }
    Ok(OrderByClause { items })
}

/// Parse an optional alias: `AS name`, or a bare identifier.
///
/// Only a plain identifier token is accepted as an implicit alias, so clause
/// keywords never get swallowed as aliases.
pub(super) fn parse_optional_alias(parser: &mut Parser) -> ParseResult<Option<String>> {
    if parser.current_is(&TokenKind::As) {
        parser.advance();
        return parser.parse_identifier().map(Some);
    }
    if matches!(parser.current.kind, TokenKind::Identifier(_)) {
        return Ok(Some(parser.advance().literal));
    }
    Ok(None)
}
