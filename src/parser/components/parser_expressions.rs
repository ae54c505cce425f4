// Expression Parser Implementation
//
// This module implements expression parsing as an explicit precedence
// ladder; each level parses its operands at the next-tighter level and loops
// while its own operators keep appearing.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;

use super::parser_core::{ParseResult, Parser};
use super::parser_select::parse_select_query;

/// Parse a full expression starting at the loosest level
pub fn parse_expression(parser: &mut Parser) -> ParseResult<Expression> {
    parse_or(parser)
}

fn parse_or(parser: &mut Parser) -> ParseResult<Expression> {
    let mut left = parse_and(parser)?;
    while parser.current_is(&TokenKind::Or) {
        parser.advance();
        let right = parse_and(parser)?;
        left = binary(left, BinaryOp::Or, right);
    }
    Ok(left)
}

fn parse_and(parser: &mut Parser) -> ParseResult<Expression> {
    let mut left = parse_equality(parser)?;
    while parser.current_is(&TokenKind::And) {
        parser.advance();
        let right = parse_equality(parser)?;
        left = binary(left, BinaryOp::And, right);
    }
    Ok(left)
}

/// Equality level: `=`, `<>`, LIKE, IN, BETWEEN and the IS NULL postfix
fn parse_equality(parser: &mut Parser) -> ParseResult<Expression> {
    let mut left = parse_relational(parser)?;
    loop {
        match parser.current.kind {
            TokenKind::Eq => {
                parser.advance();
                left = binary(left, BinaryOp::Eq, parse_relational(parser)?);
            }
            TokenKind::NotEq => {
                parser.advance();
                left = binary(left, BinaryOp::NotEq, parse_relational(parser)?);
            }
            TokenKind::Like => {
                parser.advance();
                left = binary(left, BinaryOp::Like, parse_relational(parser)?);
            }
            TokenKind::Is => {
                parser.advance();
                let negated = if parser.current_is(&TokenKind::Not) {
                    parser.advance();
                    true
                } else {
                    false
                };
                parser.expect(TokenKind::Null)?;
                left = Expression::IsNull {
                    operand: Box::new(left),
                    negated,
                };
            }
            TokenKind::In => {
                parser.advance();
                left = parse_in_rhs(parser, left, false)?;
            }
            TokenKind::Between => {
                parser.advance();
                left = parse_between_rhs(parser, left, false)?;
            }
            // NOT IN / NOT LIKE / NOT BETWEEN after a complete operand
            TokenKind::Not => {
                if parser.peek_is(&TokenKind::In) {
                    parser.advance();
                    parser.advance();
                    left = parse_in_rhs(parser, left, true)?;
                } else if parser.peek_is(&TokenKind::Between) {
                    parser.advance();
                    parser.advance();
                    left = parse_between_rhs(parser, left, true)?;
                } else if parser.peek_is(&TokenKind::Like) {
                    parser.advance();
                    parser.advance();
                    let like = binary(left, BinaryOp::Like, parse_relational(parser)?);
                    left = Expression::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(like),
                    };
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    Ok(left)
}

fn parse_relational(parser: &mut Parser) -> ParseResult<Expression> {
    let mut left = parse_additive(parser)?;
    loop {
        let op = match parser.current.kind {
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            _ => break,
        };
        parser.advance();
        left = binary(left, op, parse_additive(parser)?);
    }
    Ok(left)
}

fn parse_additive(parser: &mut Parser) -> ParseResult<Expression> {
    let mut left = parse_multiplicative(parser)?;
    loop {
        let op = match parser.current.kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Subtract,
            _ => break,
        };
        parser.advance();
        left = binary(left, op, parse_multiplicative(parser)?);
    }
    Ok(left)
}

fn parse_multiplicative(parser: &mut Parser) -> ParseResult<Expression> {
    let mut left = parse_unary(parser)?;
    loop {
        let op = match parser.current.kind {
            TokenKind::Star => BinaryOp::Multiply,
            TokenKind::Slash => BinaryOp::Divide,
            TokenKind::Percent => BinaryOp::Modulo,
            _ => break,
        };
        parser.advance();
        left = binary(left, op, parse_unary(parser)?);
    }
    Ok(left)
}

/// Unary level: prefix `+`, `-` and NOT
fn parse_unary(parser: &mut Parser) -> ParseResult<Expression> {
    let op = match parser.current.kind {
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Minus => Some(UnaryOp::Minus),
        TokenKind::Not => Some(UnaryOp::Not),
        _ => None,
    };
    match op {
        Some(op) => {
            parser.advance();
            let operand = parse_unary(parser)?;
            Ok(Expression::Unary {
                op,
                operand: Box::new(operand),
            })
        }
        None => parse_primary(parser),
    }
}

/// Primary productions: literals, parameters, property paths, wildcards,
/// calls, parenthesized expressions and subqueries
fn parse_primary(parser: &mut Parser) -> ParseResult<Expression> {
    match parser.current.kind.clone() {
        TokenKind::NumberLiteral(value) => {
            let token = parser.advance();
            if token.literal.contains('.') {
                Ok(Expression::Literal(Value::Float(value)))
            } else {
                match token.literal.parse::<i64>() {
                    Ok(i) => Ok(Expression::Literal(Value::Integer(i))),
                    Err(_) => Ok(Expression::Literal(Value::Float(value))),
                }
            }
        }
        TokenKind::StringLiteral(s) => {
            parser.advance();
            Ok(Expression::Literal(Value::String(s)))
        }
        TokenKind::BooleanLiteral(b) => {
            parser.advance();
            Ok(Expression::Literal(Value::Boolean(b)))
        }
        TokenKind::Null => {
            parser.advance();
            Ok(Expression::Literal(Value::Null))
        }
        TokenKind::Parameter(name) => {
            parser.advance();
            Ok(Expression::Parameter { name })
        }
        TokenKind::Star => {
            parser.advance();
            Ok(Expression::Wildcard { entity_alias: None })
        }
        TokenKind::Count
        | TokenKind::Sum
        | TokenKind::Avg
        | TokenKind::Min
        | TokenKind::Max => parse_aggregate(parser),
        TokenKind::Upper
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
        | TokenKind::Now => parse_function_keyword(parser),
        TokenKind::LParen => {
            if parser.peek_is(&TokenKind::Select) {
                parser.advance();
                let query = parse_select_query(parser)?;
                parser.expect(TokenKind::RParen)?;
                Ok(Expression::Subquery(Box::new(query)))
            } else {
                parser.advance();
                let expr = parse_expression(parser)?;
                parser.expect(TokenKind::RParen)?;
                Ok(expr)
            }
        }
        TokenKind::Identifier(_) => parse_reference(parser),
        _ => Err(parser.unexpected()),
    }
}

/// Parse an identifier-led reference: property path, qualified wildcard or
/// user-defined function call
fn parse_reference(parser: &mut Parser) -> ParseResult<Expression> {
    if parser.peek_is(&TokenKind::Dot) {
        let qualifier = parser.advance().literal;
        parser.advance(); // dot
        if parser.current_is(&TokenKind::Star) {
            parser.advance();
            Ok(Expression::Wildcard {
                entity_alias: Some(qualifier),
            })
        } else {
            let property_name = parser.parse_identifier()?;
            Ok(Expression::Property {
                entity_alias: Some(qualifier),
                property_name,
            })
        }
    } else if parser.peek_is(&TokenKind::LParen) {
        let function_name = parser.advance().literal;
        parser.advance(); // lparen
        let arguments = parse_argument_list(parser)?;
        Ok(Expression::Function {
            function_name,
            arguments,
        })
    } else {
        let property_name = parser.advance().literal;
        Ok(Expression::Property {
            entity_alias: None,
            property_name,
        })
    }
}

/// Parse an aggregate call: `COUNT(*)`, `COUNT(DISTINCT x)`, `SUM(x)`, ...
fn parse_aggregate(parser: &mut Parser) -> ParseResult<Expression> {
    let function_name = match parser.current.kind {
        TokenKind::Count => "COUNT",
        TokenKind::Sum => "SUM",
        TokenKind::Avg => "AVG",
        TokenKind::Min => "MIN",
        TokenKind::Max => "MAX",
        _ => return Err(parser.unexpected()),
    }
    .to_string();
    parser.advance();
    parser.expect(TokenKind::LParen)?;

    let distinct = if parser.current_is(&TokenKind::Distinct) {
        parser.advance();
        true
    } else {
        false
    };

    let argument = if parser.current_is(&TokenKind::Star) {
        parser.advance();
        None
    } else {
        Some(Box::new(parse_expression(parser)?))
    };

    parser.expect(TokenKind::RParen)?;
    Ok(Expression::Aggregate {
        function_name,
        argument,
        distinct,
    })
}

/// Parse a scalar function keyword call, e.g. `UPPER(x)` or `NOW()`
fn parse_function_keyword(parser: &mut Parser) -> ParseResult<Expression> {
    let function_name = match parser.current.kind {
        TokenKind::Upper => "UPPER",
        TokenKind::Lower => "LOWER",
        TokenKind::Length => "LENGTH",
        TokenKind::Substring => "SUBSTRING",
        TokenKind::Trim => "TRIM",
        TokenKind::Concat => "CONCAT",
        TokenKind::Year => "YEAR",
        TokenKind::Month => "MONTH",
        TokenKind::Day => "DAY",
        TokenKind::Hour => "HOUR",
        TokenKind::Minute => "MINUTE",
        TokenKind::Second => "SECOND",
        TokenKind::Now => "NOW",
        _ => return Err(parser.unexpected()),
    }
    .to_string();
    parser.advance();
    parser.expect(TokenKind::LParen)?;
    let arguments = parse_argument_list(parser)?;
    Ok(Expression::Function {
        function_name,
        arguments,
    })
}

/// Parse a possibly empty argument list up to and including the closing paren
fn parse_argument_list(parser: &mut Parser) -> ParseResult<Vec<Expression>> {
    let mut arguments = Vec::new();
    if !parser.current_is(&TokenKind::RParen) {
        loop {
            arguments.push(parse_expression(parser)?);
            if parser.current_is(&TokenKind::Comma) {
                parser.advance();
                continue;
            }
            break;
        }
    }
    parser.expect(TokenKind::RParen)?;
    Ok(arguments)
}

/// Parse the right-hand side of `[NOT] IN`: a value list or a subquery
fn parse_in_rhs(parser: &mut Parser, operand: Expression, negated: bool) -> ParseResult<Expression> {
    parser.expect(TokenKind::LParen)?;
    if parser.current_is(&TokenKind::Select) {
        let query = parse_select_query(parser)?;
        parser.expect(TokenKind::RParen)?;
        Ok(Expression::InSubquery {
            operand: Box::new(operand),
            query: Box::new(query),
            negated,
        })
    } else {
        let mut items = Vec::new();
        loop {
            items.push(parse_expression(parser)?);
            if parser.current_is(&TokenKind::Comma) {
                parser.advance();
                continue;
            }
            break;
        }
        parser.expect(TokenKind::RParen)?;
        Ok(Expression::InList {
            operand: Box::new(operand),
            items,
            negated,
        })
    }
}

/// Parse the right-hand side of `[NOT] BETWEEN low AND high`.
///
/// Bounds are parsed at the relational level so the separating AND is not
/// swallowed as a logical operator.
fn parse_between_rhs(
    parser: &mut Parser,
    operand: Expression,
    negated: bool,
) -> ParseResult<Expression> {
    let low = parse_relational(parser)?;
    parser.expect(TokenKind::And)?;
    let high = parse_relational(parser)?;
    Ok(Expression::Between {
        operand: Box::new(operand),
        low: Box::new(low),
        high: Box::new(high),
        negated,
    })
}

fn binary(left: Expression, op: BinaryOp, right: Expression) -> Expression {
    Expression::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
