use anyhow::{Result, anyhow};
use entiql::parser::ast::{
    BinaryOp, Expression, JoinType, Query, SortDirection, Value,
};
use entiql::{Parser, SyntaxError};

fn parse(input: &str) -> Result<Query> {
    Parser::new(input)?
        .parse()
        .map_err(|e| anyhow!("parse error: {e}"))
}

fn parse_err(input: &str) -> SyntaxError {
    Parser::new(input)
        .expect("input must lex")
        .parse()
        .expect_err("input must not parse")
}

#[test]
fn test_full_select_shape() -> Result<()> {
    let query = parse(
        "SELECT o.id, o.total FROM Order o JOIN o.Customer c WHERE c.email = :email ORDER BY o.total DESC",
    )?;

    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    assert_eq!(select.select.items.len(), 2);

    let from = select.from.expect("FROM clause");
    assert_eq!(from.items[0].entity_name, "Order");
    assert_eq!(from.joins.len(), 1);
    assert_eq!(from.joins[0].relationship_name, "Customer");

    let where_clause = select.where_clause.expect("WHERE clause");
    assert!(matches!(
        where_clause.condition,
        Expression::Binary { op: BinaryOp::Eq, .. }
    ));

    let order_by = select.order_by.expect("ORDER BY clause");
    assert_eq!(order_by.items[0].direction, SortDirection::Desc);
    Ok(())
}

#[test]
fn test_and_binds_tighter_than_or() -> Result<()> {
    // a = 1 OR b = 2 AND c = 3  must parse as  a = 1 OR (b = 2 AND c = 3)
    let query = parse("SELECT x FROM T WHERE a = 1 OR b = 2 AND c = 3")?;
    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    let condition = select.where_clause.expect("WHERE clause").condition;

    let Expression::Binary { op, left, right } = condition else {
        return Err(anyhow!("expected binary condition"));
    };
    assert_eq!(op, BinaryOp::Or);
    assert!(matches!(
        *left,
        Expression::Binary { op: BinaryOp::Eq, .. }
    ));
    assert!(matches!(
        *right,
        Expression::Binary { op: BinaryOp::And, .. }
    ));
    Ok(())
}

#[test]
fn test_explicit_parens_override_precedence() -> Result<()> {
    let query = parse("SELECT x FROM T WHERE (a = 1 OR b = 2) AND c = 3")?;
    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    let condition = select.where_clause.expect("WHERE clause").condition;

    let Expression::Binary { op, left, .. } = condition else {
        return Err(anyhow!("expected binary condition"));
    };
    assert_eq!(op, BinaryOp::And);
    assert!(matches!(*left, Expression::Binary { op: BinaryOp::Or, .. }));
    Ok(())
}

#[test]
fn test_join_target_shape_is_enforced() {
    // A relationship join traverses alias.name; a literal in join position
    // is a syntax error, not a malformed join
    let err = parse_err("SELECT o.id FROM Order o JOIN 5 c");
    assert!(matches!(err, SyntaxError::ExpectedToken { .. }));

    assert!(parse("SELECT o.id FROM Order o JOIN o.Customer c").is_ok());
}

#[test]
fn test_missing_select_items_position_is_from_offset() {
    let err = parse_err("SELECT FROM");
    match err {
        SyntaxError::UnexpectedToken { position, .. } => assert_eq!(position, 7),
        other => panic!("expected UnexpectedToken, got {other:?}"),
    }
}

#[test]
fn test_update_assignment_targets_are_simple_names() -> Result<()> {
    let query = parse("UPDATE User u SET u.Name = :n WHERE u.Id = :id")?;
    let Query::Update(update) = query else {
        return Err(anyhow!("expected UPDATE query"));
    };
    assert_eq!(update.entity_name, "User");
    assert_eq!(update.assignments[0].property_name, "Name");
    Ok(())
}

#[test]
fn test_delete_with_where() -> Result<()> {
    let query = parse("DELETE FROM Order o WHERE o.total = 0")?;
    let Query::Delete(delete) = query else {
        return Err(anyhow!("expected DELETE query"));
    };
    assert_eq!(delete.entity_name, "Order");
    assert!(delete.where_clause.is_some());
    Ok(())
}

#[test]
fn test_unknown_leading_token_is_rejected() {
    let err = parse_err("EXPLAIN SELECT x FROM T");
    assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));
}

#[test]
fn test_subquery_in_where() -> Result<()> {
    let query = parse(
        "SELECT o.id FROM Order o WHERE o.total > (SELECT AVG(x.total) FROM Order x)",
    )?;
    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    let condition = select.where_clause.expect("WHERE clause").condition;
    let Expression::Binary { right, .. } = condition else {
        return Err(anyhow!("expected binary condition"));
    };
    assert!(matches!(*right, Expression::Subquery(_)));
    Ok(())
}

#[test]
fn test_in_between_and_is_null() -> Result<()> {
    let query = parse(
        "SELECT o.id FROM Order o WHERE o.status IN ('open', 'held') AND o.total BETWEEN 1 AND 10 AND o.note IS NOT NULL",
    )?;
    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    assert!(select.where_clause.is_some());
    Ok(())
}

#[test]
fn test_distinct_and_aggregates() -> Result<()> {
    let query = parse("SELECT DISTINCT COUNT(DISTINCT c.city) FROM Customer c")?;
    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    assert!(select.select.distinct);
    assert!(matches!(
        select.select.items[0].expr,
        Expression::Aggregate { distinct: true, .. }
    ));
    Ok(())
}

#[test]
fn test_group_by_having() -> Result<()> {
    let query = parse(
        "SELECT c.city, COUNT(*) FROM Customer c GROUP BY c.city HAVING COUNT(*) > 10",
    )?;
    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    assert_eq!(select.group_by.expect("GROUP BY").items.len(), 1);
    assert!(select.having.is_some());
    Ok(())
}

#[test]
fn test_unary_minus_literal() -> Result<()> {
    let query = parse("SELECT x FROM T WHERE x = -5")?;
    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    let condition = select.where_clause.expect("WHERE clause").condition;
    let Expression::Binary { right, .. } = condition else {
        return Err(anyhow!("expected binary condition"));
    };
    match *right {
        Expression::Unary { ref operand, .. } => {
            assert_eq!(**operand, Expression::Literal(Value::Integer(5)));
        }
        ref other => panic!("expected unary minus, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_entity_named_order_parses() -> Result<()> {
    // ORDER stays usable as an entity name while ORDER BY still works
    let query = parse("SELECT o.total FROM Order o ORDER BY o.total")?;
    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    assert_eq!(select.from.expect("FROM").items[0].entity_name, "Order");
    assert!(select.order_by.is_some());
    Ok(())
}

#[test]
fn test_join_kinds() -> Result<()> {
    let query = parse(
        "SELECT c.id FROM Customer c LEFT JOIN c.Orders o RIGHT OUTER JOIN o.Items i FULL JOIN i.Supplier s",
    )?;
    let Query::Select(select) = query else {
        return Err(anyhow!("expected SELECT query"));
    };
    let joins = select.from.expect("FROM").joins;
    assert_eq!(joins[0].join_type, JoinType::Left);
    assert_eq!(joins[1].join_type, JoinType::Right);
    assert_eq!(joins[2].join_type, JoinType::Full);
    Ok(())
}
