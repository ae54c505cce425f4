// Query AST Implementation
//
// This module defines the AST nodes produced by the parser and consumed by
// the translator. Nodes are plain data; no behavior beyond accessors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed entity query
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(SelectQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
}

/// SELECT query representation
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub select: SelectClause,
    pub from: Option<FromClause>,
    pub where_clause: Option<WhereClause>,
    pub group_by: Option<GroupByClause>,
    pub having: Option<HavingClause>,
    pub order_by: Option<OrderByClause>,
}

/// UPDATE query representation
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub entity_name: String,
    pub alias: Option<String>,
    pub assignments: Vec<SetAssignment>,
    pub where_clause: Option<WhereClause>,
}

/// DELETE query representation
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    pub entity_name: String,
    pub alias: Option<String>,
    pub where_clause: Option<WhereClause>,
}

/// SELECT list with optional DISTINCT
#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub distinct: bool,
    pub items: Vec<SelectItem>,
}

/// One projected expression with an optional alias
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expression,
    pub alias: Option<String>,
}

/// FROM clause: root entities plus relationship joins
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub items: Vec<FromItem>,
    pub joins: Vec<JoinClause>,
}

/// One root entity reference in the FROM clause
#[derive(Debug, Clone, PartialEq)]
pub struct FromItem {
    pub entity_name: String,
    pub alias: Option<String>,
}

/// A join over a declared relationship property (`JOIN o.Customer c`).
///
/// `source_alias` names the entity being traversed from; whether
/// `relationship_name` actually is a relationship on it is checked during
/// translation, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub source_alias: String,
    pub relationship_name: String,
    pub alias: Option<String>,
    pub on_condition: Option<Expression>,
}

/// Supported join flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

/// WHERE clause condition
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub condition: Expression,
}

/// GROUP BY expressions
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByClause {
    pub items: Vec<Expression>,
}

/// HAVING clause condition
#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub condition: Expression,
}

/// ORDER BY items
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub items: Vec<OrderByItem>,
}

/// One sort key with its direction
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    pub direction: SortDirection,
}

/// Sort direction for an ORDER BY item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One `property = value` assignment in an UPDATE.
///
/// `property_name` is always a simple name; a qualifying alias in the
/// surface text is dropped at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct SetAssignment {
    pub property_name: String,
    pub value: Expression,
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Binary operation (comparison, logical, arithmetic)
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },
    /// Prefix operation
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    /// Entity property reference, optionally qualified by an alias
    Property {
        entity_alias: Option<String>,
        property_name: String,
    },
    /// Literal value
    Literal(Value),
    /// Bound parameter reference
    Parameter { name: String },
    /// `*` or `alias.*`
    Wildcard { entity_alias: Option<String> },
    /// Aggregate call; `argument` is None for `COUNT(*)`
    Aggregate {
        function_name: String,
        argument: Option<Box<Expression>>,
        distinct: bool,
    },
    /// Scalar or user-defined function call
    Function {
        function_name: String,
        arguments: Vec<Expression>,
    },
    /// Parenthesized SELECT in expression position
    Subquery(Box<SelectQuery>),
    /// `IS [NOT] NULL`
    IsNull {
        operand: Box<Expression>,
        negated: bool,
    },
    /// `[NOT] BETWEEN low AND high`
    Between {
        operand: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },
    /// `[NOT] IN (expr, ...)`
    InList {
        operand: Box<Expression>,
        items: Vec<Expression>,
        negated: bool,
    },
    /// `[NOT] IN (SELECT ...)`
    InSubquery {
        operand: Box<Expression>,
        query: Box<SelectQuery>,
        negated: bool,
    },
}

/// Literal values carried by expressions and parameter bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Binary operators, loosest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Like,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    /// SQL spelling of the operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            BinaryOp::Or => "OR",
            BinaryOp::And => "AND",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Like => "LIKE",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Like => 3,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 4,
            BinaryOp::Add | BinaryOp::Subtract => 5,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 6,
        }
    }
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Select(_) => write!(f, "SELECT query"),
            Query::Update(_) => write!(f, "UPDATE query"),
            Query::Delete(_) => write!(f, "DELETE query"),
        }
    }
}
