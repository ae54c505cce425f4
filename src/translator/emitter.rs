// SQL Emitter Implementation
//
// This module walks a parsed query, resolves logical names through the
// injected metadata lookup, rewrites function names through the registry,
// and emits dialect-specific parameterized SQL. All emission state is local
// to one translate call.

use std::collections::HashMap;

use linked_hash_map::LinkedHashMap;
use log::debug;
use thiserror::Error;

use crate::metadata::MetadataLookup;
use crate::parser::ast::*;

use super::dialect::Dialect;
use super::functions::FunctionRegistry;

/// Translation-time errors: names the parser accepted that the metadata
/// snapshot cannot resolve, plus unbound parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    #[error("unknown entity '{entity}'")]
    UnknownEntity { entity: String },
    #[error("unknown property '{property}' on entity '{entity}'")]
    UnknownProperty {
        entity: String,
        property: String,
        alias: Option<String>,
    },
    #[error("unknown relationship '{relationship}' on entity '{entity}'")]
    UnknownRelationship {
        entity: String,
        relationship: String,
        alias: Option<String>,
    },
    #[error("unknown alias '{alias}'")]
    UnknownAlias { alias: String },
    #[error("no value supplied for parameter ':{name}'")]
    MissingParameter { name: String },
    #[error("no entity in scope for '{name}'")]
    NoEntityInScope { name: String },
}

/// Result type for translation operations
pub type TranslationResult<T> = Result<T, TranslationError>;

/// Bound parameter values supplied by the caller, keyed by logical name
#[derive(Debug, Clone, Default)]
pub struct ParamValues {
    values: HashMap<String, Value>,
}

impl ParamValues {
    /// Create an empty value bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under a logical parameter name
    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Get the value bound under a name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// A translated query: SQL text with dialect placeholders, plus the bound
/// values in first-occurrence order. No literal user-supplied value ever
/// appears in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub parameters: LinkedHashMap<String, Value>,
}

/// Lowers a query AST into dialect-specific parameterized SQL
pub struct Translator<'a> {
    dialect: Dialect,
    metadata: &'a dyn MetadataLookup,
    functions: &'a FunctionRegistry,
}

// Per-call emission state
struct EmitContext<'v> {
    values: &'v ParamValues,
    parameters: LinkedHashMap<String, Value>,
    frames: Vec<ScopeFrame>,
}

// One alias scope; subqueries push their own frame on top
struct ScopeFrame {
    /// (alias, entity) pairs in declaration order; the first is the root
    aliases: Vec<(String, String)>,
    /// Whether column references in this scope are alias-qualified
    qualify: bool,
}

impl ScopeFrame {
    fn lookup(&self, alias: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, entity)| entity.as_str())
    }

    fn root(&self) -> Option<(&str, &str)> {
        self.aliases
            .first()
            .map(|(alias, entity)| (alias.as_str(), entity.as_str()))
    }
}

// FROM clause resolved against metadata, ready to print
struct FromParts<'q> {
    frame: ScopeFrame,
    tables: Vec<String>,
    joins: Vec<RenderedJoin<'q>>,
}

struct RenderedJoin<'q> {
    sql: String,
    on_condition: Option<&'q Expression>,
}

impl<'a> Translator<'a> {
    /// Create a translator using the built-in function registry
    pub fn new(dialect: Dialect, metadata: &'a dyn MetadataLookup) -> Self {
        Translator {
            dialect,
            metadata,
            functions: FunctionRegistry::global(),
        }
    }

    /// Create a translator with a caller-supplied function registry
    pub fn with_functions(
        dialect: Dialect,
        metadata: &'a dyn MetadataLookup,
        functions: &'a FunctionRegistry,
    ) -> Self {
        Translator {
            dialect,
            metadata,
            functions,
        }
    }

    /// Translate a query into SQL text and its ordered parameter bindings
    pub fn translate(&self, query: &Query, values: &ParamValues) -> TranslationResult<CompiledQuery> {
        let mut ctx = EmitContext {
            values,
            parameters: LinkedHashMap::new(),
            frames: Vec::new(),
        };

        let sql = match query {
            Query::Select(select) => self.emit_select(select, &mut ctx)?,
            Query::Update(update) => self.emit_update(update, &mut ctx)?,
            Query::Delete(delete) => self.emit_delete(delete, &mut ctx)?,
        };

        debug!(
            "compiled {} for dialect {}: {} ({} parameters)",
            query,
            self.dialect,
            sql,
            ctx.parameters.len()
        );

        Ok(CompiledQuery {
            sql,
            parameters: ctx.parameters,
        })
    }

    fn emit_select(&self, query: &SelectQuery, ctx: &mut EmitContext) -> TranslationResult<String> {
        let FromParts {
            frame,
            tables,
            joins,
        } = self.resolve_from(query.from.as_ref())?;
        ctx.frames.push(frame);

        let mut sql = String::from("SELECT ");
        if query.select.distinct {
            sql.push_str("DISTINCT ");
        }
        for (i, item) in query.select.items.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&self.emit_expression(&item.expr, ctx)?);
            if let Some(alias) = &item.alias {
                sql.push_str(" AS ");
                sql.push_str(alias);
            }
        }

        if !tables.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&tables.join(", "));
            for join in &joins {
                sql.push(' ');
                sql.push_str(&join.sql);
                if let Some(condition) = join.on_condition {
                    sql.push_str(" AND ");
                    let rendered = self.emit_expression(condition, ctx)?;
                    if matches!(condition, Expression::Binary { op, .. } if op.precedence() <= BinaryOp::And.precedence())
                    {
                        sql.push_str(&format!("({rendered})"));
                    } else {
                        sql.push_str(&rendered);
                    }
                }
            }
        }

        if let Some(where_clause) = &query.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&self.emit_expression(&where_clause.condition, ctx)?);
        }

        if let Some(group_by) = &query.group_by {
            sql.push_str(" GROUP BY ");
            for (i, item) in group_by.items.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&self.emit_expression(item, ctx)?);
            }
        }

        if let Some(having) = &query.having {
            sql.push_str(" HAVING ");
            sql.push_str(&self.emit_expression(&having.condition, ctx)?);
        }

        if let Some(order_by) = &query.order_by {
            sql.push_str(" ORDER BY ");
            for (i, item) in order_by.items.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&self.emit_expression(&item.expr, ctx)?);
                if item.direction == SortDirection::Desc {
                    sql.push_str(" DESC");
                }
            }
        }

        ctx.frames.pop();
        Ok(sql)
    }

    fn emit_update(&self, query: &UpdateQuery, ctx: &mut EmitContext) -> TranslationResult<String> {
        let meta = self
            .metadata
            .entity(&query.entity_name)
            .ok_or_else(|| TranslationError::UnknownEntity {
                entity: query.entity_name.clone(),
            })?;

        let alias = query
            .alias
            .clone()
            .unwrap_or_else(|| query.entity_name.clone());
        ctx.frames.push(ScopeFrame {
            aliases: vec![(alias, query.entity_name.clone())],
            qualify: false,
        });

        let mut sql = format!("UPDATE {} SET ", meta.table_ref());
        for (i, assignment) in query.assignments.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            let column = self
                .metadata
                .column(&query.entity_name, &assignment.property_name)
                .ok_or_else(|| TranslationError::UnknownProperty {
                    entity: query.entity_name.clone(),
                    property: assignment.property_name.clone(),
                    alias: query.alias.clone(),
                })?;
            sql.push_str(&column.column);
            sql.push_str(" = ");
            sql.push_str(&self.emit_expression(&assignment.value, ctx)?);
        }

        if let Some(where_clause) = &query.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&self.emit_expression(&where_clause.condition, ctx)?);
        }

        ctx.frames.pop();
        Ok(sql)
    }

    fn emit_delete(&self, query: &DeleteQuery, ctx: &mut EmitContext) -> TranslationResult<String> {
        let meta = self
            .metadata
            .entity(&query.entity_name)
            .ok_or_else(|| TranslationError::UnknownEntity {
                entity: query.entity_name.clone(),
            })?;

        let alias = query
            .alias
            .clone()
            .unwrap_or_else(|| query.entity_name.clone());
        ctx.frames.push(ScopeFrame {
            aliases: vec![(alias, query.entity_name.clone())],
            qualify: false,
        });

        let mut sql = format!("DELETE FROM {}", meta.table_ref());
        if let Some(where_clause) = &query.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&self.emit_expression(&where_clause.condition, ctx)?);
        }

        ctx.frames.pop();
        Ok(sql)
    }

    /// Resolve the FROM clause against metadata: alias scope, printable
    /// table references, and relationship joins lowered to ON conditions.
    ///
    /// Single-entity queries with no joins stay unaliased; as soon as a join
    /// or a second root entity appears, aliases are kept and every column
    /// reference is qualified.
    fn resolve_from<'q>(&self, from: Option<&'q FromClause>) -> TranslationResult<FromParts<'q>> {
        let mut frame = ScopeFrame {
            aliases: Vec::new(),
            qualify: false,
        };
        let mut tables = Vec::new();
        let mut joins = Vec::new();

        let Some(from) = from else {
            return Ok(FromParts {
                frame,
                tables,
                joins,
            });
        };

        frame.qualify = !from.joins.is_empty() || from.items.len() > 1;

        for item in &from.items {
            let meta = self
                .metadata
                .entity(&item.entity_name)
                .ok_or_else(|| TranslationError::UnknownEntity {
                    entity: item.entity_name.clone(),
                })?;
            let alias = item
                .alias
                .clone()
                .unwrap_or_else(|| item.entity_name.clone());
            if frame.qualify {
                tables.push(format!("{} {}", meta.table_ref(), alias));
            } else {
                tables.push(meta.table_ref());
            }
            frame.aliases.push((alias, item.entity_name.clone()));
        }

        for join in &from.joins {
            let source_entity = frame
                .lookup(&join.source_alias)
                .ok_or_else(|| TranslationError::UnknownAlias {
                    alias: join.source_alias.clone(),
                })?
                .to_string();
            let rel = self
                .metadata
                .relationship(&source_entity, &join.relationship_name)
                .ok_or_else(|| TranslationError::UnknownRelationship {
                    entity: source_entity.clone(),
                    relationship: join.relationship_name.clone(),
                    alias: Some(join.source_alias.clone()),
                })?;
            let target = self
                .metadata
                .entity(&rel.target_entity)
                .ok_or_else(|| TranslationError::UnknownEntity {
                    entity: rel.target_entity.clone(),
                })?;

            let alias = join
                .alias
                .clone()
                .unwrap_or_else(|| join.relationship_name.clone());
            let keyword = match join.join_type {
                JoinType::Inner => "INNER JOIN",
                JoinType::Left => "LEFT JOIN",
                JoinType::Right => "RIGHT JOIN",
                JoinType::Full => "FULL JOIN",
            };
            let sql = format!(
                "{keyword} {} {alias} ON {alias}.{} = {}.{}",
                target.table_ref(),
                rel.target_column,
                join.source_alias,
                rel.source_column,
            );
            joins.push(RenderedJoin {
                sql,
                on_condition: join.on_condition.as_ref(),
            });
            frame.aliases.push((alias, rel.target_entity.clone()));
        }

        Ok(FromParts {
            frame,
            tables,
            joins,
        })
    }

    /// Emit one expression; exhaustive over every node variant
    fn emit_expression(&self, expr: &Expression, ctx: &mut EmitContext) -> TranslationResult<String> {
        match expr {
            Expression::Binary { left, op, right } => {
                let lhs = self.emit_operand(left, op.precedence(), false, ctx)?;
                let rhs = self.emit_operand(right, op.precedence(), true, ctx)?;
                Ok(format!("{lhs} {} {rhs}", op.as_sql()))
            }
            Expression::Unary { op, operand } => {
                let mut inner = self.emit_expression(operand, ctx)?;
                if matches!(**operand, Expression::Binary { .. }) {
                    inner = format!("({inner})");
                }
                Ok(match op {
                    UnaryOp::Plus => format!("+{inner}"),
                    UnaryOp::Minus => format!("-{inner}"),
                    UnaryOp::Not => format!("NOT {inner}"),
                })
            }
            Expression::Property {
                entity_alias,
                property_name,
            } => self.resolve_property(entity_alias.as_deref(), property_name, ctx),
            Expression::Literal(value) => Ok(self.emit_literal(value)),
            Expression::Parameter { name } => self.emit_parameter(name, ctx),
            Expression::Wildcard { entity_alias } => match entity_alias {
                Some(alias) => {
                    for frame in ctx.frames.iter().rev() {
                        if frame.lookup(alias).is_some() {
                            return Ok(if frame.qualify {
                                format!("{alias}.*")
                            } else {
                                "*".to_string()
                            });
                        }
                    }
                    Err(TranslationError::UnknownAlias {
                        alias: alias.clone(),
                    })
                }
                None => Ok("*".to_string()),
            },
            Expression::Aggregate {
                function_name,
                argument,
                distinct,
            } => {
                let resolved = self.functions.resolve(function_name, self.dialect);
                let arg = match argument {
                    Some(argument) => self.emit_expression(argument, ctx)?,
                    None => "*".to_string(),
                };
                if *distinct {
                    Ok(format!("{resolved}(DISTINCT {arg})"))
                } else {
                    Ok(format!("{resolved}({arg})"))
                }
            }
            Expression::Function {
                function_name,
                arguments,
            } => {
                let resolved = self.functions.resolve(function_name, self.dialect);
                // CURRENT_TIMESTAMP is a keyword, not a callable
                if arguments.is_empty() && resolved == "CURRENT_TIMESTAMP" {
                    return Ok(resolved);
                }
                let mut rendered = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    rendered.push(self.emit_expression(argument, ctx)?);
                }
                Ok(format!("{resolved}({})", rendered.join(", ")))
            }
            Expression::Subquery(query) => Ok(format!("({})", self.emit_select(query, ctx)?)),
            Expression::IsNull { operand, negated } => {
                let target = self.emit_operand(operand, BinaryOp::Eq.precedence(), false, ctx)?;
                if *negated {
                    Ok(format!("{target} IS NOT NULL"))
                } else {
                    Ok(format!("{target} IS NULL"))
                }
            }
            Expression::Between {
                operand,
                low,
                high,
                negated,
            } => {
                let target = self.emit_operand(operand, BinaryOp::Eq.precedence(), false, ctx)?;
                let low = self.emit_operand(low, BinaryOp::Eq.precedence(), true, ctx)?;
                let high = self.emit_operand(high, BinaryOp::Eq.precedence(), true, ctx)?;
                let not = if *negated { "NOT " } else { "" };
                Ok(format!("{target} {not}BETWEEN {low} AND {high}"))
            }
            Expression::InList {
                operand,
                items,
                negated,
            } => {
                let target = self.emit_operand(operand, BinaryOp::Eq.precedence(), false, ctx)?;
                let mut rendered = Vec::with_capacity(items.len());
                for item in items {
                    rendered.push(self.emit_expression(item, ctx)?);
                }
                let not = if *negated { "NOT " } else { "" };
                Ok(format!("{target} {not}IN ({})", rendered.join(", ")))
            }
            Expression::InSubquery {
                operand,
                query,
                negated,
            } => {
                let target = self.emit_operand(operand, BinaryOp::Eq.precedence(), false, ctx)?;
                let subquery = self.emit_select(query, ctx)?;
                let not = if *negated { "NOT " } else { "" };
                Ok(format!("{target} {not}IN ({subquery})"))
            }
        }
    }

    /// Emit a child expression, adding parentheses when it binds looser
    /// than its parent (or equally on the right of a left-associative chain)
    fn emit_operand(
        &self,
        expr: &Expression,
        parent_precedence: u8,
        right: bool,
        ctx: &mut EmitContext,
    ) -> TranslationResult<String> {
        let sql = self.emit_expression(expr, ctx)?;
        let child_precedence = match expr {
            Expression::Binary { op, .. } => Some(op.precedence()),
            Expression::IsNull { .. }
            | Expression::Between { .. }
            | Expression::InList { .. }
            | Expression::InSubquery { .. } => Some(BinaryOp::Eq.precedence()),
            _ => None,
        };
        let needs_parens = child_precedence
            .is_some_and(|p| p < parent_precedence || (right && p == parent_precedence));
        if needs_parens {
            Ok(format!("({sql})"))
        } else {
            Ok(sql)
        }
    }

    /// Resolve a property reference to a column, qualified per the scope it
    /// lands in. Unqualified names resolve against the innermost root entity.
    fn resolve_property(
        &self,
        alias: Option<&str>,
        property: &str,
        ctx: &EmitContext,
    ) -> TranslationResult<String> {
        match alias {
            Some(alias_name) => {
                for frame in ctx.frames.iter().rev() {
                    if let Some(entity) = frame.lookup(alias_name) {
                        let column = self.metadata.column(entity, property).ok_or_else(|| {
                            TranslationError::UnknownProperty {
                                entity: entity.to_string(),
                                property: property.to_string(),
                                alias: Some(alias_name.to_string()),
                            }
                        })?;
                        return Ok(if frame.qualify {
                            format!("{alias_name}.{}", column.column)
                        } else {
                            column.column.clone()
                        });
                    }
                }
                Err(TranslationError::UnknownAlias {
                    alias: alias_name.to_string(),
                })
            }
            None => {
                for frame in ctx.frames.iter().rev() {
                    if let Some((root_alias, entity)) = frame.root() {
                        let column = self.metadata.column(entity, property).ok_or_else(|| {
                            TranslationError::UnknownProperty {
                                entity: entity.to_string(),
                                property: property.to_string(),
                                alias: None,
                            }
                        })?;
                        return Ok(if frame.qualify {
                            format!("{root_alias}.{}", column.column)
                        } else {
                            column.column.clone()
                        });
                    }
                }
                Err(TranslationError::NoEntityInScope {
                    name: property.to_string(),
                })
            }
        }
    }

    /// Rewrite a parameter into the dialect's placeholder, binding its value
    /// on first use. Repeated use of one name keeps one binding.
    fn emit_parameter(&self, name: &str, ctx: &mut EmitContext) -> TranslationResult<String> {
        if !ctx.parameters.contains_key(name) {
            let value = ctx
                .values
                .get(name)
                .cloned()
                .ok_or_else(|| TranslationError::MissingParameter {
                    name: name.to_string(),
                })?;
            ctx.parameters.insert(name.to_string(), value);
        }
        let ordinal = ctx
            .parameters
            .keys()
            .position(|key| key == name)
            .map_or(ctx.parameters.len(), |i| i + 1);
        Ok(self.dialect.placeholder(name, ordinal))
    }

    /// Emit a literal from the query text; strings keep the `''` escape
    fn emit_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => {
                if self.dialect.supports_boolean_literals() {
                    if *b { "TRUE" } else { "FALSE" }.to_string()
                } else if *b {
                    "1".to_string()
                } else {
                    "0".to_string()
                }
            }
            Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}
