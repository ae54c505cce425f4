// Entiql entity query language engine
//
// Compiles a portable, SQL-like query surface over logical entities into
// parameterized SQL for a chosen backend dialect:
// text -> Lexer -> Parser -> AST -> Translator -> (sql, parameters).

use thiserror::Error;

pub mod metadata;
pub mod parser;
pub mod translator;

// Re-export key items for convenient access
pub use metadata::{ColumnMeta, EntityMeta, MetadataLookup, MetadataRegistry, RelationshipMeta};
pub use parser::ast::{Query, Value};
pub use parser::{Lexer, LexicalError, Parser, SyntaxError, Token, TokenKind};
pub use translator::{
    CompiledQuery, Dialect, FunctionRegistry, ParamValues, TranslationError, Translator,
};

/// Any failure a compile call can produce, one variant per pipeline stage.
///
/// Each variant stays structurally inspectable; nothing is flattened into a
/// plain message. Errors are deterministic: the same input and metadata
/// snapshot reproduce the same failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Translation(#[from] TranslationError),
}

/// Compile one query text end to end.
///
/// Each call builds its own lexer, parser and translator; no state is shared
/// between calls, so concurrent compiles need no coordination.
pub fn compile(
    text: &str,
    dialect: Dialect,
    metadata: &dyn MetadataLookup,
    params: &ParamValues,
) -> Result<CompiledQuery, Error> {
    let mut parser = Parser::new(text)?;
    let query = parser.parse()?;
    let translator = Translator::new(dialect, metadata);
    Ok(translator.translate(&query, params)?)
}
