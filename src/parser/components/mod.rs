// Parser Components
//
// The parser is split by production family: core state and primitives,
// expressions, SELECT, and DML.

pub mod parser_core;
pub mod parser_dml;
pub mod parser_expressions;
pub mod parser_select;

pub use self::parser_core::{ParseResult, Parser, SyntaxError};
pub use self::parser_dml::{parse_delete, parse_update};
pub use self::parser_expressions::parse_expression;
pub use self::parser_select::{parse_select, parse_select_query};
