// Entity Query Parser Module
//
// This module is responsible for turning portable entity query text into an
// abstract syntax tree: lexer, AST node types, and the recursive-descent
// parser itself.

pub mod ast;
pub mod components;
pub mod lexer;
pub mod parser;

// Export key types
pub use self::ast::Query;
pub use self::components::{Parser, SyntaxError};
pub use self::lexer::{Lexer, LexicalError, Token, TokenKind};
