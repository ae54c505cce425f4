// SQL Dialect Definitions
//
// This module names the supported target backends and their parameter
// placeholder conventions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target SQL flavor for translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// ANSI-flavored output with `:name` placeholders
    Generic,
    /// SQL Server: `@name` placeholders
    SqlServer,
    /// PostgreSQL: positional `$n` placeholders
    Postgres,
    /// SQLite: `:name` placeholders
    Sqlite,
}

impl Dialect {
    /// Stable lowercase name, also used as the function registry key
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::SqlServer => "sqlserver",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Resolve a dialect from its name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "generic" => Some(Dialect::Generic),
            "sqlserver" => Some(Dialect::SqlServer),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    /// Placeholder token for a named parameter.
    ///
    /// `ordinal` is the parameter's 1-based first-occurrence position, used
    /// by positional conventions; repeated use of one name keeps one
    /// ordinal.
    pub fn placeholder(&self, name: &str, ordinal: usize) -> String {
        match self {
            Dialect::SqlServer => format!("@{name}"),
            Dialect::Postgres => format!("${ordinal}"),
            Dialect::Generic | Dialect::Sqlite => format!(":{name}"),
        }
    }

    /// Whether the backend has a boolean literal; without one, booleans are
    /// emitted as 1/0
    pub fn supports_boolean_literals(&self) -> bool {
        !matches!(self, Dialect::SqlServer | Dialect::Sqlite)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
