// Function Registry Implementation
//
// This module maps portable function names to backend-specific SQL
// spellings. Only the translator consults it; parsing never does.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::dialect::Dialect;

/// Key for the dialect-independent fallback spelling
const DEFAULT_KEY: &str = "default";

// Process-wide registry with the built-in function table
static DEFAULT_REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::with_defaults);

/// Case-insensitive map from portable function name to per-dialect SQL
/// spellings
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, HashMap<String, String>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry holding the built-in function table
    pub fn global() -> &'static FunctionRegistry {
        &DEFAULT_REGISTRY
    }

    /// Create a registry pre-populated with the built-in functions
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Aggregates spell the same everywhere
        for name in ["COUNT", "SUM", "AVG", "MIN", "MAX"] {
            registry.register_default(name, name);
        }

        // String functions
        for name in ["UPPER", "LOWER", "TRIM", "CONCAT"] {
            registry.register_default(name, name);
        }
        registry.register_default("LENGTH", "LENGTH");
        registry.register("LENGTH", Dialect::SqlServer.name(), "LEN");
        registry.register_default("SUBSTRING", "SUBSTRING");
        registry.register("SUBSTRING", Dialect::Sqlite.name(), "SUBSTR");

        // Date part extraction
        for name in ["YEAR", "MONTH", "DAY", "HOUR", "MINUTE", "SECOND"] {
            registry.register_default(name, name);
        }
        registry.register_default("NOW", "NOW");
        registry.register("NOW", Dialect::SqlServer.name(), "GETDATE");
        registry.register("NOW", Dialect::Sqlite.name(), "CURRENT_TIMESTAMP");

        registry
    }

    /// Register a dialect-specific spelling for a portable function name
    pub fn register(&mut self, name: &str, dialect: &str, spelling: &str) {
        self.functions
            .entry(name.to_ascii_uppercase())
            .or_default()
            .insert(dialect.to_string(), spelling.to_string());
    }

    /// Register the fallback spelling for a portable function name
    pub fn register_default(&mut self, name: &str, spelling: &str) {
        self.register(name, DEFAULT_KEY, spelling);
    }

    /// Whether a portable function name is known to the registry
    pub fn is_registered(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_uppercase())
    }

    /// Resolve a portable function name for the given dialect.
    ///
    /// Resolution order: exact dialect entry, then the default entry, then
    /// the original name verbatim. Unregistered names are never an error, so
    /// backend-specific functions pass through untouched.
    pub fn resolve(&self, name: &str, dialect: Dialect) -> String {
        if let Some(spellings) = self.functions.get(&name.to_ascii_uppercase()) {
            if let Some(spelling) = spellings.get(dialect.name()) {
                return spelling.clone();
            }
            if let Some(spelling) = spellings.get(DEFAULT_KEY) {
                return spelling.clone();
            }
        }
        name.to_string()
    }
}
