// Query Translation Module
//
// This module lowers a parsed entity query into dialect-specific
// parameterized SQL: dialect descriptors, the function registry, and the
// SQL emitter.

pub mod dialect;
pub mod emitter;
pub mod functions;

// Export key types
pub use self::dialect::Dialect;
pub use self::emitter::{CompiledQuery, ParamValues, TranslationError, Translator};
pub use self::functions::FunctionRegistry;
