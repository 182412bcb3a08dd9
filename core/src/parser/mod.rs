//! Formula parser.
//!
//! Turns source text into a [`SyntaxTree`](crate::syntax::SyntaxTree). The
//! grammar lives in `formula.pest`; operator precedence is resolved with a
//! Pratt parser so the grammar stays flat.

pub mod error;
#[allow(clippy::module_inception)]
pub mod parser;

// Re-export the parser and rule enum for external use
pub use parser::FormulaParser;
pub use parser::Rule;
pub use parser::{DEFAULT_MAX_DEPTH, parse, parse_with_max_depth};

pub use error::{SyntaxError, SyntaxErrorKind};
