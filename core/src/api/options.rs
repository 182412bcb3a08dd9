//! Configuration options for the formula compiler.

use crate::parser::DEFAULT_MAX_DEPTH;

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use formula_core::api::CompilerOptions;
///
/// let options = CompilerOptions { max_depth: 64 };
/// assert_eq!(options.max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Maximum nesting depth accepted by the parser.
    ///
    /// Counts parentheses, runs of prefix `-` and `^`, and the height of the
    /// syntax tree, so `1 + 1 + ... + 1` with more terms than this is
    /// rejected too. Parsing and code generation recurse at most this deep.
    ///
    /// Default: 256
    pub max_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
