//! Public error types for the formula API.
//!
//! Stage-specific errors ([`CompileError`], [`ExecutionError`]) are
//! converted to these types at the API boundary.

use core::fmt;

use crate::compiler::CompileError;
use crate::syntax::Span;
use crate::vm::ExecutionError;

/// Public error type for all formula operations.
#[derive(Debug)]
pub enum Error {
    /// The source could not be turned into a program.
    ///
    /// Carries the source so diagnostics can be rendered against it.
    Compilation {
        source_name: String,
        source: String,
        diagnostics: Vec<Diagnostic>,
    },

    /// Executing a compiled program failed.
    ///
    /// The program is still valid; retrying with corrected bindings works.
    Runtime(ExecutionError),
}

impl Error {
    pub fn compilation(source_name: &str, source: &str, err: &CompileError) -> Self {
        Error::Compilation {
            source_name: source_name.to_string(),
            source: source.to_string(),
            diagnostics: vec![err.to_diagnostic()],
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compilation {
                source_name,
                diagnostics,
                ..
            } => {
                let error_count = diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count();
                write!(
                    f,
                    "Compilation of `{}` failed with {} error(s)",
                    source_name, error_count
                )?;
                for diagnostic in diagnostics {
                    write!(f, "\n  {}: {}", diagnostic.severity, diagnostic.message)?;
                }
                Ok(())
            }
            Error::Runtime(err) => write!(f, "Runtime error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Compilation { .. } => None,
            Error::Runtime(err) => Some(err),
        }
    }
}

impl From<ExecutionError> for Error {
    fn from(err: ExecutionError) -> Self {
        Error::Runtime(err)
    }
}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Suggestions on how to fix the issue.
    pub help: Vec<String>,

    /// Optional error code (e.g., "C001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - compilation cannot succeed.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}
