//! Compilation errors.

use crate::api::{Diagnostic, Severity};
use crate::compiler::Status;
use crate::parser::SyntaxError;
use crate::syntax::{IndexError, NodeKind, Span};

/// Errors raised while turning source into a program.
///
/// Any of these aborts the current stage and leaves the compiler's status
/// where it was. Nothing is retried; re-initialize with corrected source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// The compiler was asked for a program before being given source.
    #[error("no source to compile")]
    NoSource,

    /// The parser rejected the source.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A node names an operator or keyword the compiler does not know.
    #[error("unknown {kind} `{name}`")]
    UnknownOperator {
        name: String,
        kind: NodeKind,
        span: Span,
    },

    /// A node's argument count does not match what its name requires.
    #[error("`{name}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A constant node whose text is not a number.
    #[error("invalid constant `{text}`")]
    InvalidConstant { text: String, span: Span },

    /// The first argument of `=` is not a variable.
    #[error("cannot assign to {kind} `{target}`")]
    InvalidAssignmentTarget {
        target: String,
        kind: NodeKind,
        span: Span,
    },

    /// A lifecycle step was called out of order.
    #[error("cannot {operation} while the compiler is {status}")]
    InvalidState {
        operation: &'static str,
        status: Status,
    },

    /// Argument access past the end of a node.
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl CompileError {
    /// Convert to a Diagnostic for API boundary.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (span, code, help) = match self {
            CompileError::Syntax(err) => return err.to_diagnostic(),
            CompileError::NoSource => (
                Span::default(),
                "C001",
                vec!["Initialize the compiler with source text first".to_string()],
            ),
            CompileError::UnknownOperator { span, kind, .. } => (
                span.clone(),
                "C002",
                match kind {
                    NodeKind::Keyword => vec![format!(
                        "Known keywords: {}",
                        crate::compiler::KEYWORDS.join(", ")
                    )],
                    _ => vec![],
                },
            ),
            CompileError::ArityMismatch { span, .. } => (span.clone(), "C003", vec![]),
            CompileError::InvalidConstant { span, .. } => (
                span.clone(),
                "C004",
                vec!["Check the number format".to_string()],
            ),
            CompileError::InvalidAssignmentTarget { span, .. } => (
                span.clone(),
                "C005",
                vec!["Only variables can appear left of `=`".to_string()],
            ),
            CompileError::InvalidState { .. } => (Span::default(), "C006", vec![]),
            CompileError::Index(_) => (Span::default(), "C007", vec![]),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.to_string(),
            span,
            help,
            code: Some(code.to_string()),
        }
    }
}
