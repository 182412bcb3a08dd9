use core::fmt;

use crate::api::{Diagnostic, Severity};
use crate::parser::Rule;
use crate::syntax::Span;

/// Malformed source text, identified by the name of the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub source_name: String,
    pub span: Span,
}

/// Specific kinds of syntax errors
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxErrorKind {
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// Numeric literal that does not fit a double
    InvalidNumber { text: String },
    /// Maximum nesting depth exceeded
    MaxDepthExceeded { depth: usize, max_depth: usize },
    /// Other syntax errors (catch-all for Pest errors we don't specifically handle)
    Other { message: String },
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, source_name: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            source_name: source_name.into(),
            span,
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            SyntaxErrorKind::UnexpectedToken { expected, found } => (
                format!("Expected {}, found {}", expected, found),
                "P001",
                vec![],
            ),
            SyntaxErrorKind::InvalidNumber { text } => (
                format!("Invalid number literal '{}'", text),
                "P002",
                vec!["Check the number format".to_string()],
            ),
            SyntaxErrorKind::MaxDepthExceeded { max_depth, .. } => (
                format!(
                    "Expression nesting depth exceeds maximum of {} levels",
                    max_depth
                ),
                "P003",
                vec!["Reduce nesting or simplify the expression".to_string()],
            ),
            SyntaxErrorKind::Other { message } => (message.clone(), "P999", vec![]),
        };

        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone(),
            help,
            code: Some(code.to_string()),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diagnostic = self.to_diagnostic();
        write!(
            f,
            "{}: {}: {}",
            self.source_name, diagnostic.severity, diagnostic.message
        )?;

        if let Some(ref code) = diagnostic.code {
            write!(f, " [{}]", code)?;
        }

        for help_msg in &diagnostic.help {
            write!(f, "\nhelp: {}", help_msg)?;
        }

        Ok(())
    }
}

impl std::error::Error for SyntaxError {}

/// Convert Pest error to human-readable SyntaxError
pub fn convert_pest_error(
    err: pest::error::Error<Rule>,
    source_name: &str,
    source: &str,
) -> SyntaxError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span::new(pos, pos),
        pest::error::InputLocation::Span((start, end)) => Span::new(start, end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError { positives, .. } => SyntaxErrorKind::UnexpectedToken {
            expected: format_expected_rules(&positives),
            found: describe_found(source, span.start()),
        },
        ErrorVariant::CustomError { message } => SyntaxErrorKind::Other { message },
    };

    SyntaxError::new(kind, source_name, span)
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    let mut concepts = Vec::new();

    for rule in rules {
        let concept = match rule {
            Rule::add | Rule::sub | Rule::mul | Rule::div | Rule::pow => "operator",
            Rule::EOI => "end of input",
            _ => "expression",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        None => "something else".to_string(),
        Some((only, [])) => only.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

/// Describe what sits at `pos` in the source.
fn describe_found(source: &str, pos: usize) -> String {
    match source.get(pos..).and_then(|rest| rest.chars().next()) {
        None => "end of input".to_string(),
        Some(c) => format!("'{}'", c),
    }
}
