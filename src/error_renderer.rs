//! Error rendering using ariadne
//!
//! Compilation errors are printed with a snippet of the offending source,
//! labelled with the diagnostic span. Runtime errors have no source
//! location and are printed as a single line.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render an error to stderr
///
/// # Example
/// ```no_run
/// use formula::{Formula, render_error};
///
/// if let Err(e) = Formula::compile("input", "1 + * 2") {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs, UIs, etc.)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes
///
/// Same as `render_error_to_string` but without ANSI color codes, so the
/// output is easy to compare in tests.
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compilation {
            source_name,
            source,
            diagnostics,
        } => render_diagnostics(source_name, source, diagnostics, writer, use_color),
        Error::Runtime(err) => writeln!(writer, "Runtime error: {}", err),
    }
}

fn render_diagnostics(
    source_name: &str,
    source: &str,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };

        let span = clamp(diag.span.0.clone(), source.len());
        let mut report = Report::build(kind, (source_name, span.clone()))
            .with_message(&diag.message)
            .with_config(
                ariadne::Config::default()
                    .with_color(use_color)
                    .with_index_type(ariadne::IndexType::Byte),
            );

        if let Some(code) = &diag.code {
            report = report.with_code(code);
        }

        report = report.with_label(
            Label::new((source_name, span))
                .with_message(&diag.message)
                .with_color(colors.next()),
        );

        for help_msg in &diag.help {
            report = report.with_help(help_msg);
        }

        report
            .finish()
            .write((source_name, Source::from(source)), &mut *writer)?;
    }

    Ok(())
}

/// Keep spans inside the source; errors without a location point at the start.
fn clamp(span: std::ops::Range<usize>, len: usize) -> std::ops::Range<usize> {
    let start = span.start.min(len);
    start..span.end.clamp(start, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Formula, VarTable};

    #[test]
    fn test_render_parse_error() {
        let err = Formula::compile("input", "1 + * 2").unwrap_err();
        let output = render_error_to_string_no_color(&err);

        assert!(output.contains("Error"));
        assert!(output.contains("P001"));
        assert!(output.contains("1 + * 2"));
        assert!(output.contains("input"));
    }

    #[test]
    fn test_render_unknown_keyword_with_help() {
        let err = Formula::compile("calc", "cube(3)").unwrap_err();
        let output = render_error_to_string_no_color(&err);

        assert!(output.contains("unknown keyword `cube`"));
        assert!(output.contains("Known keywords: inv, neg, pow, sq, sqrt"));
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_render_runtime_error() {
        let formula = Formula::compile("calc", "x").unwrap();
        let err = formula.evaluate(&mut VarTable::new()).unwrap_err();
        assert_eq!(
            render_error_to_string_no_color(&err),
            "Runtime error: undefined variable `x`\n"
        );
    }

    #[test]
    fn test_render_label_after_non_ascii_text() {
        let err = Formula::compile("input", "π + 1 + * 2").unwrap_err();
        let Error::Compilation { diagnostics, .. } = &err else {
            panic!("expected a compilation error, got {err:?}");
        };
        assert_eq!(&"π + 1 + * 2"[diagnostics[0].span.0.clone()], "*");

        let output = render_error_to_string_no_color(&err);
        let lines: Vec<&str> = output.lines().collect();
        let source_line = lines
            .iter()
            .position(|line| line.contains("π + 1 + * 2"))
            .expect("source line is rendered");
        let source_col = lines[source_line].chars().position(|c| c == '*').unwrap();
        let marker_col = lines[source_line + 1]
            .chars()
            .position(|c| c == '┬')
            .expect("label marker under the source line");
        assert_eq!(marker_col, source_col);
    }

    #[test]
    fn test_color_toggle() {
        let err = Formula::compile("input", "1 + * 2").unwrap_err();
        assert!(!render_error_to_string_no_color(&err).contains('\u{1b}'));
        assert!(render_error_to_string(&err).contains('\u{1b}'));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(2..5, 10), 2..5);
        assert_eq!(clamp(8..20, 10), 8..10);
        assert_eq!(clamp(0..0, 0), 0..0);
        assert_eq!(clamp(12..14, 10), 10..10);
    }
}
