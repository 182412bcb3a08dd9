//! Tests for the compiler lifecycle.

use indoc::indoc;
use pretty_assertions::assert_eq;

use super::{CompileError, MathCompiler, Status};
use crate::api::CompilerOptions;
use crate::parser::SyntaxErrorKind;
use crate::test_utils::init_test_logging;
use crate::vm::VarTable;

#[test]
fn test_uninitialised_has_no_source() {
    let mut compiler = MathCompiler::new();
    assert_eq!(compiler.status(), Status::Uninitialised);
    assert_eq!(compiler.source_name(), None);
    assert!(compiler.syntax_tree().is_none());

    assert_eq!(compiler.parse(), Err(CompileError::NoSource));
    assert_eq!(compiler.compile(), Err(CompileError::NoSource));
    assert_eq!(compiler.program().unwrap_err(), CompileError::NoSource);
    assert_eq!(compiler.status(), Status::Uninitialised);
}

#[test]
fn test_step_by_step() {
    init_test_logging();

    let mut compiler = MathCompiler::with_source("sum", "1 + 2");
    assert_eq!(compiler.status(), Status::Initialised);
    assert_eq!(compiler.source_name(), Some("sum"));
    assert_eq!(compiler.source_text(), Some("1 + 2"));

    compiler.parse().unwrap();
    assert_eq!(compiler.status(), Status::Parsed);
    let tree = compiler.syntax_tree().unwrap();
    assert_eq!(tree.roots().len(), 1);
    assert_eq!(tree.render(tree.roots()[0]), "(+ 1 2)");

    compiler.compile().unwrap();
    assert_eq!(compiler.status(), Status::Compiled);
    assert_eq!(
        compiler.program().unwrap().to_string(),
        indoc! {"
            push 1
            push 2
            add
        "}
    );
}

#[test]
fn test_out_of_order_steps() {
    let mut compiler = MathCompiler::with_source("f", "x");

    assert_eq!(
        compiler.compile(),
        Err(CompileError::InvalidState {
            operation: "compile",
            status: Status::Initialised,
        })
    );
    assert_eq!(compiler.status(), Status::Initialised);

    compiler.parse().unwrap();
    assert_eq!(
        compiler.parse(),
        Err(CompileError::InvalidState {
            operation: "parse",
            status: Status::Parsed,
        })
    );

    compiler.compile().unwrap();
    assert_eq!(
        compiler.compile(),
        Err(CompileError::InvalidState {
            operation: "compile",
            status: Status::Compiled,
        })
    );
    assert_eq!(compiler.status(), Status::Compiled);

    let err = compiler.parse().unwrap_err();
    assert_eq!(err.to_string(), "cannot parse while the compiler is compiled");
}

#[test]
fn test_program_drives_remaining_stages() {
    let mut compiler = MathCompiler::with_source("f", "2 * 3");
    let first = compiler.program().unwrap().clone();
    assert_eq!(compiler.status(), Status::Compiled);

    let second = compiler.program().unwrap().clone();
    assert_eq!(first, second);

    let mut compiler = MathCompiler::with_source("f", "2 * 3");
    compiler.parse().unwrap();
    assert_eq!(compiler.program().unwrap(), &first);
}

#[test]
fn test_reinit_discards_previous_program() {
    let mut compiler = MathCompiler::with_source("first", "x = 5; x + 1");
    assert_eq!(compiler.program().unwrap().len(), 5);

    compiler.init("second", "2 * 3");
    assert_eq!(compiler.status(), Status::Initialised);
    assert_eq!(compiler.source_name(), Some("second"));
    assert!(compiler.syntax_tree().is_none());

    assert_eq!(
        compiler.program().unwrap().to_string(),
        indoc! {"
            push 2
            push 3
            mul
        "}
    );
}

#[test]
fn test_syntax_error_leaves_status() {
    let mut compiler = MathCompiler::with_source("broken", "1 +");

    let err = compiler.parse().unwrap_err();
    match &err {
        CompileError::Syntax(syntax) => assert_eq!(syntax.source_name, "broken"),
        other => panic!("expected a syntax error, got {:?}", other),
    }
    assert_eq!(compiler.status(), Status::Initialised);
    assert_eq!(compiler.source_text(), Some("1 +"));

    // No retry happens on its own.
    assert_eq!(compiler.program().unwrap_err(), err);

    compiler.init("fixed", "1 + 1");
    let mut vars = VarTable::new();
    assert_eq!(compiler.program().unwrap().evaluate(&mut vars), Ok(2.0));
}

#[test]
fn test_compile_error_leaves_status() {
    let mut compiler = MathCompiler::with_source("f", "1 + frobnicate(2)");
    compiler.parse().unwrap();

    assert!(matches!(
        compiler.compile(),
        Err(CompileError::UnknownOperator { ref name, .. }) if name == "frobnicate"
    ));
    assert_eq!(compiler.status(), Status::Parsed);
    assert!(compiler.syntax_tree().is_some());
}

#[test]
fn test_depth_limit_from_options() {
    let mut compiler = MathCompiler::with_options(CompilerOptions { max_depth: 2 });
    compiler.init("shallow", "(1)");
    assert!(compiler.program().is_ok());

    compiler.init("deep", "((1))");
    match compiler.parse().unwrap_err() {
        CompileError::Syntax(err) => assert_eq!(
            err.kind,
            SyntaxErrorKind::MaxDepthExceeded {
                depth: 3,
                max_depth: 2
            }
        ),
        other => panic!("expected a depth error, got {:?}", other),
    }
    assert_eq!(compiler.options().max_depth, 2);
}

#[test]
fn test_into_program() {
    let program = MathCompiler::with_source("f", "a - b").into_program().unwrap();
    let mut vars: VarTable = [("a", 10.0), ("b", 4.0)].into_iter().collect();
    assert_eq!(program.evaluate(&mut vars), Ok(6.0));

    assert_eq!(
        MathCompiler::new().into_program(),
        Err(CompileError::NoSource)
    );
}

#[test]
fn test_status_display() {
    let names: Vec<String> = [
        Status::Uninitialised,
        Status::Initialised,
        Status::Parsed,
        Status::Compiled,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(names, ["uninitialised", "initialised", "parsed", "compiled"]);
}
