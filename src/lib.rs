//! Formula - compile arithmetic formulas once, evaluate them many times
//!
//! # Overview
//!
//! A formula is a short program made of numbers, variables, the operators
//! `+ - * / ^`, assignments and a handful of keyword calls
//! (`sqrt`, `sq`, `inv`, `pow`, `neg`). Statements are separated by `;`.
//! Compiling turns the source into a flat stack-machine [`Program`] that
//! can be run against any number of variable tables without recompiling.
//!
//! # Quick Start
//!
//! ```
//! use formula::{Formula, VarTable};
//!
//! let formula = Formula::compile("energy", "e = m * sq(c); e / 2").unwrap();
//!
//! let mut vars: VarTable = [("m", 2.0), ("c", 3.0)].into_iter().collect();
//! assert_eq!(formula.evaluate(&mut vars).unwrap(), 9.0);
//! assert_eq!(vars.get("e"), Some(18.0));
//! ```
//!
//! # Lifecycle
//!
//! [`MathCompiler`] exposes the individual stages. It can be re-initialised
//! with new source at any time, which discards everything built before:
//!
//! ```
//! use formula::{MathCompiler, Status};
//!
//! let mut compiler = MathCompiler::new();
//! compiler.init("first", "1 + 2");
//! compiler.parse().unwrap();
//! assert_eq!(compiler.status(), Status::Parsed);
//!
//! compiler.init("second", "x * 2");
//! assert_eq!(compiler.program().unwrap().to_string(), "push x\npush 2\nmul\n");
//! ```
//!
//! # Errors
//!
//! Compilation failures carry [`Diagnostic`]s pointing into the source;
//! [`render_error_to_string`] and friends print them with source snippets.

mod error_renderer;

// Re-export public API from formula_core
pub use formula_core::api::{CompilerOptions, Diagnostic, Error, Formula, Severity};

pub use formula_core::compiler::{BytecodeCompiler, CompileError, KEYWORDS, MathCompiler, Status};
pub use formula_core::parser::{
    DEFAULT_MAX_DEPTH, SyntaxError, SyntaxErrorKind, parse, parse_with_max_depth,
};
pub use formula_core::syntax::{self, NodeId, NodeKind, Span, SyntaxTree};
pub use formula_core::vm::{self, ExecutionError, Instruction, Operand, Program, Stack, VarTable};

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
