//! Core engine for compiling arithmetic formulas into stack-machine bytecode.
//!
//! The pipeline is: source text → [`parser::parse`] → [`syntax::SyntaxTree`]
//! → [`compiler::BytecodeCompiler`] → [`vm::Program`]. A program is built
//! once and then executed any number of times against a [`vm::Stack`] and a
//! [`vm::VarTable`] owned by the caller.
//!
//! [`compiler::MathCompiler`] drives the whole pipeline and keeps track of
//! where a given source is in its lifecycle.

pub mod api;
pub mod compiler;
pub mod parser;
pub mod syntax;
pub mod vm;
