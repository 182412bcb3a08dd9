//! Formula compiler.
//!
//! [`BytecodeCompiler`] lowers a [`SyntaxTree`](crate::syntax::SyntaxTree)
//! into a [`Program`](crate::vm::Program). [`MathCompiler`] drives the
//! whole pipeline for one source text and remembers how far it got.
//!
//! ## Design
//!
//! - Post-order traversal: arguments left to right, then the node itself
//! - Tracks stack depth precisely so programs can preallocate their stack
//! - Keywords map to short instruction sequences from a fixed table

mod bytecode;
mod error;
mod math_compiler;


#[cfg(test)]
mod math_compiler_test;

pub use bytecode::{BytecodeCompiler, KEYWORDS};
pub use error::CompileError;
pub use math_compiler::{MathCompiler, Status};
