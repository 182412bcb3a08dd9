//! Runtime execution errors.
//!
//! Execution never modifies the program, so after any of these a caller
//! can fix its bindings and run the same program again.

use super::Instruction;

/// Failure while running a program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    /// A `push` read a name that is not bound in the variable table.
    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String },

    /// An instruction needed more operands than the stack holds.
    #[error("stack underflow executing `{instruction}`")]
    StackUnderflow { instruction: Instruction },

    /// The program ran to completion but left nothing to read as a result.
    #[error("program left no value on the stack")]
    NoResult,
}
