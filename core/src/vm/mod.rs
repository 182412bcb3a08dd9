//! Stack machine that runs compiled formulas.
//!
//! A [`Program`] is a flat, branch-free list of [`Instruction`]s. Running it
//! needs an operand [`Stack`] and a [`VarTable`], both owned by the caller,
//! so one program can be shared and executed from many places at once.

mod error;
mod instruction_set;
mod program;
mod stack;
mod var_table;

#[cfg(test)]
mod program_test;

pub use error::ExecutionError;
pub use instruction_set::{Instruction, Operand};
pub use program::Program;
pub use stack::Stack;
pub use var_table::VarTable;
