//! Public API for compiling and evaluating formulas.
//!
//! [`Formula`] is the one-call entry point: it runs the whole
//! parse → compile pipeline and keeps the source around so failures can be
//! reported as [`Diagnostic`]s pointing into it.
//!
//! # Example
//!
//! ```
//! use formula_core::api::Formula;
//! use formula_core::vm::VarTable;
//!
//! let formula = Formula::compile("gain", "y = a * x + b; y ^ 2").unwrap();
//!
//! let mut vars: VarTable = [("a", 2.0), ("x", 3.0), ("b", 1.0)].into_iter().collect();
//! assert_eq!(formula.evaluate(&mut vars).unwrap(), 49.0);
//! assert_eq!(vars.get("y"), Some(7.0));
//! ```

pub mod error;
pub mod formula;
pub mod options;

pub use error::{Diagnostic, Error, Severity};
pub use formula::Formula;
pub use options::CompilerOptions;
