//! Compiled formulas.

use core::fmt;

use super::{CompilerOptions, Error};
use crate::compiler::MathCompiler;
use crate::vm::{Program, Stack, VarTable};

/// A compiled formula ready for execution.
///
/// Owns its bytecode and the source it came from. Executing never changes
/// the formula, so one instance can be evaluated any number of times and
/// shared between threads, as long as each execution brings its own
/// variable table.
///
/// # Example
///
/// ```
/// use formula_core::api::Formula;
/// use formula_core::vm::VarTable;
///
/// let formula = Formula::compile("area", "pi * sq(r)").unwrap();
///
/// let mut vars: VarTable = [("pi", 3.0), ("r", 2.0)].into_iter().collect();
/// assert_eq!(formula.evaluate(&mut vars).unwrap(), 12.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source_name: String,
    source: String,
    program: Program,
}

impl Formula {
    /// Parse and compile `source` with default options.
    ///
    /// `source_name` identifies the formula in diagnostics.
    pub fn compile(source_name: &str, source: &str) -> Result<Self, Error> {
        Self::compile_with_options(source_name, source, CompilerOptions::default())
    }

    pub fn compile_with_options(
        source_name: &str,
        source: &str,
        options: CompilerOptions,
    ) -> Result<Self, Error> {
        let mut compiler = MathCompiler::with_options(options);
        compiler.init(source_name, source);
        let program = compiler
            .into_program()
            .map_err(|err| Error::compilation(source_name, source, &err))?;

        Ok(Self {
            source_name: source_name.to_string(),
            source: source.to_string(),
            program,
        })
    }

    /// Run on a fresh stack and return the value left on top.
    pub fn evaluate(&self, vars: &mut VarTable) -> Result<f64, Error> {
        Ok(self.program.evaluate(vars)?)
    }

    /// Run against a caller-owned stack, leaving results on it.
    ///
    /// Whatever ran before a failure stays applied to `stack` and `vars`.
    pub fn execute(&self, stack: &mut Stack<f64>, vars: &mut VarTable) -> Result<(), Error> {
        Ok(self.program.execute(stack, vars)?)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Formula {
    /// The bytecode listing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.program, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Severity;
    use crate::syntax::Span;
    use crate::vm::ExecutionError;

    #[test]
    fn test_compile_and_evaluate() {
        let formula = Formula::compile("line", "a * x + b").unwrap();
        assert_eq!(formula.source_name(), "line");
        assert_eq!(formula.source(), "a * x + b");

        let mut vars: VarTable = [("a", 2.0), ("x", 3.0), ("b", 1.0)].into_iter().collect();
        assert_eq!(formula.evaluate(&mut vars).unwrap(), 7.0);

        vars.set("x", -1.0);
        assert_eq!(formula.evaluate(&mut vars).unwrap(), -1.0);
    }

    #[test]
    fn test_compile_error_carries_source() {
        let err = Formula::compile("bad", "1 + * 2").unwrap_err();
        match err {
            Error::Compilation {
                source_name,
                source,
                diagnostics,
            } => {
                assert_eq!(source_name, "bad");
                assert_eq!(source, "1 + * 2");
                assert_eq!(diagnostics.len(), 1);
                assert_eq!(diagnostics[0].severity, Severity::Error);
                assert_eq!(diagnostics[0].code.as_deref(), Some("P001"));
                assert_eq!(diagnostics[0].span.start(), 4);
            }
            other => panic!("expected compilation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_keyword_diagnostic() {
        let err = Formula::compile("f", "cube(2)").unwrap_err();
        let Error::Compilation { diagnostics, .. } = err else {
            panic!("expected compilation error");
        };
        assert_eq!(diagnostics[0].code.as_deref(), Some("C002"));
        assert_eq!(diagnostics[0].span, Span::new(0, 7));
        assert_eq!(diagnostics[0].message, "unknown keyword `cube`");
    }

    #[test]
    fn test_runtime_error() {
        let formula = Formula::compile("f", "x + 1").unwrap();
        let err = formula.evaluate(&mut VarTable::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Runtime(ExecutionError::UndefinedVariable { ref name }) if name == "x"
        ));
        assert_eq!(err.to_string(), "Runtime error: undefined variable `x`");
    }

    #[test]
    fn test_execute_into_caller_stack() {
        let formula = Formula::compile("f", "1; 2; 3").unwrap();
        let mut stack = Stack::new();
        formula.execute(&mut stack, &mut VarTable::new()).unwrap();
        assert_eq!(stack.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_depth_option() {
        let options = CompilerOptions { max_depth: 2 };
        assert!(Formula::compile_with_options("f", "((1))", options.clone()).is_err());
        assert!(Formula::compile_with_options("f", "(1)", options).is_ok());
    }

    #[test]
    fn test_display_is_listing() {
        let formula = Formula::compile("f", "-x").unwrap();
        assert_eq!(formula.to_string(), "push x\nneg\n");
    }
}
