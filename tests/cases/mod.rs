#![allow(dead_code)]

use formula::{Error, Formula, VarTable};
use pretty_assertions::assert_eq;

/// Compile `input`, evaluate it against `vars` and check whichever
/// expectations are given.
///
/// ```ignore
/// test_case! {
///     name: sum,
///     input: "a + 1",
///     vars: { "a" => 2.0 },
///     listing: { "push a\npush 1\nadd\n" },
///     result: { 3.0 },
///     bindings: { "a" => 2.0 },
/// }
/// ```
///
/// `error` checks a compilation diagnostic code; `runtime_error` checks the
/// message of a failed evaluation.
#[macro_export]
macro_rules! test_case {
    (
        name: $name:ident,
        input: $input:expr,
        $(vars: { $($var:literal => $value:expr),* $(,)? },)?
        $(listing: { $listing:expr },)?
        $(result: { $result:expr },)?
        $(error: { $code:expr },)?
        $(runtime_error: { $message:expr },)?
        $(bindings: { $($bound:literal => $bound_value:expr),* $(,)? },)?
    ) => {
        #[test]
        fn $name() {
            let vars: &[(&str, f64)] = &[$($(($var, $value)),*)?];
            let outcome = $crate::cases::run(stringify!($name), $input, vars);
            $(outcome.assert_listing($listing);)?
            $(outcome.assert_result($result);)?
            $(outcome.assert_error_code($code);)?
            $(outcome.assert_runtime_error($message);)?
            $(outcome.assert_bindings(&[$(($bound, $bound_value)),*]);)?
        }
    };
}

pub struct Outcome {
    pub compiled: Result<Formula, Error>,
    pub evaluated: Option<Result<f64, Error>>,
    pub vars: VarTable,
}

pub fn run(name: &str, input: &str, vars: &[(&str, f64)]) -> Outcome {
    let mut vars: VarTable = vars.iter().copied().collect();
    let compiled = Formula::compile(name, input);
    let evaluated = compiled
        .as_ref()
        .ok()
        .map(|formula| formula.evaluate(&mut vars));
    Outcome {
        compiled,
        evaluated,
        vars,
    }
}

impl Outcome {
    pub fn formula(&self) -> &Formula {
        match &self.compiled {
            Ok(formula) => formula,
            Err(err) => panic!("compilation failed: {}", err),
        }
    }

    pub fn assert_listing(&self, expected: &str) {
        assert_eq!(self.formula().to_string(), expected);
    }

    pub fn assert_result(&self, expected: f64) {
        let actual = match &self.evaluated {
            Some(Ok(value)) => *value,
            Some(Err(err)) => panic!("evaluation failed: {}", err),
            None => panic!("compilation failed: {:?}", self.compiled.as_ref().err()),
        };
        if expected.is_nan() {
            assert!(actual.is_nan(), "expected NaN, got {}", actual);
        } else {
            assert_eq!(actual, expected);
        }
    }

    pub fn assert_error_code(&self, expected: &str) {
        match &self.compiled {
            Err(Error::Compilation { diagnostics, .. }) => {
                let codes: Vec<_> = diagnostics.iter().filter_map(|d| d.code.as_deref()).collect();
                assert_eq!(codes, vec![expected]);
            }
            other => panic!("expected a compilation error, got {:?}", other),
        }
    }

    pub fn assert_runtime_error(&self, expected: &str) {
        match &self.evaluated {
            Some(Err(err @ Error::Runtime(_))) => assert_eq!(err.to_string(), expected),
            other => panic!("expected a runtime error, got {:?}", other),
        }
    }

    pub fn assert_bindings(&self, expected: &[(&str, f64)]) {
        assert_eq!(self.vars.sorted(), expected.to_vec());
    }
}
