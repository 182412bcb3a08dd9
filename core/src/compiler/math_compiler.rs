use core::fmt;
use core::mem;

use super::{BytecodeCompiler, CompileError};
use crate::api::CompilerOptions;
use crate::parser::parse_with_max_depth;
use crate::syntax::SyntaxTree;
use crate::vm::Program;

/// How far a [`MathCompiler`] has taken its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Uninitialised,
    Initialised,
    Parsed,
    Compiled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Uninitialised => "uninitialised",
            Status::Initialised => "initialised",
            Status::Parsed => "parsed",
            Status::Compiled => "compiled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
struct Source {
    name: String,
    text: String,
}

/// Each stage owns exactly the artifacts produced so far, so a stale tree
/// or program cannot outlive a re-initialization.
#[derive(Debug, Clone, Default)]
enum Stage {
    #[default]
    Uninitialised,
    Initialised {
        source: Source,
    },
    Parsed {
        source: Source,
        tree: SyntaxTree,
    },
    Compiled {
        source: Source,
        tree: SyntaxTree,
        program: Program,
    },
}

/// Restartable source → program pipeline.
///
/// ```text
/// Uninitialised --init--> Initialised --parse--> Parsed --compile--> Compiled
/// ```
///
/// `init` can be called from any state and discards whatever was built
/// before. A failing `parse` or `compile` leaves the status where it was.
///
/// A compiler is not meant to be shared between threads while it works;
/// the [`Program`] it produces is.
///
/// # Example
///
/// ```
/// use formula_core::compiler::{MathCompiler, Status};
///
/// let mut compiler = MathCompiler::with_source("demo", "x = 5; x + 1");
/// assert_eq!(compiler.status(), Status::Initialised);
///
/// let program = compiler.program().unwrap();
/// assert_eq!(program.len(), 5);
/// assert_eq!(compiler.status(), Status::Compiled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MathCompiler {
    options: CompilerOptions,
    stage: Stage,
}

impl MathCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompilerOptions) -> Self {
        Self {
            options,
            stage: Stage::Uninitialised,
        }
    }

    /// Shorthand for [`new`](Self::new) followed by [`init`](Self::init).
    pub fn with_source(source_name: impl Into<String>, source: impl Into<String>) -> Self {
        let mut compiler = Self::new();
        compiler.init(source_name, source);
        compiler
    }

    /// Load new source, dropping any tree or program built from the old one.
    pub fn init(&mut self, source_name: impl Into<String>, source: impl Into<String>) {
        let source = Source {
            name: source_name.into(),
            text: source.into(),
        };
        tracing::debug!(
            source = %source.name,
            len = source.text.len(),
            previous = %self.status(),
            "Initialised compiler"
        );
        self.stage = Stage::Initialised { source };
    }

    pub fn status(&self) -> Status {
        match self.stage {
            Stage::Uninitialised => Status::Uninitialised,
            Stage::Initialised { .. } => Status::Initialised,
            Stage::Parsed { .. } => Status::Parsed,
            Stage::Compiled { .. } => Status::Compiled,
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source().map(|source| source.name.as_str())
    }

    pub fn source_text(&self) -> Option<&str> {
        self.source().map(|source| source.text.as_str())
    }

    /// The parsed tree, once [`parse`](Self::parse) has succeeded.
    pub fn syntax_tree(&self) -> Option<&SyntaxTree> {
        match &self.stage {
            Stage::Parsed { tree, .. } | Stage::Compiled { tree, .. } => Some(tree),
            _ => None,
        }
    }

    /// Parse the loaded source.
    ///
    /// Only valid right after [`init`](Self::init).
    pub fn parse(&mut self) -> Result<(), CompileError> {
        match mem::take(&mut self.stage) {
            Stage::Initialised { source } => {
                match parse_with_max_depth(&source.name, &source.text, self.options.max_depth) {
                    Ok(tree) => {
                        self.stage = Stage::Parsed { source, tree };
                        Ok(())
                    }
                    Err(err) => {
                        tracing::debug!(source = %source.name, error = %err, "Parse failed");
                        self.stage = Stage::Initialised { source };
                        Err(err.into())
                    }
                }
            }
            stage => {
                self.stage = stage;
                Err(self.out_of_order("parse"))
            }
        }
    }

    /// Generate bytecode for the parsed tree.
    ///
    /// Only valid after a successful [`parse`](Self::parse).
    pub fn compile(&mut self) -> Result<(), CompileError> {
        match mem::take(&mut self.stage) {
            Stage::Parsed { source, tree } => match BytecodeCompiler::compile(&tree) {
                Ok(program) => {
                    self.stage = Stage::Compiled {
                        source,
                        tree,
                        program,
                    };
                    Ok(())
                }
                Err(err) => {
                    tracing::debug!(source = %source.name, error = %err, "Compile failed");
                    self.stage = Stage::Parsed { source, tree };
                    Err(err)
                }
            },
            stage => {
                self.stage = stage;
                Err(self.out_of_order("compile"))
            }
        }
    }

    /// The compiled program, running whatever stages are still missing.
    ///
    /// Calling this again returns the same program without redoing work.
    pub fn program(&mut self) -> Result<&Program, CompileError> {
        if self.status() == Status::Initialised {
            self.parse()?;
        }
        if self.status() == Status::Parsed {
            self.compile()?;
        }
        match &self.stage {
            Stage::Compiled { program, .. } => Ok(program),
            _ => Err(CompileError::NoSource),
        }
    }

    /// Like [`program`](Self::program), but hands over ownership.
    pub fn into_program(mut self) -> Result<Program, CompileError> {
        self.program()?;
        match self.stage {
            Stage::Compiled { program, .. } => Ok(program),
            _ => Err(CompileError::NoSource),
        }
    }

    fn source(&self) -> Option<&Source> {
        match &self.stage {
            Stage::Uninitialised => None,
            Stage::Initialised { source }
            | Stage::Parsed { source, .. }
            | Stage::Compiled { source, .. } => Some(source),
        }
    }

    fn out_of_order(&self, operation: &'static str) -> CompileError {
        match self.status() {
            Status::Uninitialised => CompileError::NoSource,
            status => CompileError::InvalidState { operation, status },
        }
    }
}
