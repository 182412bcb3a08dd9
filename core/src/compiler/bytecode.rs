//! Bytecode compiler implementation.

use super::CompileError;
use crate::syntax::{Node, NodeId, NodeKind, SyntaxTree};
use crate::vm::{Instruction, Program};

/// Keywords the compiler knows how to call.
pub const KEYWORDS: [&str; 5] = ["inv", "neg", "pow", "sq", "sqrt"];

/// Arity of a keyword and the instructions emitted after its arguments.
///
/// `sqrt` is `x ^ 0.5` and follows `powf` rather than `f64::sqrt` at the
/// edges: `sqrt(-inf)` is `inf` and `sqrt(-0)` is `+0`.
fn keyword(name: &str) -> Option<(usize, Vec<Instruction>)> {
    let entry = match name {
        "pow" => (2, vec![Instruction::Pow]),
        "neg" => (1, vec![Instruction::Neg]),
        "sqrt" => (1, vec![Instruction::push_constant(0.5), Instruction::Pow]),
        "sq" => (1, vec![Instruction::push_constant(2.0), Instruction::Pow]),
        "inv" => (1, vec![Instruction::push_constant(-1.0), Instruction::Pow]),
        _ => return None,
    };
    Some(entry)
}

/// Bytecode compiler that turns a syntax tree into a [`Program`].
///
/// Code generation is a post-order walk: arguments left to right, then the
/// node's own instruction. The operand stack depth is tracked while
/// emitting so the program knows how much stack it needs.
pub struct BytecodeCompiler<'t> {
    tree: &'t SyntaxTree,

    /// Bytecode instructions
    instructions: Vec<Instruction>,

    /// Current stack depth during compilation
    current_stack_depth: usize,

    /// Maximum stack depth observed
    max_stack_size: usize,
}

impl<'t> BytecodeCompiler<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            tree,
            instructions: Vec::new(),
            current_stack_depth: 0,
            max_stack_size: 0,
        }
    }

    /// Convenience method to compile every statement of a tree in one call.
    pub fn compile(tree: &'t SyntaxTree) -> Result<Program, CompileError> {
        let mut compiler = Self::new(tree);
        for &root in tree.roots() {
            compiler.compile_statement(root)?;
        }
        tracing::debug!(
            statements = tree.roots().len(),
            instructions = compiler.instructions.len(),
            max_stack_size = compiler.max_stack_size,
            "Compiled formula"
        );
        Ok(compiler.finalize())
    }

    /// Append the code for one top-level statement.
    ///
    /// Statements run in the order they are appended.
    pub fn compile_statement(&mut self, root: NodeId) -> Result<(), CompileError> {
        self.compile_node(root, true)
    }

    /// Finalize compilation and return the bytecode.
    pub fn finalize(self) -> Program {
        Program::with_max_stack_size(self.instructions, self.max_stack_size)
    }

    fn compile_node(&mut self, id: NodeId, is_statement: bool) -> Result<(), CompileError> {
        let tree = self.tree;
        let node = &tree[id];
        match node.kind() {
            NodeKind::Constant => {
                expect_arity(node, 0)?;
                let value = node
                    .name()
                    .parse::<f64>()
                    .map_err(|_| CompileError::InvalidConstant {
                        text: node.name().to_string(),
                        span: node.span().clone(),
                    })?;
                self.emit(Instruction::push_constant(value));
            }
            NodeKind::Variable => {
                expect_arity(node, 0)?;
                self.emit(Instruction::push_variable(node.name()));
            }
            NodeKind::Operator if node.name() == "=" => {
                self.compile_assignment(id, is_statement)?;
            }
            NodeKind::Operator => self.compile_operator(id)?,
            NodeKind::Keyword => self.compile_keyword(id)?,
        }
        Ok(())
    }

    fn compile_operator(&mut self, id: NodeId) -> Result<(), CompileError> {
        let tree = self.tree;
        let node = &tree[id];
        let binary = Instruction::binary_op(node.name()).ok_or_else(|| unknown(node))?;

        match node.arg_count() {
            1 if node.name() == "-" => {
                self.compile_args(id)?;
                self.emit(Instruction::Neg);
            }
            2 => {
                // Left first: at run time the left operand is popped second.
                self.compile_args(id)?;
                self.emit(binary);
            }
            _ => expect_arity(node, 2)?,
        }
        Ok(())
    }

    /// `x = value`: a statement consumes the value with `pop`; inside a
    /// larger expression `store` leaves it on the stack as the operand.
    fn compile_assignment(&mut self, id: NodeId, is_statement: bool) -> Result<(), CompileError> {
        let tree = self.tree;
        expect_arity(&tree[id], 2)?;

        let target = &tree[tree.arg(id, 0)?];
        if target.kind() != NodeKind::Variable || target.arg_count() != 0 {
            return Err(CompileError::InvalidAssignmentTarget {
                target: target.name().to_string(),
                kind: target.kind(),
                span: target.span().clone(),
            });
        }

        self.compile_node(tree.arg(id, 1)?, false)?;

        let name = target.name().to_string();
        if is_statement {
            self.emit(Instruction::Pop(name));
        } else {
            self.emit(Instruction::Store(name));
        }
        Ok(())
    }

    fn compile_keyword(&mut self, id: NodeId) -> Result<(), CompileError> {
        let tree = self.tree;
        let node = &tree[id];
        let (arity, tail) = keyword(node.name()).ok_or_else(|| unknown(node))?;
        expect_arity(node, arity)?;

        self.compile_args(id)?;
        for instruction in tail {
            self.emit(instruction);
        }
        Ok(())
    }

    fn compile_args(&mut self, id: NodeId) -> Result<(), CompileError> {
        let tree = self.tree;
        for &arg in tree[id].args() {
            self.compile_node(arg, false)?;
        }
        Ok(())
    }

    // === Instruction Emission ===

    /// Emit an instruction, updating the tracked stack depth.
    fn emit(&mut self, instruction: Instruction) {
        let (consumed, produced) = instruction.stack_effect();
        debug_assert!(
            self.current_stack_depth >= consumed,
            "Stack underflow: `{}` pops {} but depth is {}",
            instruction,
            consumed,
            self.current_stack_depth
        );
        self.current_stack_depth = self.current_stack_depth.saturating_sub(consumed) + produced;
        self.max_stack_size = self.max_stack_size.max(self.current_stack_depth);

        tracing::trace!(%instruction, depth = self.current_stack_depth, "Emit");
        self.instructions.push(instruction);
    }
}

fn expect_arity(node: &Node, expected: usize) -> Result<(), CompileError> {
    if node.arg_count() == expected {
        Ok(())
    } else {
        Err(CompileError::ArityMismatch {
            name: node.name().to_string(),
            expected,
            found: node.arg_count(),
            span: node.span().clone(),
        })
    }
}

fn unknown(node: &Node) -> CompileError {
    CompileError::UnknownOperator {
        name: node.name().to_string(),
        kind: node.kind(),
        span: node.span().clone(),
    }
}
