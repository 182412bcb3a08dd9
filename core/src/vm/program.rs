use core::fmt;

use super::{ExecutionError, Instruction, Stack, VarTable};

/// A compiled, branch-free bytecode program.
///
/// Programs are immutable once built. Execution only touches the stack and
/// variable table passed in, so a program can be run any number of times,
/// from any number of threads, without recompiling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
    /// Deepest the stack gets when the program runs on an empty stack.
    max_stack_size: usize,
}

impl Program {
    /// Build a program from a hand-written instruction list.
    ///
    /// The maximum stack size is measured by simulating stack effects; an
    /// instruction that would underflow counts as running on an empty stack.
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        let mut depth = 0usize;
        let mut max_stack_size = 0usize;
        for instruction in &instructions {
            let (consumed, produced) = instruction.stack_effect();
            depth = depth.saturating_sub(consumed) + produced;
            max_stack_size = max_stack_size.max(depth);
        }
        Self {
            instructions,
            max_stack_size,
        }
    }

    pub(crate) fn with_max_stack_size(instructions: Vec<Instruction>, max_stack_size: usize) -> Self {
        Self {
            instructions,
            max_stack_size,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn max_stack_size(&self) -> usize {
        self.max_stack_size
    }

    /// An empty stack large enough to run this program without reallocating.
    pub fn new_stack(&self) -> Stack<f64> {
        Stack::with_capacity(self.max_stack_size)
    }

    /// Apply every instruction in order.
    ///
    /// Stops at the first failing instruction. Whatever earlier instructions
    /// did to `stack` and `vars` is kept; nothing is rolled back. The final
    /// shape of the stack is up to the caller.
    pub fn execute(&self, stack: &mut Stack<f64>, vars: &mut VarTable) -> Result<(), ExecutionError> {
        for (addr, instruction) in self.instructions.iter().enumerate() {
            tracing::trace!(addr, %instruction, depth = stack.len(), "Executing");
            if let Err(err) = instruction.apply(stack, vars) {
                tracing::debug!(addr, %instruction, error = %err, "Execution failed");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Run on a fresh stack and return the value left on top.
    ///
    /// A program that leaves nothing on the stack (e.g. only assignments)
    /// fails with [`ExecutionError::NoResult`].
    pub fn evaluate(&self, vars: &mut VarTable) -> Result<f64, ExecutionError> {
        let mut stack = self.new_stack();
        self.execute(&mut stack, vars)?;
        stack.peek().copied().ok_or(ExecutionError::NoResult)
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = core::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

impl fmt::Display for Program {
    /// One instruction per line, e.g. `push 5`, `pop x`, `add`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
