//! Formula VM instructions.
//!
//! The instruction set is closed: every program is a sequence of the
//! variants below, with no jumps. Each instruction carries only the operand
//! it needs (a literal or a variable name).
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`
//!
//! Binary operators pop the right-hand operand first. The compiler emits
//! the left operand before the right one, so `a - b` runs as
//! `push a; push b; sub` and computes `a - b`, not `b - a`.

use core::fmt;

use super::{ExecutionError, Stack, VarTable};

/// What a `push` instruction puts on the stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant(f64),
    /// Looked up in the variable table at execution time.
    Variable(String),
}

/// A single VM instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Push a constant or the current value of a variable
    /// Stack: [...] -> [..., value]
    Push(Operand),

    /// Pop the top value and bind it to a variable
    /// Stack: [..., value] -> [...]
    Pop(String),

    /// Bind the top value to a variable, leaving it on the stack
    /// Stack: [..., value] -> [..., value]
    Store(String),

    /// Negation: -a
    /// Stack: [..., a] -> [..., -a]
    Neg,

    /// Stack: [..., a, b] -> [..., a + b]
    Add,

    /// Stack: [..., a, b] -> [..., a - b]
    Sub,

    /// Stack: [..., a, b] -> [..., a * b]
    Mul,

    /// Division with IEEE-754 semantics; `x / 0` is ±inf or NaN, never an error.
    /// Stack: [..., a, b] -> [..., a / b]
    Div,

    /// Stack: [..., a, b] -> [..., a ^ b]
    Pow,
}

impl Instruction {
    pub fn push_constant(value: f64) -> Self {
        Instruction::Push(Operand::Constant(value))
    }

    pub fn push_variable(name: impl Into<String>) -> Self {
        Instruction::Push(Operand::Variable(name.into()))
    }

    /// Instruction for a binary operator symbol (`+ - * / ^`).
    pub fn binary_op(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Instruction::Add),
            "-" => Some(Instruction::Sub),
            "*" => Some(Instruction::Mul),
            "/" => Some(Instruction::Div),
            "^" => Some(Instruction::Pow),
            _ => None,
        }
    }

    /// Token naming this instruction in program listings.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Push(_) => "push",
            Instruction::Pop(_) => "pop",
            Instruction::Store(_) => "store",
            Instruction::Neg => "neg",
            Instruction::Add => "add",
            Instruction::Sub => "sub",
            Instruction::Mul => "mul",
            Instruction::Div => "div",
            Instruction::Pow => "pow",
        }
    }

    /// Number of values the instruction needs on the stack and the number it
    /// leaves in their place.
    pub fn stack_effect(&self) -> (usize, usize) {
        match self {
            Instruction::Push(_) => (0, 1),
            Instruction::Pop(_) => (1, 0),
            Instruction::Store(_) | Instruction::Neg => (1, 1),
            Instruction::Add
            | Instruction::Sub
            | Instruction::Mul
            | Instruction::Div
            | Instruction::Pow => (2, 1),
        }
    }

    /// Perform this instruction's single transition.
    ///
    /// On error nothing is popped, so the stack still shows what the
    /// instruction saw.
    pub fn apply(&self, stack: &mut Stack<f64>, vars: &mut VarTable) -> Result<(), ExecutionError> {
        let (needed, _) = self.stack_effect();
        if stack.len() < needed {
            return Err(ExecutionError::StackUnderflow {
                instruction: self.clone(),
            });
        }

        match self {
            Instruction::Push(Operand::Constant(value)) => stack.push(*value),
            Instruction::Push(Operand::Variable(name)) => {
                let value = vars
                    .get(name)
                    .ok_or_else(|| ExecutionError::UndefinedVariable { name: name.clone() })?;
                stack.push(value);
            }
            Instruction::Pop(name) => {
                let value = self.pop_operand(stack)?;
                vars.set(name, value);
            }
            Instruction::Store(name) => {
                let value = *stack.peek().ok_or_else(|| self.underflow())?;
                vars.set(name, value);
            }
            Instruction::Neg => {
                let a = self.pop_operand(stack)?;
                stack.push(-a);
            }
            Instruction::Add
            | Instruction::Sub
            | Instruction::Mul
            | Instruction::Div
            | Instruction::Pow => {
                let right = self.pop_operand(stack)?;
                let left = self.pop_operand(stack)?;
                let result = match self {
                    Instruction::Add => left + right,
                    Instruction::Sub => left - right,
                    Instruction::Mul => left * right,
                    Instruction::Div => left / right,
                    _ => left.powf(right),
                };
                stack.push(result);
            }
        }
        Ok(())
    }

    fn pop_operand(&self, stack: &mut Stack<f64>) -> Result<f64, ExecutionError> {
        stack.pop().ok_or_else(|| self.underflow())
    }

    fn underflow(&self) -> ExecutionError {
        ExecutionError::StackUnderflow {
            instruction: self.clone(),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(value) => write!(f, "{}", value),
            Operand::Variable(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(operand) => write!(f, "push {}", operand),
            Instruction::Pop(name) | Instruction::Store(name) => {
                write!(f, "{} {}", self.mnemonic(), name)
            }
            _ => f.write_str(self.mnemonic()),
        }
    }
}
