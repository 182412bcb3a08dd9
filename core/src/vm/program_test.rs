//! Tests for running bytecode programs.

use indoc::indoc;
use pretty_assertions::assert_eq;

use super::{ExecutionError, Instruction, Program, Stack, VarTable};

/// `x = 5; x + y`
fn sample_program() -> Program {
    Program::from_instructions(vec![
        Instruction::push_constant(5.0),
        Instruction::Pop("x".to_string()),
        Instruction::push_variable("x"),
        Instruction::push_variable("y"),
        Instruction::Add,
    ])
}

#[test]
fn test_display_one_line_per_instruction() {
    assert_eq!(
        sample_program().to_string(),
        indoc! {"
            push 5
            pop x
            push x
            push y
            add
        "}
    );
}

#[test]
fn test_max_stack_size_measured() {
    let program = sample_program();
    assert_eq!(program.max_stack_size(), 2);
    assert_eq!(program.len(), 5);
    assert!(!program.is_empty());
    assert!(Program::default().is_empty());
}

#[test]
fn test_execute_leaves_result_on_stack() {
    let program = sample_program();
    let mut stack = program.new_stack();
    let mut vars: VarTable = [("y", 1.0)].into_iter().collect();

    program.execute(&mut stack, &mut vars).unwrap();

    assert_eq!(stack.as_slice(), &[6.0]);
    assert_eq!(vars.get("x"), Some(5.0));
}

#[test]
fn test_reexecution_with_different_bindings() {
    let program = sample_program();
    let before = program.clone();

    for y in [0.0, 1.5, -10.0] {
        let mut vars: VarTable = [("y", y)].into_iter().collect();
        assert_eq!(program.evaluate(&mut vars).unwrap(), 5.0 + y);
    }

    assert_eq!(program, before);
}

#[test]
fn test_partial_execution_is_not_rolled_back() {
    let program = sample_program();
    let mut stack = Stack::new();
    let mut vars = VarTable::new();

    let err = program.execute(&mut stack, &mut vars).unwrap_err();

    assert_eq!(
        err,
        ExecutionError::UndefinedVariable {
            name: "y".to_string()
        }
    );
    // `pop x` and `push x` already ran.
    assert_eq!(vars.get("x"), Some(5.0));
    assert_eq!(stack.as_slice(), &[5.0]);

    // Same program, corrected bindings.
    vars.set("y", 2.0);
    assert_eq!(program.evaluate(&mut vars).unwrap(), 7.0);
}

#[test]
fn test_stack_reuse_is_callers_business() {
    let program = Program::from_instructions(vec![Instruction::push_constant(1.0)]);
    let mut stack = Stack::new();
    let mut vars = VarTable::new();

    program.execute(&mut stack, &mut vars).unwrap();
    program.execute(&mut stack, &mut vars).unwrap();

    assert_eq!(stack.as_slice(), &[1.0, 1.0]);
}

#[test]
fn test_evaluate_without_result() {
    let program = Program::from_instructions(vec![
        Instruction::push_constant(3.0),
        Instruction::Pop("x".to_string()),
    ]);
    let mut vars = VarTable::new();

    assert_eq!(program.evaluate(&mut vars), Err(ExecutionError::NoResult));
    assert_eq!(vars.get("x"), Some(3.0));
}

#[test]
fn test_underflow_reported() {
    let program = Program::from_instructions(vec![Instruction::push_constant(1.0), Instruction::Mul]);
    assert_eq!(
        program.evaluate(&mut VarTable::new()),
        Err(ExecutionError::StackUnderflow {
            instruction: Instruction::Mul
        })
    );
}

#[test]
fn test_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Program>();

    let program = sample_program();
    let results: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let program = &program;
                scope.spawn(move || {
                    let mut vars: VarTable = [("y", i as f64)].into_iter().collect();
                    program.evaluate(&mut vars).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, vec![5.0, 6.0, 7.0, 8.0]);
}

#[test]
fn test_iteration() {
    let program = sample_program();
    let mnemonics: Vec<&str> = program.iter().map(Instruction::mnemonic).collect();
    assert_eq!(mnemonics, vec!["push", "pop", "push", "push", "add"]);
    assert_eq!((&program).into_iter().count(), program.instructions().len());
}
