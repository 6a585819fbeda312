//! Integration tests for Layer 2: Engine
//!
//! Tests for program evaluation: references and deferred values, `@count`
//! expansion, cycle detection, decorators, components, and loops.

mod counting;
mod decorators;
mod references;
mod structure;

use stratus_engine::{Evaluation, evaluate};
use stratus_foundation::{Error, Value};
use stratus_language::{Program, Statement};

/// Evaluates `statements`, panicking on error.
pub fn run(statements: impl IntoIterator<Item = Statement>) -> Evaluation {
    let program: Program = statements.into_iter().collect();
    evaluate(&program).unwrap_or_else(|e| panic!("evaluation failed: {e}"))
}

/// Evaluates `statements`, returning the error they must raise.
pub fn fail(statements: impl IntoIterator<Item = Statement>) -> Error {
    let program: Program = statements.into_iter().collect();
    match evaluate(&program) {
        Ok(_) => panic!("evaluation unexpectedly succeeded"),
        Err(e) => e,
    }
}

/// The value of `instance.property`.
pub fn property(evaluation: &Evaluation, instance: &str, property: &str) -> Value {
    evaluation
        .resource(instance)
        .unwrap_or_else(|| panic!("no instance {instance}"))
        .borrow()
        .lookup(property)
        .unwrap_or_else(|| panic!("no property {instance}.{property}"))
}
