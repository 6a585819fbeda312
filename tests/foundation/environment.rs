//! Integration tests for Environment
//!
//! Tests declaration, shadowing, assignment, and bounded lookup.

use proptest::prelude::*;
use stratus_foundation::{Environment, ErrorKind, Value};

#[test]
fn init_rejects_duplicates_in_one_scope() {
    let env = Environment::new();
    env.init("region", Value::from("us-east-1")).unwrap();
    let err = env.init("region", Value::from("eu-west-1")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DeclarationExists(ref name) if name == "region"));
}

#[test]
fn children_shadow_parents() {
    let root = Environment::new();
    root.init("x", Value::Int(1)).unwrap();
    let child = root.child();
    child.init("x", Value::Int(2)).unwrap();

    assert_eq!(child.lookup("x"), Some(Value::Int(2)));
    assert_eq!(root.lookup("x"), Some(Value::Int(1)));
}

#[test]
fn assign_updates_the_declaring_scope() {
    let root = Environment::new();
    root.init("x", Value::Int(1)).unwrap();
    let child = root.child();
    child.assign("x", Value::Int(5)).unwrap();

    assert_eq!(root.get("x"), Some(Value::Int(5)));
    assert!(!child.contains_local("x"));
}

#[test]
fn assign_to_unknown_name_fails() {
    let env: Environment<Value> = Environment::new();
    let err = env.assign("missing", Value::Null).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedSymbol(_)));
}

#[test]
fn lookup_within_limits_hops() {
    let root = Environment::new();
    root.init("region", Value::from("us-east-1")).unwrap();
    let grandchild = root.child().child();

    assert_eq!(grandchild.lookup_within("region", 1), None);
    assert_eq!(
        grandchild.lookup_within("region", 2),
        Some(Value::from("us-east-1"))
    );
    assert_eq!(grandchild.resolve_depth("region", 5), Some(2));
    assert_eq!(grandchild.depth(), 2);
}

proptest! {
    #[test]
    fn lookup_finds_names_at_any_depth(depth in 0usize..24, hops in 0usize..32) {
        let root = Environment::new();
        root.init("base", Value::Int(0)).unwrap();
        let mut env = root;
        for _ in 0..depth {
            env = env.child();
        }

        prop_assert_eq!(env.lookup("base"), Some(Value::Int(0)));
        prop_assert_eq!(env.lookup_within("base", hops).is_some(), hops >= depth);
    }
}
