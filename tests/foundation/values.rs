//! Integration tests for Value and DeferredValue
//!
//! Tests truthiness, accessors, deferred propagation, and interpolation.

use std::sync::Arc;

use proptest::prelude::*;
use stratus_foundation::{DeferredValue, Type, Value};

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn value_null() {
    let v = Value::Null;
    assert!(v.is_null());
    assert!(!v.is_truthy());
    assert_eq!(v.value_type(), Type::Null);
}

#[test]
fn value_numbers() {
    assert_eq!(Value::Int(42).as_int(), Some(42));
    assert_eq!(Value::Int(42).as_number(), Some(42.0));
    assert_eq!(Value::Float(1.5).as_int(), None);
    assert_eq!(Value::Float(1.5).value_type(), Type::Number);
}

#[test]
fn value_string() {
    let v = Value::String(Arc::from("us-east-1"));
    assert!(v.is_truthy());
    assert_eq!(v.as_str(), Some("us-east-1"));
    assert_eq!(v.length(), Some(9));
}

#[test]
fn value_object_from_pairs() {
    let v = Value::object([("env", Value::from("prod")), ("tier", Value::Int(2))]);
    let object = v.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(v.length(), Some(2));
}

// =============================================================================
// Deferred Values
// =============================================================================

#[test]
fn deferred_values_are_falsy_and_untyped() {
    let v = Value::Deferred(DeferredValue::new("vpc", "id"));
    assert!(v.is_deferred());
    assert!(!v.is_truthy());
    assert_eq!(v.value_type(), Type::Null);
}

#[test]
fn deferred_values_display_their_target() {
    let deferred = DeferredValue::new("vpc", "id");
    assert_eq!(deferred.to_string(), "vpc.id");
    assert_eq!(DeferredValue::new("vpc", "").to_string(), "vpc");
}

#[test]
fn nested_deferred_paths() {
    let base = DeferredValue::new("vpc", "tags");
    assert_eq!(base.nested("env").property_path(), "tags.env");
    assert_eq!(base.nested("[0]").property_path(), "tags[0]");
    assert_eq!(base.nested("env").dependency_name(), "vpc");
}

#[test]
fn find_deferred_searches_collections() {
    let inner = DeferredValue::new("db", "endpoint");
    let v = Value::object([(
        "hosts",
        Value::from(vec![Value::from("a"), Value::Deferred(inner.clone())]),
    )]);
    assert_eq!(v.find_deferred(), Some(&inner));
    assert_eq!(Value::from(vec![1, 2]).find_deferred(), None);
}

#[test]
fn interpolation_uses_placeholder_for_deferred() {
    let deferred = Value::Deferred(DeferredValue::new("vpc", "id"));
    assert_eq!(deferred.interpolate("null"), "null");
    assert_eq!(Value::from("web").interpolate("null"), "web");
    assert_eq!(Value::Int(3).interpolate("null"), "3");
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn ints_are_always_truthy(n in any::<i64>()) {
        prop_assert!(Value::Int(n).is_truthy());
        prop_assert_eq!(Value::Int(n).as_int(), Some(n));
    }

    #[test]
    fn strings_measure_characters(s in "\\PC{0,32}") {
        prop_assert_eq!(Value::from(s.as_str()).length(), Some(s.chars().count()));
    }

    #[test]
    fn arrays_without_placeholders_have_none(items in prop::collection::vec(any::<i64>(), 0..16)) {
        let v = Value::from(items);
        prop_assert!(v.find_deferred().is_none());
    }
}
