//! Integration tests for Error
//!
//! Tests error kinds, messages, and context rendering.

use stratus_foundation::{Error, ErrorKind};

#[test]
fn messages_name_the_offender() {
    assert_eq!(
        Error::missing_input("region").to_string(),
        "missing value for input `region`"
    );
    assert_eq!(
        Error::unknown_property("Vpc", "color").to_string(),
        "unknown property `color` on Vpc"
    );
    assert_eq!(
        Error::illegal_target("count", "schema").to_string(),
        "@count cannot be applied to schema"
    );
}

#[test]
fn declaration_context_is_kept_from_the_innermost_failure() {
    let err = Error::undefined_symbol("vpc")
        .with_declaration("resource Subnet a {}")
        .with_declaration("resource Subnet b {}")
        .with_frame("a")
        .with_frame("b");

    let context = err.context.unwrap();
    assert_eq!(context.declaration.as_deref(), Some("resource Subnet a {}"));
    assert_eq!(context.stack, vec!["a", "b"]);
}

#[test]
fn context_renders_stack_frames() {
    let err = Error::new(ErrorKind::DepthExceeded(64)).with_frame("web");
    let rendered = err.context.unwrap().to_string();
    assert!(rendered.contains("while evaluating web"));
}
