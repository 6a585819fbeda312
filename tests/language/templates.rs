//! Integration tests for interpolated strings

use stratus_language::ast::{Expr, TemplatePart};
use stratus_language::build::{ident, idx, int, member, string, template};
use stratus_language::{TemplateError, parse_template};

#[test]
fn bare_and_braced_references() {
    let parts = parse_template("web-$env-${vpc.subnets[0]}").unwrap();
    assert_eq!(
        parts,
        vec![
            TemplatePart::Literal("web-".to_string()),
            TemplatePart::Expr(ident("env")),
            TemplatePart::Literal("-".to_string()),
            TemplatePart::Expr(idx(member(ident("vpc"), "subnets"), int(0))),
        ]
    );
}

#[test]
fn dollar_escapes_and_stray_dollars() {
    assert_eq!(
        parse_template("cost: $$5 or $ 6").unwrap(),
        vec![TemplatePart::Literal("cost: $5 or $ 6".to_string())]
    );
}

#[test]
fn plain_text_collapses_to_a_string() {
    assert_eq!(template("no references").unwrap(), string("no references"));
    assert!(matches!(template("$name").unwrap(), Expr::Template(..)));
}

#[test]
fn malformed_segments_are_rejected() {
    assert_eq!(
        parse_template("x-${vpc.id").unwrap_err(),
        TemplateError::Unterminated(2)
    );
    assert!(matches!(
        parse_template("${1abc}"),
        Err(TemplateError::InvalidPath { .. })
    ));
}
