//! Terse constructors for expressions and statements.
//!
//! Trees normally come from the parser; these helpers exist for embedders
//! and tests that assemble programs in code. Every node gets a synthetic span.
//!
//! ```
//! use stratus_language::build::{ident, member, resource, string};
//!
//! let stmt = resource("Subnet", "subnet")
//!     .with_property("name", string("private"))
//!     .with_property("vpcId", member(ident("vpc"), "id"));
//! assert_eq!(stmt.properties.len(), 2);
//! ```

use stratus_foundation::Type;

use crate::ast::{
    Annotation, Assignment, BinaryOp, ComponentDef, ComponentInstance, Expr, ForStatement,
    InputDecl, OutputDecl, ResourceDecl, SchemaDecl, SchemaProperty, Statement, StructDecl,
    TemplatePart, UnaryOp, VarDecl,
};
use crate::span::Span;
use crate::template::{TemplateError, parse_template};

const S: Span = Span::synthetic();

// =============================================================================
// Expressions
// =============================================================================

/// `null`
#[must_use]
pub const fn null() -> Expr {
    Expr::Null(S)
}

/// `true` / `false`
#[must_use]
pub const fn boolean(value: bool) -> Expr {
    Expr::Bool(value, S)
}

/// Integer literal.
#[must_use]
pub const fn int(value: i64) -> Expr {
    Expr::Int(value, S)
}

/// Decimal literal.
#[must_use]
pub const fn float(value: f64) -> Expr {
    Expr::Float(value, S)
}

/// String literal, taken verbatim (no interpolation).
#[must_use]
pub fn string(value: impl Into<String>) -> Expr {
    Expr::String(value.into(), S)
}

/// Interpolated string: `"name-$count"`, `"${vpc.id}"`.
///
/// Text without any `$` yields a plain string literal.
///
/// # Errors
/// Returns an error for unterminated or malformed `${...}` segments.
pub fn template(source: &str) -> Result<Expr, TemplateError> {
    let parts = parse_template(source)?;
    Ok(Expr::template(parts))
}

/// Identifier reference.
#[must_use]
pub fn ident(name: impl Into<String>) -> Expr {
    Expr::Identifier(name.into(), S)
}

/// `target.property`
#[must_use]
pub fn member(target: Expr, property: impl Into<String>) -> Expr {
    Expr::Member(Box::new(target), property.into(), S)
}

/// `target[index]`
#[must_use]
pub fn idx(target: Expr, index: Expr) -> Expr {
    Expr::Index(Box::new(target), Box::new(index), S)
}

/// Dotted path such as `vpc.id` or `app.vpc.cidr`.
#[must_use]
pub fn path(dotted: &str) -> Expr {
    let mut segments = dotted.split('.');
    let root = ident(segments.next().unwrap_or_default());
    segments.fold(root, member)
}

/// `[a, b, ...]`
#[must_use]
pub fn array(items: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Array(items.into_iter().collect(), S)
}

/// `{ key: value, ... }`
#[must_use]
pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Expr)>) -> Expr {
    Expr::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect(), S)
}

/// `start..end`
#[must_use]
pub fn range(start: Expr, end: Expr) -> Expr {
    Expr::Range(Box::new(start), Box::new(end), S)
}

/// Unary operation.
#[must_use]
pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary(op, Box::new(operand), S)
}

/// Binary operation.
#[must_use]
pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(op, Box::new(left), Box::new(right), S)
}

/// `cond ? then : otherwise`
#[must_use]
pub fn conditional(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
    Expr::Conditional(Box::new(cond), Box::new(then), Box::new(otherwise), S)
}

/// `Type { field = value, ... }`
#[must_use]
pub fn struct_init<K: Into<String>>(
    name: impl Into<String>,
    fields: impl IntoIterator<Item = (K, Expr)>,
) -> Expr {
    Expr::StructInit(
        name.into(),
        fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        S,
    )
}

impl Expr {
    /// Builds an interpolated string node, collapsing pure literals.
    #[must_use]
    pub fn template(parts: Vec<TemplatePart>) -> Self {
        match parts.as_slice() {
            [] => Self::String(String::new(), S),
            [TemplatePart::Literal(text)] => Self::String(text.clone(), S),
            _ => Self::Template(parts, S),
        }
    }
}

// =============================================================================
// Annotations
// =============================================================================

/// `@name(args...)`
#[must_use]
pub fn annotation(name: &str, args: impl IntoIterator<Item = Expr>) -> Annotation {
    Annotation::new(name, args.into_iter().collect())
}

/// `@count(expr)`
#[must_use]
pub fn count(expr: Expr) -> Annotation {
    annotation("count", [expr])
}

// =============================================================================
// Statements
// =============================================================================

/// `schema Name { ... }`
#[must_use]
pub fn schema(name: &str, properties: impl IntoIterator<Item = SchemaProperty>) -> SchemaDecl {
    properties
        .into_iter()
        .fold(SchemaDecl::new(name), SchemaDecl::with_property)
}

/// A plain schema property.
#[must_use]
pub fn prop(ty: Type, name: &str) -> SchemaProperty {
    SchemaProperty::new(ty, name)
}

/// A `@cloud` schema property.
#[must_use]
pub fn cloud(ty: Type, name: &str) -> SchemaProperty {
    SchemaProperty::cloud(ty, name)
}

/// `struct Name { ... }` with the given `(type, name, default)` fields.
#[must_use]
pub fn structure(
    name: &str,
    fields: impl IntoIterator<Item = (Type, &'static str, Option<Expr>)>,
) -> StructDecl {
    fields
        .into_iter()
        .fold(StructDecl::new(name), |decl, (ty, field, default)| {
            decl.with_field(ty, field, default)
        })
}

/// `resource Schema name { }`
#[must_use]
pub fn resource(schema: &str, name: &str) -> ResourceDecl {
    ResourceDecl::new(schema, name)
}

/// `component Name { body }`
#[must_use]
pub fn component_def(name: &str, body: impl IntoIterator<Item = Statement>) -> ComponentDef {
    ComponentDef::new(name, body.into_iter().collect())
}

/// `component Type name { }`
#[must_use]
pub fn component(ty: &str, name: &str) -> ComponentInstance {
    ComponentInstance::new(ty, name)
}

/// `input type name`
#[must_use]
pub fn input(ty: Type, name: &str) -> InputDecl {
    InputDecl::new(ty, name)
}

/// `output type name = value`
#[must_use]
pub fn output(ty: Type, name: &str, value: Expr) -> OutputDecl {
    OutputDecl::new(ty, name, Some(value))
}

/// `var name = value`
#[must_use]
pub fn var(name: &str, value: Expr) -> VarDecl {
    VarDecl::new(name, value)
}

/// `name = value`
#[must_use]
pub fn assign(name: &str, value: Expr) -> Statement {
    Statement::Assign(Assignment::new(name, value))
}

/// `for item in iterable { body }`
#[must_use]
pub fn for_each(
    item: &str,
    iterable: Expr,
    body: impl IntoIterator<Item = Statement>,
) -> ForStatement {
    ForStatement::new(item, iterable, body.into_iter().collect())
}

macro_rules! into_statement {
    ($($decl:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$decl> for Statement {
                fn from(decl: $decl) -> Self {
                    Self::$variant(decl)
                }
            }
        )*
    };
}

into_statement! {
    SchemaDecl => Schema,
    StructDecl => Struct,
    ResourceDecl => Resource,
    ComponentDef => ComponentDef,
    ComponentInstance => Component,
    InputDecl => Input,
    OutputDecl => Output,
    VarDecl => Var,
    ForStatement => For,
}
