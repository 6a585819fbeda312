//! Abstract syntax tree and source tooling for the Stratus DSL.
//!
//! Parsing and type checking happen upstream; this crate defines the
//! validated tree the engine consumes. It provides:
//! - [`ast`] - Statements, declarations, expressions and annotations
//! - [`build`] - Terse constructors for assembling trees by hand
//! - [`template`] - Splitting `"name-$count"` strings into interpolation parts
//! - [`visitor`] - Read-only expression traversal
//! - [`pretty`] - Rendering declarations back to source for diagnostics

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod build;
pub mod pretty;
pub mod span;
pub mod template;
pub mod visitor;

pub use ast::{
    Annotation, Assignment, BinaryOp, ComponentDef, ComponentInstance, Expr, ForStatement,
    InputDecl, OutputDecl, Program, ResourceDecl, SchemaDecl, SchemaProperty, Statement,
    StructDecl, StructField, TargetKind, TemplatePart, UnaryOp, VarDecl,
};
pub use pretty::{pretty_expr, pretty_statement};
pub use span::Span;
pub use template::{TemplateError, parse_template};
pub use visitor::{ExprVisitor, referenced_roots, walk_expr, walk_statement};
