//! Read-only traversal of expressions and statements.
//!
//! Implement the `visit_*` hooks of interest on [`ExprVisitor`]; the default
//! implementations do nothing. [`walk_expr`] and [`walk_statement`] drive the
//! traversal depth-first.
//!
//! # Example
//!
//! ```
//! use stratus_language::build::{binary, ident, int, member};
//! use stratus_language::visitor::{ExprVisitor, walk_expr};
//! use stratus_language::{BinaryOp, Span};
//!
//! struct IdentCounter(usize);
//!
//! impl ExprVisitor for IdentCounter {
//!     fn visit_identifier(&mut self, _name: &str, _span: Span) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let e = binary(BinaryOp::Add, member(ident("vpc"), "size"), ident("extra"));
//! let mut counter = IdentCounter(0);
//! walk_expr(&mut counter, &e);
//! assert_eq!(counter.0, 2);
//! ```

use crate::ast::{Expr, Statement, TemplatePart};
use crate::span::Span;

// =============================================================================
// Visitor
// =============================================================================

/// Trait for read-only expression visitors.
#[allow(unused_variables)]
pub trait ExprVisitor {
    /// Called when entering any expression node.
    fn enter_expr(&mut self, expr: &Expr) {}

    /// Called when leaving any expression node, after its children.
    fn leave_expr(&mut self, expr: &Expr) {}

    /// Visit an identifier.
    fn visit_identifier(&mut self, name: &str, span: Span) {}

    /// Visit a member access, before its target is walked.
    fn visit_member(&mut self, target: &Expr, property: &str, span: Span) {}

    /// Visit the literal text of an interpolated string.
    fn visit_template_text(&mut self, text: &str) {}

    /// Visit a struct instantiation, before its fields are walked.
    fn visit_struct_init(&mut self, name: &str, span: Span) {}
}

/// Walks an expression depth-first.
pub fn walk_expr<V: ExprVisitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    visitor.enter_expr(expr);

    match expr {
        Expr::Null(_) | Expr::Bool(..) | Expr::Int(..) | Expr::Float(..) | Expr::String(..) => {}

        Expr::Template(parts, _) => {
            for part in parts {
                match part {
                    TemplatePart::Literal(text) => visitor.visit_template_text(text),
                    TemplatePart::Expr(inner) => walk_expr(visitor, inner),
                }
            }
        }

        Expr::Identifier(name, span) => visitor.visit_identifier(name, *span),

        Expr::Member(target, property, span) => {
            visitor.visit_member(target, property, *span);
            walk_expr(visitor, target);
        }

        Expr::Index(target, index, _) => {
            walk_expr(visitor, target);
            walk_expr(visitor, index);
        }

        Expr::Array(items, _) => {
            for item in items {
                walk_expr(visitor, item);
            }
        }

        Expr::Object(entries, _) => {
            for (_, value) in entries {
                walk_expr(visitor, value);
            }
        }

        Expr::StructInit(name, fields, span) => {
            visitor.visit_struct_init(name, *span);
            for (_, value) in fields {
                walk_expr(visitor, value);
            }
        }

        Expr::Range(start, end, _) => {
            walk_expr(visitor, start);
            walk_expr(visitor, end);
        }

        Expr::Unary(_, operand, _) => walk_expr(visitor, operand),

        Expr::Binary(_, left, right, _) => {
            walk_expr(visitor, left);
            walk_expr(visitor, right);
        }

        Expr::Conditional(cond, then, otherwise, _) => {
            walk_expr(visitor, cond);
            walk_expr(visitor, then);
            walk_expr(visitor, otherwise);
        }
    }

    visitor.leave_expr(expr);
}

/// Walks every expression reachable from a statement, including annotation
/// arguments, defaults and nested bodies.
pub fn walk_statement<V: ExprVisitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    for annotation in statement.annotations() {
        for arg in &annotation.args {
            walk_expr(visitor, arg);
        }
    }

    match statement {
        Statement::Schema(decl) => {
            for property in &decl.properties {
                for arg in property.annotations.iter().flat_map(|a| &a.args) {
                    walk_expr(visitor, arg);
                }
                if let Some(default) = &property.default {
                    walk_expr(visitor, default);
                }
            }
        }
        Statement::Struct(decl) => {
            for default in decl.fields.iter().filter_map(|f| f.default.as_ref()) {
                walk_expr(visitor, default);
            }
        }
        Statement::Resource(decl) => {
            for assignment in &decl.properties {
                walk_expr(visitor, &assignment.value);
            }
        }
        Statement::ComponentDef(def) => walk_statements(visitor, &def.body),
        Statement::Component(instance) => {
            for assignment in &instance.inputs {
                walk_expr(visitor, &assignment.value);
            }
        }
        Statement::Input(decl) => {
            if let Some(default) = &decl.default {
                walk_expr(visitor, default);
            }
        }
        Statement::Output(decl) => {
            if let Some(value) = &decl.value {
                walk_expr(visitor, value);
            }
        }
        Statement::Var(decl) => walk_expr(visitor, &decl.value),
        Statement::Assign(assignment) => walk_expr(visitor, &assignment.value),
        Statement::For(stmt) => {
            walk_expr(visitor, &stmt.iterable);
            walk_statements(visitor, &stmt.body);
        }
    }
}

/// Walks statements in order.
pub fn walk_statements<V: ExprVisitor + ?Sized>(visitor: &mut V, statements: &[Statement]) {
    for statement in statements {
        walk_statement(visitor, statement);
    }
}

// =============================================================================
// Queries
// =============================================================================

#[derive(Default)]
struct RootCollector {
    roots: Vec<String>,
}

impl ExprVisitor for RootCollector {
    fn visit_identifier(&mut self, name: &str, _span: Span) {
        if !self.roots.iter().any(|r| r == name) {
            self.roots.push(name.to_string());
        }
    }
}

/// Every identifier an expression reads, deduplicated, in first-seen order.
///
/// For `vpc.subnets[i].id + extra` this is `["vpc", "i", "extra"]`.
#[must_use]
pub fn referenced_roots(expr: &Expr) -> Vec<String> {
    let mut collector = RootCollector::default();
    walk_expr(&mut collector, expr);
    collector.roots
}

/// Every identifier read anywhere inside `statement`.
#[must_use]
pub fn statement_roots(statement: &Statement) -> Vec<String> {
    let mut collector = RootCollector::default();
    walk_statement(&mut collector, statement);
    collector.roots
}
