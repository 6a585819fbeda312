//! Pretty-printer for statements and expressions.
//!
//! Renders nodes back to Stratus source. The engine attaches the rendered
//! declaration to errors, so output favors readability over round-trip
//! fidelity of spans and whitespace.
//!
//! # Example
//!
//! ```
//! use stratus_language::build::{int, resource, string, count};
//! use stratus_language::pretty::pretty_statement;
//!
//! let stmt = resource("Vm", "main")
//!     .with_annotation(count(int(2)))
//!     .with_property("name", string("web"));
//! assert_eq!(
//!     pretty_statement(&stmt.into()),
//!     "@count(2)\nresource Vm main {\n  name = \"web\"\n}"
//! );
//! ```

use std::fmt::Write;

use crate::ast::{Annotation, Assignment, BinaryOp, Expr, Statement, TemplatePart, UnaryOp};

/// Configuration for pretty-printing.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Number of spaces for each indentation level.
    pub indent_width: usize,
    /// Put each annotation on its own line instead of inline before the keyword.
    pub annotations_on_own_line: bool,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            annotations_on_own_line: true,
        }
    }
}

/// Pretty-print an expression.
#[must_use]
pub fn pretty_expr(expr: &Expr) -> String {
    let mut printer = PrettyPrinter::new(PrettyConfig::default());
    printer.expr(expr);
    printer.output
}

/// Pretty-print a statement with the default configuration.
#[must_use]
pub fn pretty_statement(statement: &Statement) -> String {
    pretty_statement_with_config(statement, PrettyConfig::default())
}

/// Pretty-print a statement with a custom configuration.
#[must_use]
pub fn pretty_statement_with_config(statement: &Statement, config: PrettyConfig) -> String {
    let mut printer = PrettyPrinter::new(config);
    printer.statement(statement);
    printer.output
}

/// Pretty-print statements separated by blank lines.
#[must_use]
pub fn pretty_program(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(pretty_statement)
        .collect::<Vec<_>>()
        .join("\n\n")
}

struct PrettyPrinter {
    config: PrettyConfig,
    output: String,
    indent_level: usize,
}

impl PrettyPrinter {
    fn new(config: PrettyConfig) -> Self {
        Self {
            config,
            output: String::new(),
            indent_level: 0,
        }
    }

    fn indent(&mut self) {
        let width = self.indent_level * self.config.indent_width;
        self.output.extend(std::iter::repeat_n(' ', width));
    }

    fn newline(&mut self) {
        self.output.push('\n');
        self.indent();
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn statement(&mut self, statement: &Statement) {
        self.annotations(statement.annotations());

        match statement {
            Statement::Schema(decl) => {
                let _ = write!(self.output, "schema {}", decl.name);
                self.block(|p| {
                    for property in &decl.properties {
                        p.newline();
                        p.annotations(&property.annotations);
                        let _ = write!(p.output, "{} {}", property.ty, property.name);
                        if let Some(default) = &property.default {
                            p.output.push_str(" = ");
                            p.expr(default);
                        }
                    }
                });
            }
            Statement::Struct(decl) => {
                let _ = write!(self.output, "struct {}", decl.name);
                self.block(|p| {
                    for field in &decl.fields {
                        p.newline();
                        let _ = write!(p.output, "{} {}", field.ty, field.name);
                        if let Some(default) = &field.default {
                            p.output.push_str(" = ");
                            p.expr(default);
                        }
                    }
                });
            }
            Statement::Resource(decl) => {
                let _ = write!(self.output, "resource {} {}", decl.schema, decl.name);
                self.assignments(&decl.properties);
            }
            Statement::ComponentDef(def) => {
                let _ = write!(self.output, "component {}", def.name);
                self.block(|p| {
                    for inner in &def.body {
                        p.newline();
                        p.statement(inner);
                    }
                });
            }
            Statement::Component(instance) => {
                let _ = write!(
                    self.output,
                    "component {} {}",
                    instance.component, instance.name
                );
                self.assignments(&instance.inputs);
            }
            Statement::Input(decl) => {
                let _ = write!(self.output, "input {} {}", decl.ty, decl.name);
                if let Some(default) = &decl.default {
                    self.output.push_str(" = ");
                    self.expr(default);
                }
            }
            Statement::Output(decl) => {
                let _ = write!(self.output, "output {} {}", decl.ty, decl.name);
                if let Some(value) = &decl.value {
                    self.output.push_str(" = ");
                    self.expr(value);
                }
            }
            Statement::Var(decl) => {
                self.output.push_str("var ");
                if let Some(ty) = &decl.ty {
                    let _ = write!(self.output, "{ty} ");
                }
                let _ = write!(self.output, "{} = ", decl.name);
                self.expr(&decl.value);
            }
            Statement::Assign(assignment) => self.assignment(assignment),
            Statement::For(stmt) => {
                self.output.push_str("for ");
                if let Some(index) = &stmt.index {
                    let _ = write!(self.output, "{index}, ");
                }
                let _ = write!(self.output, "{} in ", stmt.item);
                self.expr(&stmt.iterable);
                self.block(|p| {
                    for inner in &stmt.body {
                        p.newline();
                        p.statement(inner);
                    }
                });
            }
        }
    }

    fn annotations(&mut self, annotations: &[Annotation]) {
        for annotation in annotations {
            let _ = write!(self.output, "@{}", annotation.name);
            if !annotation.args.is_empty() {
                self.output.push('(');
                self.comma_separated(&annotation.args);
                self.output.push(')');
            }
            if self.config.annotations_on_own_line {
                self.newline();
            } else {
                self.output.push(' ');
            }
        }
    }

    fn assignments(&mut self, assignments: &[Assignment]) {
        self.block(|p| {
            for assignment in assignments {
                p.newline();
                p.assignment(assignment);
            }
        });
    }

    fn assignment(&mut self, assignment: &Assignment) {
        let _ = write!(self.output, "{} = ", assignment.name);
        self.expr(&assignment.value);
    }

    /// ` { <body> }`, or ` {}` when the body prints nothing.
    fn block(&mut self, body: impl FnOnce(&mut Self)) {
        self.output.push_str(" {");
        let before = self.output.len();
        self.indent_level += 1;
        body(self);
        self.indent_level -= 1;
        if self.output.len() == before {
            self.output.push('}');
        } else {
            self.newline();
            self.output.push('}');
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Null(_) => self.output.push_str("null"),
            Expr::Bool(value, _) => {
                let _ = write!(self.output, "{value}");
            }
            Expr::Int(value, _) => {
                let _ = write!(self.output, "{value}");
            }
            Expr::Float(value, _) => self.float(*value),
            Expr::String(text, _) => self.string(text, false),
            Expr::Template(parts, _) => self.template(parts),
            Expr::Identifier(name, _) => self.output.push_str(name),
            Expr::Member(target, property, _) => {
                self.operand(target, u8::MAX);
                let _ = write!(self.output, ".{property}");
            }
            Expr::Index(target, index, _) => {
                self.operand(target, u8::MAX);
                self.output.push('[');
                self.expr(index);
                self.output.push(']');
            }
            Expr::Array(items, _) => {
                self.output.push('[');
                self.comma_separated(items);
                self.output.push(']');
            }
            Expr::Object(entries, _) => self.fields(entries, ": "),
            Expr::StructInit(name, fields, _) => {
                let _ = write!(self.output, "{name} ");
                self.fields(fields, " = ");
            }
            Expr::Range(start, end, _) => {
                self.operand(start, 0);
                self.output.push_str("..");
                self.operand(end, 0);
            }
            Expr::Unary(op, operand, _) => {
                self.output.push(match op {
                    UnaryOp::Not => '!',
                    UnaryOp::Negate => '-',
                });
                self.operand(operand, u8::MAX);
            }
            Expr::Binary(op, left, right, _) => {
                let prec = precedence(*op);
                self.operand(left, prec);
                let _ = write!(self.output, " {} ", op.symbol());
                self.operand(right, prec + 1);
            }
            Expr::Conditional(cond, then, otherwise, _) => {
                self.operand(cond, 1);
                self.output.push_str(" ? ");
                self.expr(then);
                self.output.push_str(" : ");
                self.expr(otherwise);
            }
        }
    }

    /// Prints `expr`, parenthesized when it binds looser than `min`.
    fn operand(&mut self, expr: &Expr, min: u8) {
        let binds = match expr {
            Expr::Binary(op, ..) => precedence(*op),
            Expr::Conditional(..) | Expr::Range(..) => 0,
            _ => u8::MAX,
        };
        if binds < min {
            self.output.push('(');
            self.expr(expr);
            self.output.push(')');
        } else {
            self.expr(expr);
        }
    }

    fn comma_separated(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.expr(item);
        }
    }

    fn fields(&mut self, entries: &[(String, Expr)], separator: &str) {
        if entries.is_empty() {
            self.output.push_str("{}");
            return;
        }
        self.output.push_str("{ ");
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            let _ = write!(self.output, "{key}{separator}");
            self.expr(value);
        }
        self.output.push_str(" }");
    }

    fn float(&mut self, n: f64) {
        let s = n.to_string();
        self.output.push_str(&s);
        if !s.contains('.') && !s.contains('e') && !s.contains("inf") && !s.contains("NaN") {
            self.output.push_str(".0");
        }
    }

    fn string(&mut self, text: &str, escape_dollar: bool) {
        self.output.push('"');
        self.string_body(text, escape_dollar);
        self.output.push('"');
    }

    fn string_body(&mut self, text: &str, escape_dollar: bool) {
        for c in text.chars() {
            match c {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\t' => self.output.push_str("\\t"),
                '$' if escape_dollar => self.output.push_str("$$"),
                c => self.output.push(c),
            }
        }
    }

    fn template(&mut self, parts: &[TemplatePart]) {
        self.output.push('"');
        for (i, part) in parts.iter().enumerate() {
            match part {
                TemplatePart::Literal(text) => self.string_body(text, true),
                TemplatePart::Expr(Expr::Identifier(name, _)) if !glues_to_next(parts, i) => {
                    let _ = write!(self.output, "${name}");
                }
                TemplatePart::Expr(inner) => {
                    self.output.push_str("${");
                    self.expr(inner);
                    self.output.push('}');
                }
            }
        }
        self.output.push('"');
    }
}

/// True when the literal after part `i` would extend a bare `$name`.
fn glues_to_next(parts: &[TemplatePart], i: usize) -> bool {
    matches!(
        parts.get(i + 1),
        Some(TemplatePart::Literal(next))
            if next.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_')
    )
}

const fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        BinaryOp::Eq | BinaryOp::Ne => 3,
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
        BinaryOp::Add | BinaryOp::Sub => 5,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
    }
}
