//! Abstract Syntax Tree for the Stratus DSL.
//!
//! The tree arrives already validated: names resolve to declarations of the
//! right kind, decorators sit on legal targets, and types line up. The engine
//! still re-checks decorator targets, but everything else is taken on trust.

use std::fmt;

use stratus_foundation::Type;

use crate::span::Span;

// =============================================================================
// Program
// =============================================================================

/// A complete program: top-level statements in source order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    /// Statements in source order.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Creates a program from statements.
    #[must_use]
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

impl FromIterator<Statement> for Program {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// =============================================================================
// Statements
// =============================================================================

/// A statement at program level or inside a component or loop body.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `schema Vm { ... }`
    Schema(SchemaDecl),
    /// `struct Cidr { ... }`
    Struct(StructDecl),
    /// `resource Vm main { ... }`
    Resource(ResourceDecl),
    /// `component WebServer { ... }` (definition)
    ComponentDef(ComponentDef),
    /// `component WebServer api { ... }` (instance)
    Component(ComponentInstance),
    /// `input string region = "us-east-1"`
    Input(InputDecl),
    /// `output string id = vpc.id`
    Output(OutputDecl),
    /// `var name = expr`
    Var(VarDecl),
    /// `name = expr` (reassigns an existing var)
    Assign(Assignment),
    /// `for item in iterable { ... }`
    For(ForStatement),
}

impl Statement {
    /// The declared name, if this statement declares one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Schema(d) => Some(&d.name),
            Self::Struct(d) => Some(&d.name),
            Self::Resource(d) => Some(&d.name),
            Self::ComponentDef(d) => Some(&d.name),
            Self::Component(d) => Some(&d.name),
            Self::Input(d) => Some(&d.name),
            Self::Output(d) => Some(&d.name),
            Self::Var(d) => Some(&d.name),
            Self::Assign(a) => Some(&a.name),
            Self::For(_) => None,
        }
    }

    /// The decorators attached to this statement.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        match self {
            Self::Schema(d) => &d.annotations,
            Self::Resource(d) => &d.annotations,
            Self::ComponentDef(d) => &d.annotations,
            Self::Component(d) => &d.annotations,
            Self::Input(d) => &d.annotations,
            Self::Output(d) => &d.annotations,
            Self::Var(d) => &d.annotations,
            Self::Struct(_) | Self::Assign(_) | Self::For(_) => &[],
        }
    }

    /// The decorator target kind this statement represents, if any.
    #[must_use]
    pub const fn target_kind(&self) -> Option<TargetKind> {
        match self {
            Self::Schema(_) => Some(TargetKind::Schema),
            Self::Resource(_) => Some(TargetKind::Resource),
            Self::ComponentDef(_) | Self::Component(_) => Some(TargetKind::Component),
            Self::Input(_) => Some(TargetKind::Input),
            Self::Output(_) => Some(TargetKind::Output),
            Self::Var(_) => Some(TargetKind::Var),
            Self::Struct(_) | Self::Assign(_) | Self::For(_) => None,
        }
    }

    /// Source location of this statement.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Schema(d) => d.span,
            Self::Struct(d) => d.span,
            Self::Resource(d) => d.span,
            Self::ComponentDef(d) => d.span,
            Self::Component(d) => d.span,
            Self::Input(d) => d.span,
            Self::Output(d) => d.span,
            Self::Var(d) => d.span,
            Self::Assign(a) => a.span,
            Self::For(f) => f.span,
        }
    }
}

/// The kinds of declaration a decorator can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKind {
    /// `input` declarations.
    Input,
    /// `output` declarations.
    Output,
    /// `var` declarations.
    Var,
    /// `resource` declarations.
    Resource,
    /// `component` definitions and instances.
    Component,
    /// `schema` declarations.
    Schema,
    /// A property inside a `schema`.
    SchemaProperty,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Var => "var",
            Self::Resource => "resource",
            Self::Component => "component",
            Self::Schema => "schema",
            Self::SchemaProperty => "schema property",
        };
        f.write_str(name)
    }
}

/// A decorator application such as `@count(2)` or `@sensitive`.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    /// Decorator name without the `@`.
    pub name: String,
    /// Positional arguments.
    pub args: Vec<Expr>,
    /// Source span for error reporting.
    pub span: Span,
}

impl Annotation {
    /// Creates an annotation with arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
            span: Span::synthetic(),
        }
    }

    /// Creates an annotation with no arguments.
    #[must_use]
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// `name = value`, inside resource and component bodies or at statement level.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// Property or variable being assigned.
    pub name: String,
    /// Initializer.
    pub value: Expr,
    /// Source span for error reporting.
    pub span: Span,
}

impl Assignment {
    /// Creates an assignment.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
            span: Span::synthetic(),
        }
    }
}

/// Finds an annotation by name.
fn find<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.name == name)
}

// =============================================================================
// Schemas and structs
// =============================================================================

/// `schema Vm { string name  @cloud string id }`
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaDecl {
    /// Schema type name.
    pub name: String,
    /// Declared properties in order.
    pub properties: Vec<SchemaProperty>,
    /// Decorators on the schema itself.
    pub annotations: Vec<Annotation>,
    /// Source span for error reporting.
    pub span: Span,
}

impl SchemaDecl {
    /// Creates an empty schema declaration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            annotations: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, property: SchemaProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a decorator.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// One property of a schema.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaProperty {
    /// Property name.
    pub name: String,
    /// Declared type.
    pub ty: Type,
    /// Default initializer.
    pub default: Option<Expr>,
    /// Decorators on the property (`@cloud`, `@allowed`, ...).
    pub annotations: Vec<Annotation>,
    /// Source span for error reporting.
    pub span: Span,
}

impl SchemaProperty {
    /// Creates a property without default.
    #[must_use]
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            annotations: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Creates a `@cloud` property.
    #[must_use]
    pub fn cloud(ty: Type, name: impl Into<String>) -> Self {
        Self::new(ty, name).with_annotation(Annotation::flag("cloud"))
    }

    /// Sets the default initializer.
    #[must_use]
    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }

    /// Adds a decorator.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns true if the property carries `@cloud`.
    #[must_use]
    pub fn is_cloud(&self) -> bool {
        find(&self.annotations, "cloud").is_some()
    }
}

/// `struct Cidr { string block = "10.0.0.0/16" }`
#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    /// Struct type name.
    pub name: String,
    /// Fields in order.
    pub fields: Vec<StructField>,
    /// Source span for error reporting.
    pub span: Span,
}

impl StructDecl {
    /// Creates an empty struct declaration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, ty: Type, name: impl Into<String>, default: Option<Expr>) -> Self {
        self.fields.push(StructField {
            name: name.into(),
            ty,
            default,
        });
        self
    }
}

/// One field of a struct.
#[derive(Clone, Debug, PartialEq)]
pub struct StructField {
    /// Field name.
    pub name: String,
    /// Declared type.
    pub ty: Type,
    /// Default initializer.
    pub default: Option<Expr>,
}

// =============================================================================
// Resources and components
// =============================================================================

/// `resource Vm main { name = "x" }`
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceDecl {
    /// Schema type this resource conforms to.
    pub schema: String,
    /// Base instance name.
    pub name: String,
    /// Property initializers in source order.
    pub properties: Vec<Assignment>,
    /// Decorators on the resource.
    pub annotations: Vec<Annotation>,
    /// Source span for error reporting.
    pub span: Span,
}

impl ResourceDecl {
    /// Creates a resource declaration with an empty body.
    #[must_use]
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            properties: Vec::new(),
            annotations: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Adds a property initializer.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Expr) -> Self {
        self.properties.push(Assignment::new(name, value));
        self
    }

    /// Adds a decorator.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns the decorator with the given name.
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find(&self.annotations, name)
    }
}

/// `component WebServer { input ...  resource ...  output ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentDef {
    /// Component type name.
    pub name: String,
    /// Body statements: inputs, vars, resources, nested components, outputs.
    pub body: Vec<Statement>,
    /// Decorators on the definition.
    pub annotations: Vec<Annotation>,
    /// Source span for error reporting.
    pub span: Span,
}

impl ComponentDef {
    /// Creates a component definition.
    #[must_use]
    pub fn new(name: impl Into<String>, body: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            body,
            annotations: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Adds a decorator.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// The input declarations of this component.
    pub fn inputs(&self) -> impl Iterator<Item = &InputDecl> {
        self.body.iter().filter_map(|s| match s {
            Statement::Input(input) => Some(input),
            _ => None,
        })
    }
}

/// `component WebServer api { name = "api" }`
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentInstance {
    /// Component type being instantiated.
    pub component: String,
    /// Base instance name.
    pub name: String,
    /// Input assignments.
    pub inputs: Vec<Assignment>,
    /// Decorators on the instance.
    pub annotations: Vec<Annotation>,
    /// Source span for error reporting.
    pub span: Span,
}

impl ComponentInstance {
    /// Creates an instance with no input assignments.
    #[must_use]
    pub fn new(component: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            name: name.into(),
            inputs: Vec::new(),
            annotations: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Adds an input assignment.
    #[must_use]
    pub fn with_input(mut self, name: impl Into<String>, value: Expr) -> Self {
        self.inputs.push(Assignment::new(name, value));
        self
    }

    /// Adds a decorator.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns the decorator with the given name.
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find(&self.annotations, name)
    }
}

// =============================================================================
// Inputs, outputs, vars, loops
// =============================================================================

/// `input string region = "us-east-1"`
#[derive(Clone, Debug, PartialEq)]
pub struct InputDecl {
    /// Declared type.
    pub ty: Type,
    /// Input name.
    pub name: String,
    /// Default used when no external source supplies a value.
    pub default: Option<Expr>,
    /// Decorators on the input.
    pub annotations: Vec<Annotation>,
    /// Source span for error reporting.
    pub span: Span,
}

impl InputDecl {
    /// Creates an input declaration without default.
    #[must_use]
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
            default: None,
            annotations: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Sets the default.
    #[must_use]
    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }

    /// Adds a decorator.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// `output string id = vpc.id`
#[derive(Clone, Debug, PartialEq)]
pub struct OutputDecl {
    /// Declared type.
    pub ty: Type,
    /// Output name.
    pub name: String,
    /// Initializer; required, but validated by the engine.
    pub value: Option<Expr>,
    /// Decorators on the output.
    pub annotations: Vec<Annotation>,
    /// Source span for error reporting.
    pub span: Span,
}

impl OutputDecl {
    /// Creates an output declaration.
    #[must_use]
    pub fn new(ty: Type, name: impl Into<String>, value: Option<Expr>) -> Self {
        Self {
            ty,
            name: name.into(),
            value,
            annotations: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Adds a decorator.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// `var string name = expr`
#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    /// Declared type, if written.
    pub ty: Option<Type>,
    /// Variable name.
    pub name: String,
    /// Initializer.
    pub value: Expr,
    /// Decorators on the variable.
    pub annotations: Vec<Annotation>,
    /// Source span for error reporting.
    pub span: Span,
}

impl VarDecl {
    /// Creates an untyped var declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self {
            ty: None,
            name: name.into(),
            value,
            annotations: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Sets the declared type.
    #[must_use]
    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Adds a decorator.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// `for item in iterable { ... }` or `for index, item in iterable { ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct ForStatement {
    /// Optional position variable.
    pub index: Option<String>,
    /// Item variable.
    pub item: String,
    /// Range, array or object to iterate.
    pub iterable: Expr,
    /// Statements executed per iteration.
    pub body: Vec<Statement>,
    /// Source span for error reporting.
    pub span: Span,
}

impl ForStatement {
    /// Creates a loop without position variable.
    #[must_use]
    pub fn new(item: impl Into<String>, iterable: Expr, body: Vec<Statement>) -> Self {
        Self {
            index: None,
            item: item.into(),
            iterable,
            body,
            span: Span::synthetic(),
        }
    }

    /// Sets the position variable.
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!x`
    Not,
    /// `-x`
    Negate,
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+` (numbers, string concatenation, array concatenation)
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// The operator as written in source.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// A piece of an interpolated string.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplatePart {
    /// Literal text.
    Literal(String),
    /// `$name` or `${expr}`
    Expr(Expr),
}

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// `null`
    Null(Span),
    /// `true` or `false`
    Bool(bool, Span),
    /// Integer literal like `42`
    Int(i64, Span),
    /// Decimal literal like `2.5`
    Float(f64, Span),
    /// String literal without interpolation
    String(String, Span),
    /// Interpolated string like `"name-$count"`
    Template(Vec<TemplatePart>, Span),
    /// Identifier like `vpc` or `count`
    Identifier(String, Span),
    /// Member access like `vpc.id`
    Member(Box<Expr>, String, Span),
    /// Index access like `subnets[0]` or `envs["prod"]`
    Index(Box<Expr>, Box<Expr>, Span),
    /// Array literal like `[1, 2]`
    Array(Vec<Expr>, Span),
    /// Object literal like `{ env: "prod" }`
    Object(Vec<(String, Expr)>, Span),
    /// Half-open range like `0..3`
    Range(Box<Expr>, Box<Expr>, Span),
    /// Unary operation
    Unary(UnaryOp, Box<Expr>, Span),
    /// Binary operation
    Binary(BinaryOp, Box<Expr>, Box<Expr>, Span),
    /// `cond ? then : otherwise`
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>, Span),
    /// Struct instantiation like `Cidr { block = "10.0.0.0/16" }`
    StructInit(String, Vec<(String, Expr)>, Span),
}

impl Expr {
    /// Returns the source span of this expression.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Null(s)
            | Self::Bool(_, s)
            | Self::Int(_, s)
            | Self::Float(_, s)
            | Self::String(_, s)
            | Self::Template(_, s)
            | Self::Identifier(_, s)
            | Self::Member(_, _, s)
            | Self::Index(_, _, s)
            | Self::Array(_, s)
            | Self::Object(_, s)
            | Self::Range(_, _, s)
            | Self::Unary(_, _, s)
            | Self::Binary(_, _, _, s)
            | Self::Conditional(_, _, _, s)
            | Self::StructInit(_, _, s) => *s,
        }
    }

    /// Returns true for literal nodes (no identifiers anywhere inside).
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Null(_) | Self::Bool(..) | Self::Int(..) | Self::Float(..) | Self::String(..) => {
                true
            }
            Self::Array(items, _) => items.iter().all(Expr::is_literal),
            Self::Object(entries, _) => entries.iter().all(|(_, v)| v.is_literal()),
            _ => false,
        }
    }

    /// The identifier at the root of a member/index chain.
    ///
    /// `vpc.id` → `vpc`, `subnets[0].id` → `subnets`, `count` → `count`.
    #[must_use]
    pub fn root_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name, _) => Some(name),
            Self::Member(inner, _, _) | Self::Index(inner, _, _) => inner.root_identifier(),
            _ => None,
        }
    }
}
