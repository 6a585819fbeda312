//! Tree-walking interpreter for Stratus programs.
//!
//! Statements run in program order. Resource and component declarations of a
//! block are hoisted as [`Binding::Pending`] before the block runs, so a
//! reference to a declaration further down evaluates it on demand. The
//! [`DependencyTracker`] marks each declaration gray while it is evaluated;
//! reaching a gray declaration for an immediate value is a cycle, while
//! reaching one of its `@cloud` properties yields a [`DeferredValue`].
//!
//! Evaluation is split across modules that all extend [`Interpreter`]:
//!
//! - `expr` - literals, operators, templates, struct instantiation
//! - `references` - identifier, member and index resolution
//! - `resources` - resource instances and `@count` expansion
//! - `components` - component instantiation
//! - `decorators` - annotation checking and dispatch
//! - `loops` - `for` statements and instance groups
//! - `declarations` - schemas, structs, inputs, outputs, vars

mod components;
mod declarations;
mod decorators;
mod expr;
mod loops;
mod references;
mod resources;

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use stratus_foundation::{DeferredValue, Environment, Error, ErrorKind, Result, Value};
use stratus_language::{ComponentDef, Expr, Program, Statement, StructDecl, pretty_statement};
use tracing::{debug, info};

use crate::component::ComponentValue;
use crate::config::EngineConfig;
use crate::decorator::DecoratorRegistry;
use crate::evaluation::Evaluation;
use crate::input::{InputProvider, NoInputs};
use crate::record::FieldRecord;
use crate::resource::ResourceValue;
use crate::schema::SchemaValue;
use crate::template::DeferredResourceTemplate;
use crate::tracker::{DependencyTracker, EdgeKind};
use crate::Shared;

// =============================================================================
// Bindings
// =============================================================================

/// What a name in an interpreter scope refers to.
#[derive(Clone, Debug)]
pub enum Binding {
    /// An input, var, loop variable or `count`.
    Value(Value),
    /// A schema declaration.
    Schema(Shared<SchemaValue>),
    /// A struct declaration.
    Struct(Rc<StructDecl>),
    /// A component definition with the scope it was declared in.
    ComponentDef(Rc<ComponentDefinition>),
    /// A single resource instance.
    Resource(Shared<ResourceValue>),
    /// A single component instance.
    Component(Shared<ComponentValue>),
    /// Instances produced by `@count` or a loop.
    Group(Shared<InstanceGroup>),
    /// A counted declaration whose count is deferred.
    Template(Rc<DeferredResourceTemplate>),
    /// A hoisted declaration not evaluated yet.
    Pending(Rc<PendingDecl>),
}

/// A component definition closed over its declaring scope.
pub struct ComponentDefinition {
    /// The definition as written.
    pub decl: ComponentDef,
    /// Scope the body's free names resolve in.
    pub scope: Environment<Binding>,
}

/// A resource or component statement waiting to be evaluated.
pub struct PendingDecl {
    /// The statement.
    pub statement: Statement,
    /// Where it was declared.
    pub site: Site,
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentDefinition({})", self.decl.name)
    }
}

impl fmt::Debug for PendingDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.statement.name().unwrap_or_default();
        write!(f, "PendingDecl({})", self.site.qualify(name))
    }
}

/// One instance of an expanded declaration.
#[derive(Clone, Debug)]
pub enum Instance {
    /// A resource instance.
    Resource(Shared<ResourceValue>),
    /// A component instance.
    Component(Shared<ComponentValue>),
}

impl Instance {
    /// Qualified instance name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Resource(r) => r.borrow().name().to_string(),
            Self::Component(c) => c.borrow().name().to_string(),
        }
    }
}

/// Instances sharing a base name, keyed by their suffix (`[0]`, `["prod"]`).
#[derive(Clone, Debug, Default)]
pub struct InstanceGroup {
    /// Qualified base name.
    pub base: String,
    /// Instances in creation order.
    pub instances: IndexMap<String, Instance>,
}

impl InstanceGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            instances: IndexMap::new(),
        }
    }

    /// Instances whose suffix starts with `segment`, as a group named
    /// `base{segment}`. Nested loops produce suffixes like `["a"][0]`, read
    /// one index at a time.
    #[must_use]
    pub fn subgroup(&self, segment: &str) -> Self {
        let instances = self
            .instances
            .iter()
            .filter_map(|(suffix, instance)| {
                let rest = suffix.strip_prefix(segment)?;
                (!rest.is_empty()).then(|| (rest.to_string(), instance.clone()))
            })
            .collect();
        Self {
            base: format!("{}{segment}", self.base),
            instances,
        }
    }
}

// =============================================================================
// Sites and frames
// =============================================================================

/// Where a statement executes: its scope and how names declared there are
/// qualified.
#[derive(Clone)]
pub struct Site {
    /// The lexical scope.
    pub scope: Environment<Binding>,
    /// Prepended to declared names, `api.` inside component instance `api`.
    pub prefix: String,
    /// Appended to declared names, `["prod"]` inside a loop iteration.
    pub suffix: String,
    /// Scope outside the enclosing loops, where instance groups live.
    pub group_scope: Option<Environment<Binding>>,
    /// The component instance whose body is executing.
    pub component: Option<Shared<ComponentValue>>,
    /// Names bound by enclosing `for` statements.
    pub loop_vars: Vec<String>,
}

impl Site {
    /// The program's top level.
    #[must_use]
    pub fn root() -> Self {
        Self::in_scope(Environment::new())
    }

    /// An unqualified site over `scope`.
    #[must_use]
    pub fn in_scope(scope: Environment<Binding>) -> Self {
        Self {
            scope,
            prefix: String::new(),
            suffix: String::new(),
            group_scope: None,
            component: None,
            loop_vars: Vec::new(),
        }
    }

    /// The same site over a different scope.
    #[must_use]
    pub fn with_scope(&self, scope: Environment<Binding>) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    /// Qualified name of a declaration made here.
    #[must_use]
    pub fn qualify(&self, name: &str) -> String {
        format!("{}{name}{}", self.prefix, self.suffix)
    }

    /// True at the program's top level, outside loops and components.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.component.is_none() && self.group_scope.is_none()
    }
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("prefix", &self.prefix)
            .field("suffix", &self.suffix)
            .field("depth", &self.scope.depth())
            .field("loop_vars", &self.loop_vars)
            .finish_non_exhaustive()
    }
}

/// What one expression evaluation touched.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    owner: String,
    touched: IndexMap<String, EdgeKind>,
    deferred: Vec<DeferredValue>,
}

impl Frame {
    /// The placeholder a value computed in this frame waits on.
    fn blocking(&self, value: &Value) -> Option<DeferredValue> {
        value
            .as_deferred()
            .or_else(|| self.deferred.first())
            .cloned()
    }

    /// Touched names other than the frame's owner.
    fn dependencies(&self) -> impl Iterator<Item = (&str, EdgeKind)> {
        self.touched
            .iter()
            .filter(|(name, _)| **name != self.owner)
            .map(|(name, kind)| (name.as_str(), *kind))
    }
}

// =============================================================================
// Interpreter
// =============================================================================

/// Evaluates a [`Program`] into an [`Evaluation`].
///
/// # Example
///
/// ```
/// use stratus_engine::Interpreter;
/// use stratus_foundation::Type;
/// use stratus_language::build::{cloud, ident, member, prop, resource, schema, string};
/// use stratus_language::{Program, Statement};
///
/// let program: Program = [
///     Statement::from(schema("Vpc", [prop(Type::String, "cidr"), cloud(Type::String, "id")])),
///     resource("Vpc", "main").with_property("cidr", string("10.0.0.0/16")).into(),
/// ]
/// .into_iter()
/// .collect();
///
/// let evaluation = Interpreter::new().evaluate(&program).unwrap();
/// assert_eq!(evaluation.resources().len(), 1);
/// ```
pub struct Interpreter {
    config: EngineConfig,
    registry: Rc<DecoratorRegistry>,
    inputs: Box<dyn InputProvider>,
    tracker: DependencyTracker,
    schemas: IndexMap<String, Shared<SchemaValue>>,
    components: IndexMap<String, Shared<ComponentValue>>,
    input_records: IndexMap<String, FieldRecord>,
    output_records: IndexMap<String, FieldRecord>,
    var_records: IndexMap<String, FieldRecord>,
    templates: Vec<DeferredResourceTemplate>,
    frames: Vec<Frame>,
    depth: usize,
}

impl Interpreter {
    /// Creates an interpreter with the default configuration, every built-in
    /// decorator, and no external inputs.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an interpreter with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            registry: Rc::new(DecoratorRegistry::standard()),
            inputs: Box::new(NoInputs),
            tracker: DependencyTracker::new(),
            schemas: IndexMap::new(),
            components: IndexMap::new(),
            input_records: IndexMap::new(),
            output_records: IndexMap::new(),
            var_records: IndexMap::new(),
            templates: Vec::new(),
            frames: Vec::new(),
            depth: 0,
        }
    }

    /// Supplies external values for program inputs.
    #[must_use]
    pub fn with_inputs(mut self, inputs: impl InputProvider + 'static) -> Self {
        self.inputs = Box::new(inputs);
        self
    }

    /// Replaces the decorator registry.
    #[must_use]
    pub fn with_registry(mut self, registry: DecoratorRegistry) -> Self {
        self.registry = Rc::new(registry);
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs `program` to completion.
    ///
    /// # Errors
    /// Any error aborts the run; the partially built state is discarded.
    pub fn evaluate(mut self, program: &Program) -> Result<Evaluation> {
        debug!(statements = program.statements.len(), "evaluating program");
        self.execute_block(&program.statements, &Site::root())?;
        self.tracker.expand_groups();
        self.tracker.check_acyclic()?;

        let evaluation = Evaluation::new(
            self.schemas,
            self.components,
            self.input_records,
            self.output_records,
            self.var_records,
            self.templates,
            self.tracker,
        );
        info!(
            schemas = evaluation.schemas().count(),
            resources = evaluation.resources().len(),
            components = evaluation.components().count(),
            templates = evaluation.templates().len(),
            "evaluation complete"
        );
        Ok(evaluation)
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// Runs a block: type declarations first, then hoisting, then every
    /// statement in order.
    pub(crate) fn execute_block(&mut self, statements: &[Statement], site: &Site) -> Result<()> {
        for statement in statements {
            let declared = match statement {
                Statement::Schema(decl) => self.declare_schema(decl, site),
                Statement::Struct(decl) => self.declare_struct(decl, site),
                Statement::ComponentDef(decl) => self.declare_component_def(decl, site),
                _ => Ok(()),
            };
            declared.map_err(|e| e.with_declaration(pretty_statement(statement)))?;
        }

        for statement in statements {
            if let Statement::Resource(_) | Statement::Component(_) = statement {
                let Some(name) = statement.name() else {
                    continue;
                };
                let pending = PendingDecl {
                    statement: statement.clone(),
                    site: site.clone(),
                };
                site.scope
                    .init(name, Binding::Pending(Rc::new(pending)))
                    .map_err(|e| {
                        e.with_declaration(pretty_statement(statement))
                            .with_frame(site.qualify(name))
                    })?;
            }
        }

        for statement in statements {
            self.execute_statement(statement, site)
                .map_err(|e| e.with_declaration(pretty_statement(statement)))?;
        }
        Ok(())
    }

    fn execute_statement(&mut self, statement: &Statement, site: &Site) -> Result<()> {
        match statement {
            Statement::Schema(_) | Statement::Struct(_) | Statement::ComponentDef(_) => Ok(()),
            Statement::Resource(decl) => self.ensure_evaluated(&decl.name, site),
            Statement::Component(decl) => self.ensure_evaluated(&decl.name, site),
            Statement::Input(decl) => self.declare_input(decl, site),
            Statement::Output(decl) => self.declare_output(decl, site),
            Statement::Var(decl) => self.declare_var(decl, site),
            Statement::Assign(assignment) => self.assign(assignment, site),
            Statement::For(stmt) => self.execute_for(stmt, site),
        }
    }

    /// Evaluates a hoisted declaration unless a forward reference already did.
    fn ensure_evaluated(&mut self, name: &str, site: &Site) -> Result<()> {
        if let Some(Binding::Pending(pending)) = site.scope.get(name) {
            self.evaluate_pending(name, &pending)?;
        }
        Ok(())
    }

    /// Evaluates a hoisted declaration and replaces its binding.
    pub(crate) fn evaluate_pending(&mut self, name: &str, pending: &PendingDecl) -> Result<Binding> {
        let qualified = pending.site.qualify(name);
        if self.depth >= self.config.max_depth {
            return Err(
                Error::new(ErrorKind::DepthExceeded(self.config.max_depth)).with_frame(qualified)
            );
        }

        self.depth += 1;
        let result = match &pending.statement {
            Statement::Resource(decl) => self.evaluate_resource(decl, &pending.site),
            Statement::Component(decl) => self.evaluate_component(decl, &pending.site),
            other => Err(Error::internal(format!(
                "cannot evaluate {} on demand",
                other.name().unwrap_or("statement")
            ))),
        };
        self.depth -= 1;

        let binding = result.map_err(|e| e.with_declaration(pretty_statement(&pending.statement)))?;
        pending.site.scope.assign(name, binding.clone())?;
        Ok(binding)
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Evaluates `expr` in a fresh frame owned by `owner`.
    pub(crate) fn eval_in_frame(
        &mut self,
        owner: &str,
        expr: &Expr,
        site: &Site,
    ) -> Result<(Value, Frame)> {
        self.frames.push(Frame {
            owner: owner.to_string(),
            ..Frame::default()
        });
        let result = self.eval_expr(expr, site);
        let frame = self.frames.pop().unwrap_or_default();
        Ok((result?, frame))
    }

    /// Records that the current expression read `name`.
    pub(crate) fn touch(&mut self, name: &str, kind: EdgeKind) {
        if let Some(frame) = self.frames.last_mut() {
            let slot = frame.touched.entry(name.to_string()).or_insert(kind);
            *slot = (*slot).max(kind);
        }
    }

    /// Records that the current expression produced a deferred value.
    pub(crate) fn note_deferred(&mut self, deferred: &DeferredValue) {
        self.touch(deferred.dependency_name(), EdgeKind::Deferred);
        if let Some(frame) = self.frames.last_mut() {
            if !frame.deferred.contains(deferred) {
                frame.deferred.push(deferred.clone());
            }
        }
    }

    /// Registers an instance with the tracker along with its dependencies.
    pub(crate) fn record_edges<'a>(
        &mut self,
        name: &str,
        edges: impl IntoIterator<Item = (&'a str, EdgeKind)>,
    ) {
        self.tracker.add_node(name);
        for (target, kind) in edges {
            self.tracker.add_edge(name, target, kind);
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates `program` with the default configuration and no external
/// inputs.
///
/// # Errors
/// Returns the first error raised by any declaration.
pub fn evaluate(program: &Program) -> Result<Evaluation> {
    Interpreter::new().evaluate(program)
}

/// Evaluates `program` with external inputs.
///
/// # Errors
/// Returns the first error raised by any declaration.
pub fn evaluate_with_inputs(
    program: &Program,
    inputs: impl InputProvider + 'static,
) -> Result<Evaluation> {
    Interpreter::new().with_inputs(inputs).evaluate(program)
}
