//! Decorator framework.
//!
//! Every annotation in a program is executed by a [`Decorator`] looked up by
//! name in a [`DecoratorRegistry`]. A decorator declares the declaration kinds
//! it may be attached to, how its arguments are passed, and whether it runs
//! before instantiation ([`Phase::Expand`], only `@count`) or after its target
//! has been interpreted ([`Phase::Finalize`]).

mod metadata;
mod resource;
mod validation;

use std::fmt;
use std::ops::RangeInclusive;

use indexmap::IndexMap;
use stratus_foundation::{Error, ErrorKind, Result, Value};
use stratus_language::{Annotation, TargetKind};

use crate::component::ComponentValue;
use crate::count::CountDirective;
use crate::record::FieldRecord;
use crate::resource::{InstanceMeta, ResourceValue};
use crate::schema::{PropertyDef, SchemaValue};

pub use metadata::{Cloud, Description, Sensitive};
pub use resource::{Count, DependsOn, Existing, Provider, Tags};
pub use validation::{Allowed, MaxLength, MaxValue, MinLength, MinValue, NonEmpty, Unique};

/// Legal targets of decorators that validate a value.
pub const VALUE_TARGETS: &[TargetKind] = &[
    TargetKind::Input,
    TargetKind::Output,
    TargetKind::Var,
    TargetKind::SchemaProperty,
];

/// Legal targets of decorators that annotate a resource or component.
pub const INSTANCE_TARGETS: &[TargetKind] = &[TargetKind::Resource, TargetKind::Component];

/// Every target kind.
pub const ALL_TARGETS: &[TargetKind] = &[
    TargetKind::Input,
    TargetKind::Output,
    TargetKind::Var,
    TargetKind::Resource,
    TargetKind::Component,
    TargetKind::Schema,
    TargetKind::SchemaProperty,
];

// =============================================================================
// Decorator contract
// =============================================================================

/// When a decorator runs relative to its target's interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Before any instance exists; drives instantiation.
    Expand,
    /// Once per instance, after the body has been interpreted.
    Finalize,
}

/// How annotation arguments reach [`Decorator::execute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgumentMode {
    /// Arguments are evaluated to values.
    Evaluated,
    /// Arguments name resources or components and are not evaluated.
    Names,
}

/// The declaration a decorator is applied to.
pub enum Subject<'a> {
    /// A resource instance.
    Resource(&'a mut ResourceValue),
    /// A component instance.
    Component(&'a mut ComponentValue),
    /// An input, output or var.
    Field(&'a mut FieldRecord),
    /// A schema property while the schema is declared.
    Property(&'a mut PropertyDef),
    /// A value assigned to a schema property of a resource.
    Value {
        /// `Schema.property` being validated.
        name: &'a str,
        /// The assigned value.
        value: &'a Value,
    },
    /// A schema declaration.
    Schema(&'a mut SchemaValue),
    /// Nothing; used by the expansion phase.
    Unit,
}

impl Subject<'_> {
    /// Resource or component bookkeeping, if the subject has any.
    pub fn meta_mut(&mut self) -> Option<&mut InstanceMeta> {
        match self {
            Self::Resource(r) => Some(r.meta_mut()),
            Self::Component(c) => Some(c.meta_mut()),
            _ => None,
        }
    }

    /// The value under validation and the name to report it by.
    #[must_use]
    pub fn validated_value(&self) -> Option<(&str, &Value)> {
        match self {
            Self::Field(record) => Some((record.name.as_str(), &record.value)),
            Self::Value { name, value } => Some((*name, *value)),
            _ => None,
        }
    }
}

impl fmt::Debug for Subject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(r) => write!(f, "Resource({})", r.name()),
            Self::Component(c) => write!(f, "Component({})", c.name()),
            Self::Field(record) => write!(f, "Field({})", record.name),
            Self::Property(p) => write!(f, "Property({})", p.name),
            Self::Value { name, .. } => write!(f, "Value({name})"),
            Self::Schema(s) => write!(f, "Schema({})", s.type_name()),
            Self::Unit => f.write_str("Unit"),
        }
    }
}

/// Everything a decorator sees when it executes.
#[derive(Debug)]
pub struct DecoratorContext<'a> {
    /// The annotation as written.
    pub annotation: &'a Annotation,
    /// Evaluated arguments ([`ArgumentMode::Evaluated`]).
    pub args: &'a [Value],
    /// Resolved instance names ([`ArgumentMode::Names`]).
    pub names: &'a [String],
    /// The declaration being decorated.
    pub subject: Subject<'a>,
}

impl<'a> DecoratorContext<'a> {
    /// Creates a context with evaluated arguments.
    #[must_use]
    pub fn new(annotation: &'a Annotation, args: &'a [Value], subject: Subject<'a>) -> Self {
        Self {
            annotation,
            args,
            names: &[],
            subject,
        }
    }

    /// Sets the resolved names for [`ArgumentMode::Names`] decorators.
    #[must_use]
    pub fn with_names(mut self, names: &'a [String]) -> Self {
        self.names = names;
        self
    }

    /// The first evaluated argument.
    ///
    /// # Errors
    /// Returns `DecoratorValidation` if no argument was passed.
    pub fn arg(&self) -> Result<&Value> {
        self.args
            .first()
            .ok_or_else(|| Error::decorator(&self.annotation.name, "missing argument"))
    }

    /// The first argument as a string.
    ///
    /// # Errors
    /// Returns `DecoratorValidation` if it is missing or not a string.
    pub fn string_arg(&self) -> Result<&str> {
        let arg = self.arg()?;
        arg.as_str().ok_or_else(|| {
            Error::decorator(
                &self.annotation.name,
                format!("expected a string, found {}", arg.value_type()),
            )
            .with_value(arg)
        })
    }

    /// The first argument as a number.
    ///
    /// # Errors
    /// Returns `DecoratorValidation` if it is missing or not numeric.
    pub fn number_arg(&self) -> Result<f64> {
        let arg = self.arg()?;
        arg.as_number().ok_or_else(|| {
            Error::decorator(
                &self.annotation.name,
                format!("expected a number, found {}", arg.value_type()),
            )
            .with_value(arg)
        })
    }

    /// Creates a validation error for this decorator.
    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::decorator(&self.annotation.name, message)
    }
}

/// What executing a decorator asks the interpreter to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Nothing beyond the mutations already applied to the subject.
    None,
    /// Instantiate the target according to the directive.
    Expand(CountDirective),
}

/// A named validator or mutator attached to declarations with `@name(...)`.
pub trait Decorator {
    /// Name without the `@`.
    fn name(&self) -> &'static str;

    /// Declaration kinds this decorator may be attached to.
    fn targets(&self) -> &'static [TargetKind];

    /// When the decorator runs.
    fn phase(&self) -> Phase {
        Phase::Finalize
    }

    /// How arguments are passed.
    fn arguments(&self) -> ArgumentMode {
        ArgumentMode::Evaluated
    }

    /// Accepted argument counts.
    fn arity(&self) -> RangeInclusive<usize>;

    /// Runs the decorator against its subject.
    ///
    /// # Errors
    /// Returns `DecoratorValidation` when the subject or arguments violate the
    /// decorator's contract.
    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect>;
}

// =============================================================================
// Registry
// =============================================================================

/// Decorators by name.
pub struct DecoratorRegistry {
    decorators: IndexMap<&'static str, Box<dyn Decorator>>,
}

impl DecoratorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decorators: IndexMap::new(),
        }
    }

    /// Creates a registry with every built-in decorator.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();

        // Instantiation and graph shape
        registry.register(Count);
        registry.register(DependsOn);
        registry.register(Existing);
        registry.register(Provider);
        registry.register(Tags);

        // Metadata
        registry.register(Sensitive);
        registry.register(Description);
        registry.register(Cloud);

        // Value validation
        registry.register(Allowed);
        registry.register(NonEmpty);
        registry.register(MinLength);
        registry.register(MaxLength);
        registry.register(MinValue);
        registry.register(MaxValue);
        registry.register(Unique);

        registry
    }

    /// Registers a decorator, replacing any with the same name.
    pub fn register<D: Decorator + 'static>(&mut self, decorator: D) {
        self.decorators.insert(decorator.name(), Box::new(decorator));
    }

    /// Looks up a decorator by name.
    ///
    /// # Errors
    /// Returns `UnknownDecorator` if none is registered.
    pub fn get(&self, name: &str) -> Result<&dyn Decorator> {
        self.decorators
            .get(name)
            .map(AsRef::as_ref)
            .ok_or_else(|| Error::new(ErrorKind::UnknownDecorator(name.to_string())))
    }

    /// Looks up the decorator for `annotation` and checks that it may be
    /// attached to `target` with the given arguments.
    ///
    /// # Errors
    /// Returns `UnknownDecorator`, `IllegalTarget`, or `DecoratorValidation`
    /// for a wrong argument count.
    pub fn check(&self, annotation: &Annotation, target: TargetKind) -> Result<&dyn Decorator> {
        let decorator = self.get(&annotation.name)?;
        if !decorator.targets().contains(&target) {
            return Err(Error::illegal_target(&annotation.name, target.to_string()));
        }
        let arity = decorator.arity();
        if !arity.contains(&annotation.args.len()) {
            let expected = if arity.start() == arity.end() {
                arity.start().to_string()
            } else if *arity.end() == usize::MAX {
                format!("at least {}", arity.start())
            } else {
                format!("{} to {}", arity.start(), arity.end())
            };
            return Err(Error::decorator(
                &annotation.name,
                format!(
                    "expected {expected} argument(s), found {}",
                    annotation.args.len()
                ),
            ));
        }
        Ok(decorator)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.decorators.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decorators.keys().copied()
    }

    /// Number of registered decorators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    /// Returns true if no decorators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }
}

impl Default for DecoratorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for DecoratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.decorators.keys()).finish()
    }
}

/// Flattens a string-or-array-of-strings argument, rejecting blanks.
fn string_list(ctx: &DecoratorContext<'_>, value: &Value) -> Result<Vec<String>> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| match item.as_str() {
            Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
            Some(_) => Err(ctx.error("value must not be blank").with_value(item)),
            None => Err(ctx
                .error(format!("expected a string, found {}", item.value_type()))
                .with_value(item)),
        })
        .collect()
}
