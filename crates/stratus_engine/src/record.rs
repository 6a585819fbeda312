//! Evaluated inputs, outputs and vars.

use indexmap::IndexSet;
use stratus_foundation::{DeferredValue, Type, Value};
use stratus_language::TargetKind;

/// The evaluated state of one `input`, `output` or `var` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldRecord {
    /// Declared name.
    pub name: String,
    /// Which kind of declaration produced it.
    pub kind: TargetKind,
    /// Declared type, when one was written.
    pub ty: Option<Type>,
    /// Evaluated value; null while deferred.
    pub value: Value,
    /// What the value waits on, if anything.
    pub deferred: Option<DeferredValue>,
    /// Redact in output (`@sensitive`).
    pub sensitive: bool,
    /// `@description` text.
    pub description: Option<String>,
    /// Resources and components the value was computed from.
    pub dependencies: IndexSet<String>,
}

impl FieldRecord {
    /// Creates a record for `value`.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TargetKind, value: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: None,
            value,
            deferred: None,
            sensitive: false,
            description: None,
            dependencies: IndexSet::new(),
        }
    }

    /// Returns true if the value is waiting on a cloud-managed property.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// The value later expressions see: the placeholder while deferred.
    #[must_use]
    pub fn bound_value(&self) -> Value {
        match &self.deferred {
            Some(deferred) => Value::Deferred(deferred.clone()),
            None => self.value.clone(),
        }
    }
}
