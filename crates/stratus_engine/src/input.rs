//! The seam through which program inputs receive external values.

use indexmap::IndexMap;
use stratus_foundation::{Result, Type, Value};

/// Supplies values for `input` declarations.
///
/// Returning `Ok(None)` means no source has a value; the declaration's
/// default is used next, and `MissingInput` is raised without one.
pub trait InputProvider {
    /// Looks up the external value for `name`.
    ///
    /// # Errors
    /// Implementations report unreadable or unparsable sources.
    fn resolve(&self, name: &str, ty: &Type) -> Result<Option<Value>>;
}

/// Provides no external values.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInputs;

impl InputProvider for NoInputs {
    fn resolve(&self, _name: &str, _ty: &Type) -> Result<Option<Value>> {
        Ok(None)
    }
}

/// Provides values from an in-memory map.
#[derive(Clone, Debug, Default)]
pub struct StaticInputs {
    values: IndexMap<String, Value>,
}

impl StaticInputs {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Sets a value, replacing any earlier one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }
}

impl InputProvider for StaticInputs {
    fn resolve(&self, name: &str, _ty: &Type) -> Result<Option<Value>> {
        Ok(self.values.get(name).filter(|v| !v.is_null()).cloned())
    }
}

impl<P: InputProvider + ?Sized> InputProvider for &P {
    fn resolve(&self, name: &str, ty: &Type) -> Result<Option<Value>> {
        (**self).resolve(name, ty)
    }
}
