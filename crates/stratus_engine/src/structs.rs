//! User-declared struct types and their instances.

use indexmap::IndexMap;
use stratus_foundation::{Error, Result, Value};
use stratus_language::StructDecl;

/// A struct declaration kept in scope for instantiation.
pub type StructDef = StructDecl;

/// An instance of a declared struct type.
///
/// Fields keep declaration order. Converted into a plain object value once
/// built.
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
    type_name: String,
    fields: IndexMap<String, Value>,
}

impl StructValue {
    /// Builds an instance from explicitly given fields, filling the rest
    /// with `defaults` (already evaluated) or null.
    ///
    /// # Errors
    /// Returns `UnknownProperty` for fields the struct does not declare.
    pub fn build(
        def: &StructDef,
        given: impl IntoIterator<Item = (String, Value)>,
        mut defaults: impl FnMut(&str) -> Result<Option<Value>>,
    ) -> Result<Self> {
        let mut given: IndexMap<String, Value> = given.into_iter().collect();
        if let Some(unknown) = given
            .keys()
            .find(|k| !def.fields.iter().any(|f| &f.name == *k))
        {
            return Err(Error::unknown_property(&def.name, unknown.as_str()));
        }

        let mut fields = IndexMap::with_capacity(def.fields.len());
        for field in &def.fields {
            let value = match given.swap_remove(&field.name) {
                Some(value) => value,
                None => defaults(&field.name)?.unwrap_or(Value::Null),
            };
            fields.insert(field.name.clone(), value);
        }

        Ok(Self {
            type_name: def.name.clone(),
            fields,
        })
    }

    /// Struct type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Converts into an object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::object(self.fields)
    }
}
