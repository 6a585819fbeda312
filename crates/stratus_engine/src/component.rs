//! Component instances.
//!
//! A component groups inputs, outputs and resources under one instance name.
//! Resources created inside an instance are registered with their schemas as
//! `instance.resource`; the component keeps the list of what it owns.

use std::fmt;

use indexmap::IndexSet;
use stratus_foundation::{Environment, Result, Value};

use crate::resource::InstanceMeta;

/// One instantiated component.
pub struct ComponentValue {
    name: String,
    component_type: String,
    properties: Environment<Value>,
    inputs: IndexSet<String>,
    outputs: IndexSet<String>,
    members: Vec<String>,
    meta: InstanceMeta,
}

impl ComponentValue {
    /// Creates an instance of the component type `component_type`.
    #[must_use]
    pub fn new(name: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component_type: component_type.into(),
            properties: Environment::new(),
            inputs: IndexSet::new(),
            outputs: IndexSet::new(),
            members: Vec::new(),
            meta: InstanceMeta::default(),
        }
    }

    /// Instance name, possibly indexed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The component type this is an instance of.
    #[must_use]
    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    /// Records the value of an input.
    ///
    /// # Errors
    /// Returns `DeclarationExists` if the input was already set.
    pub fn set_input(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        self.properties.init(name.clone(), value)?;
        self.inputs.insert(name);
        Ok(())
    }

    /// Records the value of an output.
    ///
    /// # Errors
    /// Returns `DeclarationExists` if an input or output already uses the name.
    pub fn set_output(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        self.properties.init(name.clone(), value)?;
        self.outputs.insert(name);
        Ok(())
    }

    /// Returns an input or output value.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.properties.lookup(name)
    }

    /// Input names in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(String::as_str)
    }

    /// Output names in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(String::as_str)
    }

    /// Inputs and outputs in declaration order.
    #[must_use]
    pub fn properties(&self) -> Vec<(String, Value)> {
        self.properties.entries()
    }

    /// Records a resource or nested component created by this instance.
    pub fn add_member(&mut self, qualified_name: impl Into<String>) {
        self.members.push(qualified_name.into());
    }

    /// Qualified names of everything this instance created.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Outputs as an object value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::object(
            self.properties
                .entries()
                .into_iter()
                .filter(|(name, _)| self.outputs.contains(name)),
        )
    }

    /// Dependency, deferral and metadata bookkeeping.
    #[must_use]
    pub fn meta(&self) -> &InstanceMeta {
        &self.meta
    }

    /// Mutable bookkeeping.
    pub fn meta_mut(&mut self) -> &mut InstanceMeta {
        &mut self.meta
    }

    /// Returns true if any input or output is waiting on a deferred value.
    #[must_use]
    pub fn has_deferred_properties(&self) -> bool {
        self.meta.has_deferred_properties()
    }
}

impl fmt::Debug for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentValue")
            .field("name", &self.name)
            .field("component_type", &self.component_type)
            .field("properties", &self.properties)
            .field("members", &self.members)
            .field("meta", &self.meta)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_and_outputs_share_a_namespace() {
        let mut api = ComponentValue::new("api", "WebServer");
        api.set_input("name", Value::from("api")).unwrap();
        api.set_output("url", Value::from("https://api")).unwrap();
        assert!(api.set_output("name", Value::Null).is_err());

        assert_eq!(api.inputs().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(api.outputs().collect::<Vec<_>>(), vec!["url"]);
        assert_eq!(api.lookup("url"), Some(Value::from("https://api")));
    }

    #[test]
    fn to_value_exposes_outputs_only() {
        let mut api = ComponentValue::new("api", "WebServer");
        api.set_input("name", Value::from("api")).unwrap();
        api.set_output("port", Value::Int(80)).unwrap();
        let v = api.to_value();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj.get(&"port".into()), Some(&Value::Int(80)));
    }

    #[test]
    fn members_recorded() {
        let mut api = ComponentValue::new("api", "WebServer");
        api.add_member("api.vm");
        assert_eq!(api.members(), ["api.vm"]);
    }
}
