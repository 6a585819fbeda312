//! Schema types and their instance registries.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use stratus_foundation::{Environment, Error, Result, Type, Value};
use stratus_language::{Annotation, Expr};

use crate::resource::ResourceValue;
use crate::{Shared, shared};

/// A validation decorator stored on a schema property, with its evaluated
/// arguments, to run against every value assigned to that property.
#[derive(Clone, Debug)]
pub struct PropertyValidator {
    /// The annotation as written.
    pub annotation: Annotation,
    /// Arguments evaluated when the schema was declared.
    pub args: Vec<Value>,
}

/// One declared property of a schema.
#[derive(Clone, Debug)]
pub struct PropertyDef {
    /// Property name.
    pub name: String,
    /// Declared type.
    pub ty: Type,
    /// Default initializer, evaluated per instance.
    pub default: Option<Expr>,
    /// Populated only by the provider during apply (`@cloud`).
    pub cloud: bool,
    /// Redacted in output (`@sensitive`).
    pub sensitive: bool,
    /// `@description` text.
    pub description: Option<String>,
    /// Validation decorators to run on assigned values.
    pub validators: Vec<PropertyValidator>,
}

impl PropertyDef {
    /// Creates a plain property.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            cloud: false,
            sensitive: false,
            description: None,
            validators: Vec::new(),
        }
    }
}

/// One declared schema: its property shape and every instance created from it.
pub struct SchemaValue {
    type_name: String,
    properties: IndexMap<String, PropertyDef>,
    instances: Environment<Shared<ResourceValue>>,
    groups: IndexMap<String, Vec<String>>,
    description: Option<String>,
}

impl SchemaValue {
    /// Creates a schema with no properties.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: IndexMap::new(),
            instances: Environment::new(),
            groups: IndexMap::new(),
            description: None,
        }
    }

    /// Schema type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Adds a property definition.
    ///
    /// # Errors
    /// Returns `DeclarationExists` if the schema already declares it.
    pub fn add_property(&mut self, property: PropertyDef) -> Result<()> {
        if self.properties.contains_key(&property.name) {
            return Err(Error::declaration_exists(format!(
                "{}.{}",
                self.type_name, property.name
            )));
        }
        self.properties.insert(property.name.clone(), property);
        Ok(())
    }

    /// Returns a property definition.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Property definitions in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.values()
    }

    /// Returns true if `name` is a `@cloud` property.
    #[must_use]
    pub fn is_cloud(&self, name: &str) -> bool {
        self.property(name).is_some_and(|p| p.cloud)
    }

    /// `@description` text of the schema.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Sets the schema description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    // =========================================================================
    // Instances
    // =========================================================================

    /// Registers a new instance under `name`.
    ///
    /// # Errors
    /// Returns `DeclarationExists` if an instance with this name exists.
    pub fn init_instance(
        &self,
        name: impl Into<String>,
        resource: Shared<ResourceValue>,
    ) -> Result<()> {
        self.instances.init(name, resource)
    }

    /// Returns the instance registered under `name`.
    #[must_use]
    pub fn get_instance(&self, name: &str) -> Option<Shared<ResourceValue>> {
        self.instances.get(name)
    }

    /// Returns the instance under `name`, creating and registering it with
    /// `factory` first if it does not exist.
    ///
    /// # Errors
    /// Propagates errors from `factory`.
    pub fn get_instance_or_else_get(
        &self,
        name: &str,
        factory: impl FnOnce() -> Result<ResourceValue>,
    ) -> Result<Shared<ResourceValue>> {
        if let Some(existing) = self.get_instance(name) {
            return Ok(existing);
        }
        let created = shared(factory()?);
        self.instances.init(name, Rc::clone(&created))?;
        Ok(created)
    }

    /// Instance names in creation order.
    #[must_use]
    pub fn instance_names(&self) -> Vec<String> {
        self.instances.names()
    }

    /// Instances in creation order.
    #[must_use]
    pub fn instances(&self) -> Vec<Shared<ResourceValue>> {
        self.instances.entries().into_iter().map(|(_, r)| r).collect()
    }

    /// Number of instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Records `instance` as a member of the count/loop group `base`.
    pub fn add_to_group(&mut self, base: &str, instance: impl Into<String>) {
        self.groups
            .entry(base.to_string())
            .or_default()
            .push(instance.into());
    }

    /// Instance names produced for `base` by `@count` or a loop.
    #[must_use]
    pub fn group(&self, base: &str) -> Option<&[String]> {
        self.groups.get(base).map(Vec::as_slice)
    }
}

impl fmt::Debug for SchemaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValue")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("instances", &self.instances.names())
            .field("groups", &self.groups)
            .finish()
    }
}
