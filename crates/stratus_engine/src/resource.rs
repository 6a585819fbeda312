//! Concrete resource instances.
//!
//! A [`ResourceValue`] is created when a `resource` statement is interpreted
//! (once per `@count` index or loop item) and is mutated as its properties are
//! assigned or deferred. Nothing is ever removed during a run.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use stratus_foundation::{DeferredValue, Environment, Result, Value};

use crate::tracker::EdgeKind;

// =============================================================================
// Tags
// =============================================================================

/// Tags attached with `@tags`: keyed entries plus bare labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagSet {
    entries: IndexMap<String, Value>,
    labels: IndexSet<String>,
}

impl TagSet {
    /// Creates an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a keyed tag; a later value for the same key replaces the earlier.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Adds a bare label.
    pub fn label(&mut self, label: impl Into<String>) {
        self.labels.insert(label.into());
    }

    /// Returns the value of a keyed tag.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns true if `label` was added.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Keyed tags in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Returns true if no tags or labels are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.labels.is_empty()
    }
}

// =============================================================================
// Shared instance bookkeeping
// =============================================================================

/// Dependency, deferral and metadata bookkeeping shared by resources and
/// component instances.
#[derive(Clone, Debug, Default)]
pub struct InstanceMeta {
    dependencies: IndexMap<String, EdgeKind>,
    deferred_properties: IndexMap<String, DeferredValue>,
    providers: IndexSet<String>,
    tags: TagSet,
    sensitive: IndexSet<String>,
    description: Option<String>,
}

impl InstanceMeta {
    /// Records a dependency, keeping the strongest kind per target.
    pub fn add_dependency(&mut self, name: impl Into<String>, kind: EdgeKind) {
        let slot = self.dependencies.entry(name.into()).or_insert(kind);
        *slot = (*slot).max(kind);
    }

    /// Records that `property` waits on `deferred`, and the matching
    /// dependency on its resource.
    pub fn defer_property(&mut self, property: impl Into<String>, deferred: DeferredValue) {
        self.add_dependency(deferred.dependency_name(), EdgeKind::Deferred);
        self.deferred_properties.insert(property.into(), deferred);
    }

    /// Names this instance depends on, in recording order.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Dependencies with their edge kinds.
    pub fn dependency_edges(&self) -> impl Iterator<Item = (&str, EdgeKind)> {
        self.dependencies.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns true if this instance depends on `name`.
    #[must_use]
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// Property name to placeholder for every deferred property.
    #[must_use]
    pub fn deferred_properties(&self) -> &IndexMap<String, DeferredValue> {
        &self.deferred_properties
    }

    /// Returns true if any property is waiting on a deferred value.
    #[must_use]
    pub fn has_deferred_properties(&self) -> bool {
        !self.deferred_properties.is_empty()
    }

    /// Adds a provider name; duplicates are ignored.
    pub fn add_provider(&mut self, provider: impl Into<String>) {
        self.providers.insert(provider.into());
    }

    /// Provider names in first-seen order.
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(String::as_str)
    }

    /// Tags attached with `@tags`.
    #[must_use]
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Mutable access to the tags.
    pub fn tags_mut(&mut self) -> &mut TagSet {
        &mut self.tags
    }

    /// Marks a property as sensitive.
    pub fn mark_sensitive(&mut self, property: impl Into<String>) {
        self.sensitive.insert(property.into());
    }

    /// Returns true if `property` must be redacted in output.
    #[must_use]
    pub fn is_sensitive(&self, property: &str) -> bool {
        self.sensitive.contains(property)
    }

    /// The `@description` text, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }
}

// =============================================================================
// ResourceValue
// =============================================================================

/// One concrete resource instance.
pub struct ResourceValue {
    name: String,
    schema: String,
    properties: Environment<Value>,
    existing: Option<String>,
    meta: InstanceMeta,
}

impl ResourceValue {
    /// Creates an instance of `schema` with no properties.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            properties: Environment::new(),
            existing: None,
            meta: InstanceMeta::default(),
        }
    }

    /// Instance name, possibly indexed (`main[0]`, `main["prod"]`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema type this instance conforms to.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Declares a property.
    ///
    /// # Errors
    /// Returns `DeclarationExists` if the property was already initialized.
    pub fn init(&self, property: impl Into<String>, value: Value) -> Result<()> {
        self.properties.init(property, value)
    }

    /// Updates an initialized property.
    ///
    /// # Errors
    /// Returns `UndefinedSymbol` if the property was never initialized.
    pub fn assign(&self, property: &str, value: Value) -> Result<()> {
        self.properties.assign(property, value)
    }

    /// Returns a property value.
    #[must_use]
    pub fn lookup(&self, property: &str) -> Option<Value> {
        self.properties.lookup(property)
    }

    /// Alias for [`ResourceValue::lookup`].
    #[must_use]
    pub fn get(&self, property: &str) -> Option<Value> {
        self.properties.get(property)
    }

    /// Property names in assignment order.
    #[must_use]
    pub fn property_names(&self) -> Vec<String> {
        self.properties.names()
    }

    /// Properties in assignment order.
    #[must_use]
    pub fn properties(&self) -> Vec<(String, Value)> {
        self.properties.entries()
    }

    /// The properties as an object value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::object(self.properties.entries())
    }

    /// Identifier of the already-provisioned object this resource models.
    #[must_use]
    pub fn existing(&self) -> Option<&str> {
        self.existing.as_deref()
    }

    /// Marks this resource as modeling an already-provisioned object.
    pub fn set_existing(&mut self, id: impl Into<String>) {
        self.existing = Some(id.into());
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

    /// Returns true if any property is waiting on a deferred value.
    #[must_use]
    pub fn has_deferred_properties(&self) -> bool {
        self.meta.has_deferred_properties()
    }

    /// Property name to placeholder for every deferred property.
    #[must_use]
    pub fn deferred_properties(&self) -> &IndexMap<String, DeferredValue> {
        self.meta.deferred_properties()
    }

    /// Names this instance depends on.
    #[must_use]
    pub fn dependencies(&self) -> Vec<&str> {
        self.meta.dependencies().collect()
    }
}

impl fmt::Debug for ResourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceValue")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("properties", &self.properties)
            .field("existing", &self.existing)
            .field("meta", &self.meta)
            .finish()
    }
}
