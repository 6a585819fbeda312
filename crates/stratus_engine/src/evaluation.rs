//! The result of a completed run.

use std::rc::Rc;

use indexmap::IndexMap;
use stratus_foundation::Result;

use crate::Shared;
use crate::component::ComponentValue;
use crate::record::FieldRecord;
use crate::resource::ResourceValue;
use crate::schema::SchemaValue;
use crate::template::DeferredResourceTemplate;
use crate::tracker::DependencyTracker;

/// Everything a run produced: schemas with their instances, component
/// instances, input/output/var records, deferred templates and the
/// dependency graph.
#[derive(Debug)]
pub struct Evaluation {
    schemas: IndexMap<String, Shared<SchemaValue>>,
    components: IndexMap<String, Shared<ComponentValue>>,
    inputs: IndexMap<String, FieldRecord>,
    outputs: IndexMap<String, FieldRecord>,
    vars: IndexMap<String, FieldRecord>,
    templates: Vec<DeferredResourceTemplate>,
    tracker: DependencyTracker,
}

impl Evaluation {
    /// Assembles an evaluation from its parts.
    #[must_use]
    pub fn new(
        schemas: IndexMap<String, Shared<SchemaValue>>,
        components: IndexMap<String, Shared<ComponentValue>>,
        inputs: IndexMap<String, FieldRecord>,
        outputs: IndexMap<String, FieldRecord>,
        vars: IndexMap<String, FieldRecord>,
        templates: Vec<DeferredResourceTemplate>,
        tracker: DependencyTracker,
    ) -> Self {
        Self {
            schemas,
            components,
            inputs,
            outputs,
            vars,
            templates,
            tracker,
        }
    }

    // =========================================================================
    // Schemas and resources
    // =========================================================================

    /// Returns a schema by type name.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<Shared<SchemaValue>> {
        self.schemas.get(name).cloned()
    }

    /// Schemas in declaration order.
    pub fn schemas(&self) -> impl Iterator<Item = (&str, &Shared<SchemaValue>)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the instance `name` of `schema`.
    #[must_use]
    pub fn instance(&self, schema: &str, name: &str) -> Option<Shared<ResourceValue>> {
        self.schemas.get(schema)?.borrow().get_instance(name)
    }

    /// Returns a resource instance by name, whatever its schema.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<Shared<ResourceValue>> {
        self.schemas
            .values()
            .find_map(|schema| schema.borrow().get_instance(name))
    }

    /// Every resource instance, grouped by schema in declaration order.
    #[must_use]
    pub fn resources(&self) -> Vec<Shared<ResourceValue>> {
        self.schemas
            .values()
            .flat_map(|schema| schema.borrow().instances())
            .collect()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Returns a component instance by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<Shared<ComponentValue>> {
        self.components.get(name).map(Rc::clone)
    }

    /// Component instances in creation order.
    pub fn components(&self) -> impl Iterator<Item = (&str, &Shared<ComponentValue>)> {
        self.components.iter().map(|(k, v)| (k.as_str(), v))
    }

    // =========================================================================
    // Inputs, outputs, vars
    // =========================================================================

    /// Returns a program input record.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&FieldRecord> {
        self.inputs.get(name)
    }

    /// Program inputs in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &FieldRecord> {
        self.inputs.values()
    }

    /// Returns a program output record.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&FieldRecord> {
        self.outputs.get(name)
    }

    /// Program outputs in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &FieldRecord> {
        self.outputs.values()
    }

    /// Returns a top-level var record.
    #[must_use]
    pub fn var(&self, name: &str) -> Option<&FieldRecord> {
        self.vars.get(name)
    }

    /// Top-level vars in declaration order.
    pub fn vars(&self) -> impl Iterator<Item = &FieldRecord> {
        self.vars.values()
    }

    // =========================================================================
    // Deferred work and ordering
    // =========================================================================

    /// Counted declarations waiting on values known only after apply.
    #[must_use]
    pub fn templates(&self) -> &[DeferredResourceTemplate] {
        &self.templates
    }

    /// The dependency graph of the run.
    #[must_use]
    pub fn tracker(&self) -> &DependencyTracker {
        &self.tracker
    }

    /// Names of every created resource and component instance.
    #[must_use]
    pub fn created_names(&self) -> Vec<String> {
        self.resources()
            .iter()
            .map(|r| r.borrow().name().to_string())
            .chain(self.components.keys().cloned())
            .collect()
    }

    /// Templates whose dependencies have all been created.
    #[must_use]
    pub fn ready_templates(&self) -> Vec<&DeferredResourceTemplate> {
        let created = self.created_names();
        self.templates
            .iter()
            .filter(|t| t.all_dependencies_resolved(created.iter().map(String::as_str)))
            .collect()
    }

    /// Instances ordered so dependencies come before dependents.
    ///
    /// # Errors
    /// Returns `Cycle` if explicit or value dependencies form a cycle.
    pub fn apply_order(&self) -> Result<Vec<String>> {
        self.tracker.topological_order()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;

    #[test]
    fn resources_are_found_across_schemas() {
        let vpc = SchemaValue::new("Vpc");
        vpc.init_instance("main", shared(ResourceValue::new("main", "Vpc")))
            .unwrap();
        let subnet = SchemaValue::new("Subnet");
        subnet
            .init_instance("a", shared(ResourceValue::new("a", "Subnet")))
            .unwrap();

        let mut schemas = IndexMap::new();
        schemas.insert("Vpc".to_string(), shared(vpc));
        schemas.insert("Subnet".to_string(), shared(subnet));
        let evaluation = Evaluation::new(
            schemas,
            IndexMap::new(),
            IndexMap::new(),
            IndexMap::new(),
            IndexMap::new(),
            Vec::new(),
            DependencyTracker::new(),
        );

        assert_eq!(evaluation.resources().len(), 2);
        assert!(evaluation.resource("a").is_some());
        assert!(evaluation.instance("Vpc", "a").is_none());
        assert_eq!(evaluation.created_names(), vec!["main", "a"]);
    }
}
