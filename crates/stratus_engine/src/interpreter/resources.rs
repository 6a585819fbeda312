//! Resource instances and `@count` expansion.

use std::collections::BTreeSet;
use std::rc::Rc;

use stratus_foundation::{DeferredValue, Error, Result, Type, Value};
use stratus_language::{Annotation, Expr, ResourceDecl, Statement, TargetKind, pretty_expr};
use tracing::{debug, warn};

use super::decorators::Annotations;
use super::{Binding, Frame, Instance, InstanceGroup, Interpreter, Site};
use crate::count::CountDirective;
use crate::decorator::Subject;
use crate::resource::ResourceValue;
use crate::schema::{PropertyDef, SchemaValue};
use crate::template::DeferredResourceTemplate;
use crate::tracker::EdgeKind;
use crate::{Shared, shared};

/// How one instance of a declaration is produced.
pub(crate) struct InstancePlan<'a> {
    pub(crate) name: String,
    /// Bound as `count` inside the body.
    pub(crate) index: Option<i64>,
    pub(crate) finalize: &'a [&'a Annotation],
    /// Names the `@count` argument read.
    pub(crate) count_edges: &'a [(String, EdgeKind)],
}

impl Interpreter {
    /// Evaluates a resource declaration into a single instance, a group of
    /// counted instances, or a deferred template.
    pub(crate) fn evaluate_resource(&mut self, decl: &ResourceDecl, site: &Site) -> Result<Binding> {
        let base = site.qualify(&decl.name);
        self.tracker.begin(&base)?;
        let result = self.expand_resource(decl, site, &base);
        if result.is_ok() {
            self.tracker.finish(&base);
        } else {
            self.tracker.abandon(&base);
        }
        result.map_err(|e| e.with_frame(base))
    }

    fn expand_resource(&mut self, decl: &ResourceDecl, site: &Site, base: &str) -> Result<Binding> {
        let schema = match site.scope.lookup(&decl.schema) {
            Some(Binding::Schema(schema)) => schema,
            Some(_) => {
                return Err(Error::type_mismatch(format!(
                    "`{}` is not a schema",
                    decl.schema
                )));
            }
            None => return Err(Error::undefined_symbol(&decl.schema)),
        };
        let Annotations { count, finalize } =
            self.split_annotations(&decl.annotations, TargetKind::Resource)?;

        let Some(count) = count else {
            let plan = InstancePlan {
                name: base.to_string(),
                index: None,
                finalize: &finalize,
                count_edges: &[],
            };
            let resource = self.evaluate_instance(decl, &schema, site, &plan)?;
            return Ok(Binding::Resource(resource));
        };

        let (directive, count_edges) = self.expand_count(count, base, site)?;
        match directive {
            CountDirective::Deferred(blocked_on) => {
                let template = deferred_template(
                    base,
                    count,
                    Statement::Resource(decl.clone()),
                    &decl.schema,
                    &count_edges,
                    blocked_on,
                )?;
                self.templates.push(template.clone());
                Ok(Binding::Template(Rc::new(template)))
            }
            directive @ CountDirective::Instances(_) => {
                let mut group = InstanceGroup::new(base);
                for key in directive.keys() {
                    let plan = InstancePlan {
                        name: key.instance_name(base),
                        index: key.index(),
                        finalize: &finalize,
                        count_edges: &count_edges,
                    };
                    let resource = self.evaluate_instance(decl, &schema, site, &plan)?;
                    schema.borrow_mut().add_to_group(base, plan.name);
                    group
                        .instances
                        .insert(key.to_string(), Instance::Resource(resource));
                }
                debug!(resource = base, instances = group.instances.len(), "expanded @count");
                self.tracker
                    .add_group(base, group.instances.values().map(Instance::name));
                Ok(Binding::Group(shared(group)))
            }
        }
    }

    /// Creates one resource instance and registers it with its schema.
    fn evaluate_instance(
        &mut self,
        decl: &ResourceDecl,
        schema: &Shared<SchemaValue>,
        site: &Site,
        plan: &InstancePlan<'_>,
    ) -> Result<Shared<ResourceValue>> {
        let (type_name, properties) = {
            let schema = schema.borrow();
            let properties: Vec<PropertyDef> = schema.properties().cloned().collect();
            (schema.type_name().to_string(), properties)
        };
        check_assignments(decl, &type_name, &properties, self.config.strict_properties)?;

        let scope = site.scope.child();
        if let Some(index) = plan.index {
            scope.init("count", Binding::Value(Value::Int(index)))?;
        }
        let body = site.with_scope(scope);
        let name = plan.name.as_str();

        let mut resource = ResourceValue::new(name, type_name.as_str());
        for (dep, kind) in plan.count_edges {
            resource.meta_mut().add_dependency(dep.as_str(), *kind);
        }

        for property in &properties {
            let assigned = decl
                .properties
                .iter()
                .find(|a| a.name == property.name)
                .map(|a| &a.value);
            let initializer = assigned.or(property.default.as_ref());
            let (value, frame) = match initializer {
                Some(expr) if !property.cloud => self.eval_in_frame(name, expr, &body)?,
                _ => (Value::Null, Frame::default()),
            };
            self.settle_property(&mut resource, &type_name, property, value, &frame)?;
        }

        for assignment in &decl.properties {
            if properties.iter().any(|p| p.name == assignment.name) {
                continue;
            }
            let property = PropertyDef::new(assignment.name.as_str(), Type::Any);
            let (value, frame) = self.eval_in_frame(name, &assignment.value, &body)?;
            self.settle_property(&mut resource, &type_name, &property, value, &frame)?;
        }

        for annotation in plan.finalize {
            let call = self.prepare_call(annotation, name, &body)?;
            for (dep, kind) in &call.edges {
                resource.meta_mut().add_dependency(dep.as_str(), *kind);
            }
            self.apply_call(&call, Subject::Resource(&mut resource))?;
        }

        debug!(
            resource = name,
            schema = %type_name,
            dependencies = resource.meta().dependencies().count(),
            deferred = resource.deferred_properties().len(),
            "created resource"
        );
        let edges: Vec<(String, EdgeKind)> = resource
            .meta()
            .dependency_edges()
            .map(|(n, k)| (n.to_string(), k))
            .collect();
        let resource = shared(resource);
        schema.borrow().init_instance(name, Rc::clone(&resource))?;
        self.register_instance(name, &edges, site);
        Ok(resource)
    }

    /// Stores an evaluated property on `resource`.
    fn settle_property(
        &self,
        resource: &mut ResourceValue,
        type_name: &str,
        property: &PropertyDef,
        value: Value,
        frame: &Frame,
    ) -> Result<()> {
        let blocking = frame.blocking(&value);
        for (dep, kind) in frame.dependencies() {
            resource.meta_mut().add_dependency(dep, kind);
        }

        let value = if value.is_deferred() { Value::Null } else { value };
        if blocking.is_none() {
            let label = format!("{type_name}.{}", property.name);
            self.run_validators(&label, property, &value)?;
        }

        resource.init(property.name.as_str(), value)?;
        if let Some(deferred) = blocking {
            resource
                .meta_mut()
                .defer_property(property.name.as_str(), deferred);
        }
        if property.sensitive {
            resource.meta_mut().mark_sensitive(property.name.as_str());
        }
        Ok(())
    }

    /// Adds a finished instance to the dependency graph and to the component
    /// that owns it.
    pub(crate) fn register_instance(
        &mut self,
        name: &str,
        edges: &[(String, EdgeKind)],
        site: &Site,
    ) {
        self.record_edges(name, edges.iter().map(|(n, k)| (n.as_str(), *k)));
        if let Some(component) = &site.component {
            let owner = component.borrow().name().to_string();
            component.borrow_mut().add_member(name);
            self.tracker.add_edge(&owner, name, EdgeKind::Value);
        }
    }
}

/// Rejects initializers for `@cloud` properties and, when strict, for
/// properties the schema does not declare.
fn check_assignments(
    decl: &ResourceDecl,
    type_name: &str,
    properties: &[PropertyDef],
    strict: bool,
) -> Result<()> {
    for assignment in &decl.properties {
        match properties.iter().find(|p| p.name == assignment.name) {
            Some(property) if property.cloud => {
                return Err(Error::invalid_init(
                    format!("{type_name}.{}", property.name),
                    "cloud properties are set by the provider",
                )
                .with_value(pretty_expr(&assignment.value)));
            }
            None if strict => {
                return Err(Error::unknown_property(type_name, assignment.name.as_str()));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Builds the template recorded for a declaration whose count is deferred.
pub(crate) fn deferred_template(
    base: &str,
    count: &Annotation,
    statement: Statement,
    resource_type: &str,
    count_edges: &[(String, EdgeKind)],
    blocked_on: DeferredValue,
) -> Result<DeferredResourceTemplate> {
    let count_expression: Expr = count
        .args
        .first()
        .cloned()
        .ok_or_else(|| Error::decorator(&count.name, "missing argument"))?;

    let mut dependencies: BTreeSet<String> =
        count_edges.iter().map(|(name, _)| name.clone()).collect();
    dependencies.insert(blocked_on.dependency_name().to_string());

    warn!(
        template = base,
        blocked_on = %blocked_on,
        "count is not known until apply; no instances created"
    );
    Ok(DeferredResourceTemplate {
        template_name: base.to_string(),
        count_expression,
        statement,
        dependencies,
        resource_type: resource_type.to_string(),
        blocked_on,
    })
}
