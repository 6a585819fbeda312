//! Identifier, member and index resolution.
//!
//! Reads of another declaration go through [`ResourceRef`]: a resolved
//! reference records a value edge, a pending one records a deferred edge and
//! evaluates to a [`DeferredValue`].

use std::rc::Rc;
use std::sync::Arc;

use stratus_foundation::{DeferredValue, Error, Result, Value};
use stratus_language::{Expr, Statement, pretty_expr};
use tracing::trace;

use super::{Binding, Instance, InstanceGroup, Interpreter, Site};
use crate::component::ComponentValue;
use crate::count::InstanceKey;
use crate::reference::{RefSource, ResourceRef};
use crate::resource::ResourceValue;
use crate::schema::SchemaValue;
use crate::template::DeferredResourceTemplate;
use crate::tracker::EdgeKind;
use crate::{Shared, shared};

/// What an identifier, member or index expression designates.
#[derive(Clone, Debug)]
pub(crate) enum Place {
    Value(Value),
    Resource(Shared<ResourceValue>),
    Component(Shared<ComponentValue>),
    Group(Shared<InstanceGroup>),
    Template(Rc<DeferredResourceTemplate>),
    /// One instance of a deferred template.
    TemplateInstance {
        name: String,
        source: RefSource,
    },
    /// A declaration currently being evaluated.
    InProgress {
        /// Instance name, possibly indexed.
        name: String,
        /// Name on the tracker stack.
        base: String,
        schema: Option<Shared<SchemaValue>>,
    },
}

impl Interpreter {
    /// Resolves a reference expression without reading a value out of it.
    pub(crate) fn resolve_place(&mut self, expr: &Expr, site: &Site) -> Result<Place> {
        match expr {
            Expr::Identifier(name, _) => self.resolve_identifier(name, site),
            Expr::Member(target, property, _) => {
                let place = self.resolve_place(target, site)?;
                self.member(place, property)
            }
            Expr::Index(target, index, _) => {
                let place = self.resolve_place(target, site)?;
                let key = self.eval_expr(index, site)?;
                let source = match index.as_ref() {
                    Expr::Identifier(name, _) if site.loop_vars.contains(name) => {
                        RefSource::ForLoopIndex
                    }
                    _ => RefSource::ArrayIndex,
                };
                self.index(place, &key, source)
            }
            other => self.eval_expr(other, site).map(Place::Value),
        }
    }

    fn resolve_identifier(&mut self, name: &str, site: &Site) -> Result<Place> {
        let Some(binding) = site.scope.lookup(name) else {
            return Err(Error::undefined_symbol(name));
        };
        let binding = match binding {
            Binding::Pending(pending) => {
                let qualified = pending.site.qualify(name);
                if self.tracker.is_in_progress(&qualified) {
                    trace!(name = %qualified, "reference to declaration in progress");
                    let schema = match &pending.statement {
                        Statement::Resource(decl) => self.schemas.get(&decl.schema).cloned(),
                        _ => None,
                    };
                    return Ok(Place::InProgress {
                        name: qualified.clone(),
                        base: qualified,
                        schema,
                    });
                }
                trace!(name = %qualified, "evaluating forward reference");
                self.evaluate_pending(name, &pending)?
            }
            other => other,
        };

        match binding {
            Binding::Value(value) => {
                if let Some(deferred) = value.as_deferred() {
                    self.note_deferred(deferred);
                }
                Ok(Place::Value(value))
            }
            Binding::Resource(r) => Ok(Place::Resource(r)),
            Binding::Component(c) => Ok(Place::Component(c)),
            Binding::Group(g) => Ok(Place::Group(g)),
            Binding::Template(t) => Ok(Place::Template(t)),
            Binding::Schema(_) | Binding::Struct(_) | Binding::ComponentDef(_) => Err(
                Error::type_mismatch(format!("`{name}` names a type, not a value")),
            ),
            Binding::Pending(_) => Err(Error::internal(format!(
                "`{name}` is still pending after evaluation"
            ))),
        }
    }

    /// `place.property`
    fn member(&mut self, place: Place, property: &str) -> Result<Place> {
        let reference = match place {
            Place::Resource(resource) => self.resource_property(&resource, property)?,
            Place::Component(component) => {
                let component = component.borrow();
                let name = component.name().to_string();
                let Some(value) = component.lookup(property) else {
                    return Err(Error::unknown_property(name, property));
                };
                match component.meta().deferred_properties().get(property) {
                    Some(deferred) => {
                        self.note_deferred(deferred);
                        self.touch(&name, EdgeKind::Deferred);
                        return Ok(Place::Value(Value::Deferred(deferred.clone())));
                    }
                    None => ResourceRef::resolved(name, None, value),
                }
            }
            Place::InProgress { name, base, schema } => {
                if schema.as_ref().is_some_and(|s| s.borrow().is_cloud(property)) {
                    ResourceRef::pending(name, Some(property), RefSource::PropertyAccess)
                } else {
                    return Err(Error::cycle(self.tracker.cycle_path(&base)));
                }
            }
            Place::TemplateInstance { name, source } => {
                ResourceRef::pending(name, Some(property), source)
            }
            Place::Template(template) => ResourceRef::pending(
                template.template_name.as_str(),
                Some(property),
                RefSource::PropertyAccess,
            ),
            Place::Group(group) => {
                return Err(Error::type_mismatch(format!(
                    "`{}` has several instances; index it before reading `{property}`",
                    group.borrow().base
                )));
            }
            Place::Value(value) => return object_field(&value, property).map(Place::Value),
        };
        Ok(Place::Value(self.settle_reference(reference)))
    }

    /// Reads `property` of a finished resource.
    fn resource_property(
        &self,
        shared: &Shared<ResourceValue>,
        property: &str,
    ) -> Result<ResourceRef> {
        let resource = shared.borrow();
        let name = resource.name();
        let Some(value) = resource.lookup(property) else {
            return Err(Error::unknown_property(name, property));
        };
        let cloud = self
            .schemas
            .get(resource.schema())
            .is_some_and(|s| s.borrow().is_cloud(property));
        let waiting = resource.deferred_properties().contains_key(property);

        if (cloud && value.is_null()) || waiting {
            Ok(ResourceRef::pending(name, Some(property), RefSource::PropertyAccess))
        } else {
            Ok(ResourceRef::resolved(name, Some(Rc::clone(shared)), value))
        }
    }

    /// Turns a reference into a value, recording the edge it implies.
    fn settle_reference(&mut self, reference: ResourceRef) -> Value {
        trace!(reference = %reference, "resolved reference");
        match &reference {
            ResourceRef::Pending { .. } => {
                if let Some(deferred) = reference.deferred() {
                    self.note_deferred(&deferred);
                }
            }
            ResourceRef::Resolved {
                resource_name,
                value,
                ..
            } => match value.as_deferred() {
                Some(deferred) => {
                    self.note_deferred(deferred);
                    self.touch(resource_name, EdgeKind::Deferred);
                }
                None => self.touch(resource_name, EdgeKind::Value),
            },
        }
        reference.into_value()
    }

    /// `place[key]`
    fn index(&mut self, place: Place, key: &Value, source: RefSource) -> Result<Place> {
        if let Some(deferred) = key.as_deferred() {
            return Ok(Place::Value(Value::Deferred(deferred.clone())));
        }
        match place {
            Place::Group(group) => {
                let segment = InstanceKey::from_value(key)?.to_string();
                let group = group.borrow();
                match group.instances.get(&segment) {
                    Some(Instance::Resource(r)) => Ok(Place::Resource(Rc::clone(r))),
                    Some(Instance::Component(c)) => Ok(Place::Component(Rc::clone(c))),
                    None => {
                        let nested = group.subgroup(&segment);
                        if nested.instances.is_empty() {
                            Err(Error::undefined_symbol(nested.base))
                        } else {
                            Ok(Place::Group(shared(nested)))
                        }
                    }
                }
            }
            Place::Template(template) => {
                let instance_key = InstanceKey::from_value(key)?;
                let name = instance_key.instance_name(&template.template_name);
                let reference = ResourceRef::pending(name.as_str(), None, source);
                trace!(reference = %reference, "template instance");
                Ok(Place::TemplateInstance { name, source })
            }
            Place::InProgress { name, base, schema } => {
                let instance_key = InstanceKey::from_value(key)?;
                Ok(Place::InProgress {
                    name: instance_key.instance_name(&name),
                    base,
                    schema,
                })
            }
            Place::Resource(_) | Place::Component(_) => match key.as_str() {
                Some(property) => self.member(place, property),
                None => Err(Error::type_mismatch(format!(
                    "properties are indexed by string, found {}",
                    key.value_type()
                ))),
            },
            Place::TemplateInstance { name, .. } => {
                let segment = InstanceKey::from_value(key)?.to_string();
                let deferred = DeferredValue::new(name.as_str(), "").nested(&segment);
                self.note_deferred(&deferred);
                Ok(Place::Value(Value::Deferred(deferred)))
            }
            Place::Value(value) => index_value(&value, key).map(Place::Value),
        }
    }

    /// The value a place stands for when used as an operand.
    pub(crate) fn place_value(&mut self, place: Place) -> Result<Value> {
        match place {
            Place::Value(value) => Ok(value),
            Place::Resource(resource) => {
                let resource = resource.borrow();
                self.touch(resource.name(), EdgeKind::Value);
                Ok(resource.to_value())
            }
            Place::Component(component) => {
                let component = component.borrow();
                self.touch(component.name(), EdgeKind::Value);
                Ok(component.to_value())
            }
            Place::Group(group) => {
                let instances: Vec<Instance> = group.borrow().instances.values().cloned().collect();
                let mut items = Vec::with_capacity(instances.len());
                for instance in instances {
                    let place = match instance {
                        Instance::Resource(r) => Place::Resource(r),
                        Instance::Component(c) => Place::Component(c),
                    };
                    items.push(self.place_value(place)?);
                }
                Ok(Value::from(items))
            }
            Place::Template(template) => {
                self.note_deferred(&template.blocked_on);
                Ok(Value::Deferred(template.blocked_on.clone()))
            }
            Place::TemplateInstance { name, .. } => {
                let deferred = DeferredValue::new(name.as_str(), "");
                self.note_deferred(&deferred);
                Ok(Value::Deferred(deferred))
            }
            Place::InProgress { base, .. } => Err(Error::cycle(self.tracker.cycle_path(&base))),
        }
    }

    /// Instance names a `@dependsOn` argument designates.
    pub(crate) fn dependency_names(&mut self, args: &[Expr], site: &Site) -> Result<Vec<String>> {
        let mut targets = Vec::new();
        for arg in args {
            match arg {
                Expr::Array(items, _) => targets.extend(items.iter()),
                other => targets.push(other),
            }
        }

        self.frames.push(super::Frame::default());
        let mut names = Vec::new();
        let mut result = Ok(());
        for target in targets {
            // A declaration that has not run yet is named, not evaluated; it
            // still runs in source order.
            if let Expr::Identifier(name, _) = target {
                if let Some(Binding::Pending(pending)) = site.scope.lookup(name) {
                    let qualified = pending.site.qualify(name);
                    trace!(name = %qualified, "explicit dependency on pending declaration");
                    names.push(qualified);
                    continue;
                }
            }
            match self.resolve_place(target, site) {
                Ok(place) => match place_names(&place) {
                    Some(found) => names.extend(found),
                    None => {
                        result = Err(Error::decorator(
                            "dependsOn",
                            "arguments must name resources or components",
                        )
                        .with_value(pretty_expr(target)));
                        break;
                    }
                },
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.frames.pop();
        result.map(|()| names)
    }
}

/// Instance names a place designates, if it designates declarations.
fn place_names(place: &Place) -> Option<Vec<String>> {
    match place {
        Place::Resource(r) => Some(vec![r.borrow().name().to_string()]),
        Place::Component(c) => Some(vec![c.borrow().name().to_string()]),
        Place::Group(g) => Some(g.borrow().instances.values().map(Instance::name).collect()),
        Place::Template(t) => Some(vec![t.template_name.clone()]),
        Place::TemplateInstance { name, .. } | Place::InProgress { name, .. } => {
            Some(vec![name.clone()])
        }
        Place::Value(_) => None,
    }
}

fn object_field(value: &Value, field: &str) -> Result<Value> {
    match value {
        Value::Object(map) => map
            .get(&Arc::from(field))
            .cloned()
            .ok_or_else(|| Error::unknown_property("object", field).with_value(value)),
        Value::Deferred(deferred) => Ok(Value::Deferred(deferred.nested(field))),
        other => Err(Error::type_mismatch(format!(
            "cannot read `{field}` of {}",
            other.value_type()
        ))
        .with_value(other)),
    }
}

fn index_value(value: &Value, key: &Value) -> Result<Value> {
    match (value, key) {
        (Value::Array(items), Value::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or_else(|| {
                Error::type_mismatch(format!("index {i} out of bounds for {} items", items.len()))
            }),
        (Value::Object(_), Value::String(field)) => object_field(value, field),
        (Value::Deferred(deferred), key) => Ok(Value::Deferred(
            deferred.nested(&InstanceKey::from_value(key)?.to_string()),
        )),
        (target, key) => Err(Error::type_mismatch(format!(
            "cannot index {} with {}",
            target.value_type(),
            key.value_type()
        ))
        .with_value(target)),
    }
}
