//! Component definitions and instances.
//!
//! An instance binds its inputs in a scope nested inside the definition's
//! declaring scope, then runs the definition body there. Declarations in the
//! body are qualified with the instance name (`api.db`) and registered as
//! members of the instance.

use std::rc::Rc;

use stratus_foundation::{Error, Result};
use stratus_language::{Annotation, ComponentDef, ComponentInstance, Statement, TargetKind};
use tracing::debug;

use super::decorators::Annotations;
use super::resources::{InstancePlan, deferred_template};
use super::{Binding, ComponentDefinition, Frame, Instance, InstanceGroup, Interpreter, Site};
use crate::component::ComponentValue;
use crate::count::CountDirective;
use crate::decorator::Subject;
use crate::record::FieldRecord;
use crate::tracker::EdgeKind;
use crate::{Shared, shared};

impl Interpreter {
    /// Binds a component definition in the current scope.
    pub(crate) fn declare_component_def(&mut self, decl: &ComponentDef, site: &Site) -> Result<()> {
        let annotations = self.split_annotations(&decl.annotations, TargetKind::Component)?;
        if let Some(count) = annotations.count {
            return Err(Error::illegal_target(&count.name, "component definition"));
        }
        let definition = ComponentDefinition {
            decl: decl.clone(),
            scope: site.scope.clone(),
        };
        site.scope
            .init(decl.name.as_str(), Binding::ComponentDef(Rc::new(definition)))?;
        debug!(component = %decl.name, statements = decl.body.len(), "declared component");
        Ok(())
    }

    /// Evaluates a component instance statement.
    pub(crate) fn evaluate_component(
        &mut self,
        inst: &ComponentInstance,
        site: &Site,
    ) -> Result<Binding> {
        let base = site.qualify(&inst.name);
        self.tracker.begin(&base)?;
        let result = self.expand_component(inst, site, &base);
        if result.is_ok() {
            self.tracker.finish(&base);
        } else {
            self.tracker.abandon(&base);
        }
        result.map_err(|e| e.with_frame(base))
    }

    fn expand_component(
        &mut self,
        inst: &ComponentInstance,
        site: &Site,
        base: &str,
    ) -> Result<Binding> {
        let definition = match site.scope.lookup(&inst.component) {
            Some(Binding::ComponentDef(definition)) => definition,
            Some(_) => {
                return Err(Error::type_mismatch(format!(
                    "`{}` is not a component",
                    inst.component
                )));
            }
            None => return Err(Error::undefined_symbol(&inst.component)),
        };

        let Annotations { count, finalize } =
            self.split_annotations(&inst.annotations, TargetKind::Component)?;
        // Decorators on the definition apply to every instance, before the
        // instance's own.
        let mut decorators: Vec<&Annotation> = definition.decl.annotations.iter().collect();
        decorators.extend(finalize);

        let Some(count) = count else {
            let plan = InstancePlan {
                name: base.to_string(),
                index: None,
                finalize: &decorators,
                count_edges: &[],
            };
            let component = self.instantiate_component(inst, &definition, site, &plan)?;
            return Ok(Binding::Component(component));
        };

        let (directive, count_edges) = self.expand_count(count, base, site)?;
        match directive {
            CountDirective::Deferred(blocked_on) => {
                let template = deferred_template(
                    base,
                    count,
                    Statement::Component(inst.clone()),
                    &inst.component,
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
                        finalize: &decorators,
                        count_edges: &count_edges,
                    };
                    let component = self.instantiate_component(inst, &definition, site, &plan)?;
                    group
                        .instances
                        .insert(key.to_string(), Instance::Component(component));
                }
                self.tracker
                    .add_group(base, group.instances.values().map(Instance::name));
                Ok(Binding::Group(shared(group)))
            }
        }
    }

    fn instantiate_component(
        &mut self,
        inst: &ComponentInstance,
        definition: &ComponentDefinition,
        site: &Site,
        plan: &InstancePlan<'_>,
    ) -> Result<Shared<ComponentValue>> {
        let def = &definition.decl;
        let name = plan.name.as_str();
        if let Some(unknown) = inst
            .inputs
            .iter()
            .find(|a| !def.inputs().any(|i| i.name == a.name))
        {
            return Err(Error::unknown_property(&def.name, &unknown.name));
        }

        let caller_scope = site.scope.child();
        if let Some(index) = plan.index {
            caller_scope.init("count", Binding::Value(index.into()))?;
        }
        let caller = site.with_scope(caller_scope);

        let component = shared(ComponentValue::new(name, def.name.as_str()));
        for (dep, kind) in plan.count_edges {
            component.borrow_mut().meta_mut().add_dependency(dep.as_str(), *kind);
        }
        let body = Site {
            prefix: format!("{name}."),
            suffix: String::new(),
            group_scope: None,
            component: Some(Rc::clone(&component)),
            loop_vars: Vec::new(),
            ..Site::in_scope(definition.scope.child())
        };

        for input in def.inputs() {
            let assigned = inst.inputs.iter().find(|a| a.name == input.name);
            let (value, frame) = match (assigned, &input.default) {
                (Some(assignment), _) => self.eval_in_frame(name, &assignment.value, &caller)?,
                (None, Some(default)) => self.eval_in_frame(name, default, &body)?,
                (None, None) => {
                    return Err(Error::missing_input(format!("{name}.{}", input.name)));
                }
            };
            let mut record = FieldRecord::new(input.name.as_str(), TargetKind::Input, value);
            record.ty = Some(input.ty.clone());
            self.finish_record(&mut record, &frame, &input.annotations, &body)?;
            body.scope
                .init(input.name.as_str(), Binding::Value(record.bound_value()))?;
            settle_component_field(&component, &record, &frame, false)?;
        }

        self.execute_block(&def.body, &body)?;

        for annotation in plan.finalize {
            let call = self.prepare_call(annotation, name, &caller)?;
            let mut instance = component.borrow_mut();
            for (dep, kind) in &call.edges {
                instance.meta_mut().add_dependency(dep.as_str(), *kind);
            }
            self.apply_call(&call, Subject::Component(&mut *instance))?;
        }

        if self.components.contains_key(name) {
            return Err(Error::declaration_exists(name));
        }
        self.components
            .insert(name.to_string(), Rc::clone(&component));

        let edges: Vec<(String, EdgeKind)> = component
            .borrow()
            .meta()
            .dependency_edges()
            .map(|(n, k)| (n.to_string(), k))
            .collect();
        self.register_instance(name, &edges, site);
        debug!(
            component = name,
            component_type = %def.name,
            members = component.borrow().members().len(),
            "created component"
        );
        Ok(component)
    }
}

/// Stores an evaluated input or output on a component instance.
pub(crate) fn settle_component_field(
    component: &Shared<ComponentValue>,
    record: &FieldRecord,
    frame: &Frame,
    output: bool,
) -> Result<()> {
    let mut component = component.borrow_mut();
    for (dep, kind) in frame.dependencies() {
        component.meta_mut().add_dependency(dep, kind);
    }
    if output {
        component.set_output(record.name.as_str(), record.value.clone())?;
    } else {
        component.set_input(record.name.as_str(), record.value.clone())?;
    }

    let meta = component.meta_mut();
    if let Some(deferred) = &record.deferred {
        meta.defer_property(record.name.as_str(), deferred.clone());
    }
    if record.sensitive {
        meta.mark_sensitive(record.name.as_str());
    }
    Ok(())
}
