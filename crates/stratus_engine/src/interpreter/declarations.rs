//! Schemas, structs, inputs, outputs, vars and reassignment.

use std::rc::Rc;

use stratus_foundation::{Error, Result, Value};
use stratus_language::{
    Annotation, Assignment, InputDecl, OutputDecl, SchemaDecl, StructDecl, TargetKind, VarDecl,
};
use tracing::debug;

use super::components::settle_component_field;
use super::{Binding, Frame, Interpreter, Site};
use crate::decorator::Subject;
use crate::record::FieldRecord;
use crate::schema::{PropertyDef, SchemaValue};
use crate::shared;

impl Interpreter {
    // =========================================================================
    // Types
    // =========================================================================

    pub(crate) fn declare_schema(&mut self, decl: &SchemaDecl, site: &Site) -> Result<()> {
        if let Some(existing) = self.schemas.get(&decl.name) {
            // Schemas declared in component or loop bodies are shared by
            // every instance of the body.
            if site.is_root() {
                return Err(Error::declaration_exists(decl.name.as_str()));
            }
            let existing = Rc::clone(existing);
            return site.scope.init(decl.name.as_str(), Binding::Schema(existing));
        }

        let mut schema = SchemaValue::new(decl.name.as_str());
        for property in &decl.properties {
            let mut def = PropertyDef::new(property.name.as_str(), property.ty.clone());
            def.default.clone_from(&property.default);
            self.apply_property_decorators(&property.annotations, &mut def, site)?;
            schema.add_property(def)?;
        }

        let registry = Rc::clone(&self.registry);
        for annotation in &decl.annotations {
            registry.check(annotation, TargetKind::Schema)?;
            let call = self.prepare_call(annotation, &decl.name, site)?;
            self.apply_call(&call, Subject::Schema(&mut schema))?;
        }

        let schema = shared(schema);
        site.scope
            .init(decl.name.as_str(), Binding::Schema(Rc::clone(&schema)))?;
        self.schemas.insert(decl.name.clone(), schema);
        debug!(schema = %decl.name, properties = decl.properties.len(), "declared schema");
        Ok(())
    }

    pub(crate) fn declare_struct(&mut self, decl: &StructDecl, site: &Site) -> Result<()> {
        site.scope
            .init(decl.name.as_str(), Binding::Struct(Rc::new(decl.clone())))
    }

    // =========================================================================
    // Inputs, outputs, vars
    // =========================================================================

    /// Resolves a program input. Component inputs are bound at
    /// instantiation instead.
    pub(crate) fn declare_input(&mut self, decl: &InputDecl, site: &Site) -> Result<()> {
        if site.component.is_some() {
            return Ok(());
        }

        let (value, frame) = match self.inputs.resolve(&decl.name, &decl.ty)? {
            Some(value) => (value, Frame::default()),
            None => match &decl.default {
                Some(default) => self.eval_in_frame(&decl.name, default, site)?,
                None => return Err(Error::missing_input(decl.name.as_str())),
            },
        };

        let mut record = FieldRecord::new(decl.name.as_str(), TargetKind::Input, value);
        record.ty = Some(decl.ty.clone());
        self.finish_record(&mut record, &frame, &decl.annotations, site)?;
        site.scope
            .init(decl.name.as_str(), Binding::Value(record.bound_value()))?;

        debug!(input = %decl.name, deferred = record.is_deferred(), "declared input");
        if site.is_root() {
            self.input_records.insert(decl.name.clone(), record);
        }
        Ok(())
    }

    pub(crate) fn declare_var(&mut self, decl: &VarDecl, site: &Site) -> Result<()> {
        let (value, frame) = self.eval_in_frame(&decl.name, &decl.value, site)?;
        let mut record = FieldRecord::new(decl.name.as_str(), TargetKind::Var, value);
        record.ty.clone_from(&decl.ty);
        self.finish_record(&mut record, &frame, &decl.annotations, site)?;
        site.scope
            .init(decl.name.as_str(), Binding::Value(record.bound_value()))?;

        debug!(var = %decl.name, deferred = record.is_deferred(), "declared var");
        if site.is_root() {
            self.var_records.insert(decl.name.clone(), record);
        }
        Ok(())
    }

    /// Records an output; inside a component it becomes a property of the
    /// instance.
    pub(crate) fn declare_output(&mut self, decl: &OutputDecl, site: &Site) -> Result<()> {
        let Some(expr) = &decl.value else {
            return Err(Error::invalid_init(
                decl.name.as_str(),
                "outputs must be initialized",
            ));
        };
        let (value, frame) = self.eval_in_frame(&decl.name, expr, site)?;
        let mut record = FieldRecord::new(decl.name.as_str(), TargetKind::Output, value);
        record.ty = Some(decl.ty.clone());
        self.finish_record(&mut record, &frame, &decl.annotations, site)?;

        debug!(output = %decl.name, deferred = record.is_deferred(), "declared output");
        if let Some(component) = &site.component {
            return settle_component_field(component, &record, &frame, true);
        }

        let name = site.qualify(&decl.name);
        if self.output_records.contains_key(&name) {
            return Err(Error::declaration_exists(name));
        }
        self.output_records.insert(name, record);
        Ok(())
    }

    /// `name = expr` on an existing var.
    pub(crate) fn assign(&mut self, assignment: &Assignment, site: &Site) -> Result<()> {
        let name = assignment.name.as_str();
        match site.scope.lookup(name) {
            Some(Binding::Value(_)) => {}
            Some(_) => {
                return Err(Error::type_mismatch(format!("`{name}` is not a variable")));
            }
            None => return Err(Error::undefined_symbol(name)),
        }

        let (value, frame) = self.eval_in_frame(name, &assignment.value, site)?;
        let blocking = frame.blocking(&value);

        let at_root = site.scope.resolve_depth(name, usize::MAX) == Some(site.scope.depth());
        if at_root {
            if let Some(record) = self.var_records.get_mut(name) {
                record
                    .dependencies
                    .extend(frame.dependencies().map(|(n, _)| n.to_string()));
                record.value = if value.is_deferred() {
                    Value::Null
                } else {
                    value.clone()
                };
                record.deferred.clone_from(&blocking);
            }
        }

        let bound = blocking.map_or(value, Value::Deferred);
        site.scope.assign(name, Binding::Value(bound))
    }

    /// Fills in dependencies and deferral of a record and runs its
    /// decorators. Validators see the placeholder while the value is
    /// deferred, and skip it.
    pub(crate) fn finish_record(
        &mut self,
        record: &mut FieldRecord,
        frame: &Frame,
        annotations: &[Annotation],
        site: &Site,
    ) -> Result<()> {
        record
            .dependencies
            .extend(frame.dependencies().map(|(n, _)| n.to_string()));
        let blocking = frame.blocking(&record.value);

        let value = std::mem::replace(&mut record.value, Value::Null);
        record.value = match &blocking {
            Some(deferred) => Value::Deferred(deferred.clone()),
            None => value.clone(),
        };
        self.apply_field_decorators(annotations, record, site)?;

        record.value = if value.is_deferred() { Value::Null } else { value };
        record.deferred = blocking;
        Ok(())
    }
}
