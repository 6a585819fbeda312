//! Annotation checking and dispatch.

use std::rc::Rc;

use stratus_foundation::{Error, Result, Value};
use stratus_language::{Annotation, TargetKind};

use super::{Interpreter, Site};
use crate::count::CountDirective;
use crate::decorator::{ArgumentMode, DecoratorContext, Effect, Phase, Subject};
use crate::record::FieldRecord;
use crate::schema::PropertyDef;
use crate::tracker::EdgeKind;

/// An annotation with its arguments prepared for execution.
#[derive(Debug)]
pub(crate) struct DecoratorCall<'a> {
    pub(crate) annotation: &'a Annotation,
    pub(crate) args: Vec<Value>,
    pub(crate) names: Vec<String>,
    /// Names the evaluated arguments read.
    pub(crate) edges: Vec<(String, EdgeKind)>,
}

/// The annotations of an instance declaration, split by phase.
#[derive(Debug, Default)]
pub(crate) struct Annotations<'a> {
    pub(crate) count: Option<&'a Annotation>,
    pub(crate) finalize: Vec<&'a Annotation>,
}

impl Interpreter {
    /// Checks every annotation against `target` and splits off `@count`.
    pub(crate) fn split_annotations<'a>(
        &self,
        annotations: &'a [Annotation],
        target: TargetKind,
    ) -> Result<Annotations<'a>> {
        let mut split = Annotations::default();
        for annotation in annotations {
            match self.registry.check(annotation, target)?.phase() {
                Phase::Expand if split.count.is_some() => {
                    return Err(Error::decorator(
                        annotation.name.as_str(),
                        "may appear only once",
                    ));
                }
                Phase::Expand => split.count = Some(annotation),
                Phase::Finalize => split.finalize.push(annotation),
            }
        }
        Ok(split)
    }

    /// Evaluates the arguments of `annotation` the way its decorator wants
    /// them.
    pub(crate) fn prepare_call<'a>(
        &mut self,
        annotation: &'a Annotation,
        owner: &str,
        site: &Site,
    ) -> Result<DecoratorCall<'a>> {
        let mode = self.registry.get(&annotation.name)?.arguments();
        let mut call = DecoratorCall {
            annotation,
            args: Vec::new(),
            names: Vec::new(),
            edges: Vec::new(),
        };
        match mode {
            ArgumentMode::Names => {
                call.names = self.dependency_names(&annotation.args, site)?;
            }
            ArgumentMode::Evaluated => {
                for arg in &annotation.args {
                    let (value, frame) = self.eval_in_frame(owner, arg, site)?;
                    call.edges.extend(frame.dependencies().map(|(n, k)| (n.to_string(), k)));
                    call.args.push(value);
                }
            }
        }
        Ok(call)
    }

    /// Runs a prepared call against `subject`.
    pub(crate) fn apply_call(&self, call: &DecoratorCall<'_>, subject: Subject<'_>) -> Result<Effect> {
        let decorator = self.registry.get(&call.annotation.name)?;
        let mut ctx =
            DecoratorContext::new(call.annotation, &call.args, subject).with_names(&call.names);
        decorator.execute(&mut ctx)
    }

    /// Evaluates a `@count` argument.
    pub(crate) fn expand_count(
        &mut self,
        annotation: &Annotation,
        owner: &str,
        site: &Site,
    ) -> Result<(CountDirective, Vec<(String, EdgeKind)>)> {
        let call = self.prepare_call(annotation, owner, site)?;
        match self.apply_call(&call, Subject::Unit)? {
            Effect::Expand(directive) => Ok((directive, call.edges)),
            Effect::None => Err(Error::internal(format!(
                "@{} did not produce a count",
                annotation.name
            ))),
        }
    }

    /// Runs the decorators of an input, output or var on its record.
    pub(crate) fn apply_field_decorators(
        &mut self,
        annotations: &[Annotation],
        record: &mut FieldRecord,
        site: &Site,
    ) -> Result<()> {
        let registry = Rc::clone(&self.registry);
        for annotation in annotations {
            registry.check(annotation, record.kind)?;
            let call = self.prepare_call(annotation, &record.name, site)?;
            self.apply_call(&call, Subject::Field(&mut *record))?;
        }
        Ok(())
    }

    /// Runs the decorators of a schema property on its definition.
    pub(crate) fn apply_property_decorators(
        &mut self,
        annotations: &[Annotation],
        property: &mut PropertyDef,
        site: &Site,
    ) -> Result<()> {
        let registry = Rc::clone(&self.registry);
        for annotation in annotations {
            registry.check(annotation, TargetKind::SchemaProperty)?;
            let call = self.prepare_call(annotation, &property.name, site)?;
            self.apply_call(&call, Subject::Property(&mut *property))?;
        }
        Ok(())
    }

    /// Runs the validators stored on `property` against an assigned value.
    pub(crate) fn run_validators(
        &self,
        label: &str,
        property: &PropertyDef,
        value: &Value,
    ) -> Result<()> {
        for validator in &property.validators {
            let decorator = self.registry.get(&validator.annotation.name)?;
            let subject = Subject::Value { name: label, value };
            let mut ctx = DecoratorContext::new(&validator.annotation, &validator.args, subject);
            decorator.execute(&mut ctx)?;
        }
        Ok(())
    }
}
