//! Decorators that record metadata without validating anything.

use std::ops::RangeInclusive;

use stratus_foundation::Result;
use stratus_language::TargetKind;

use super::{ALL_TARGETS, Decorator, DecoratorContext, Effect, Subject, VALUE_TARGETS};

/// `@sensitive`: redact the value in output.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sensitive;

impl Decorator for Sensitive {
    fn name(&self) -> &'static str {
        "sensitive"
    }

    fn targets(&self) -> &'static [TargetKind] {
        VALUE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        match &mut ctx.subject {
            Subject::Field(record) => record.sensitive = true,
            Subject::Property(property) => property.sensitive = true,
            _ => {}
        }
        Ok(Effect::None)
    }
}

/// `@description(text)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Description;

impl Decorator for Description {
    fn name(&self) -> &'static str {
        "description"
    }

    fn targets(&self) -> &'static [TargetKind] {
        ALL_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        let text = ctx.string_arg()?.to_string();
        match &mut ctx.subject {
            Subject::Resource(r) => r.meta_mut().set_description(text),
            Subject::Component(c) => c.meta_mut().set_description(text),
            Subject::Field(record) => record.description = Some(text),
            Subject::Property(property) => property.description = Some(text),
            Subject::Schema(schema) => schema.set_description(text),
            Subject::Value { .. } | Subject::Unit => {}
        }
        Ok(Effect::None)
    }
}

/// `@cloud`: the property is populated by the provider during apply.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cloud;

impl Decorator for Cloud {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn targets(&self) -> &'static [TargetKind] {
        &[TargetKind::SchemaProperty]
    }

    fn arity(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        if let Subject::Property(property) = &mut ctx.subject {
            property.cloud = true;
        }
        Ok(Effect::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldRecord;
    use crate::schema::PropertyDef;
    use stratus_foundation::{Type, Value};
    use stratus_language::Annotation;

    #[test]
    fn sensitive_marks_fields_and_properties() {
        let annotation = Annotation::flag("sensitive");
        let mut record = FieldRecord::new("password", TargetKind::Input, Value::from("x"));
        Sensitive
            .execute(&mut DecoratorContext::new(
                &annotation,
                &[],
                Subject::Field(&mut record),
            ))
            .unwrap();
        assert!(record.sensitive);

        let mut property = PropertyDef::new("secret", Type::String);
        Sensitive
            .execute(&mut DecoratorContext::new(
                &annotation,
                &[],
                Subject::Property(&mut property),
            ))
            .unwrap();
        assert!(property.sensitive);
    }

    #[test]
    fn description_requires_string() {
        let annotation = Annotation::flag("description");
        let mut record = FieldRecord::new("region", TargetKind::Input, Value::Null);
        let args = [Value::from("Deployment region")];
        Description
            .execute(&mut DecoratorContext::new(
                &annotation,
                &args,
                Subject::Field(&mut record),
            ))
            .unwrap();
        assert_eq!(record.description.as_deref(), Some("Deployment region"));

        let args = [Value::Int(3)];
        let err = Description
            .execute(&mut DecoratorContext::new(
                &annotation,
                &args,
                Subject::Field(&mut record),
            ))
            .unwrap_err();
        assert_eq!(err.to_string(), "@description: expected a string, found number");
    }

    #[test]
    fn cloud_marks_property() {
        let annotation = Annotation::flag("cloud");
        let mut property = PropertyDef::new("id", Type::String);
        Cloud
            .execute(&mut DecoratorContext::new(
                &annotation,
                &[],
                Subject::Property(&mut property),
            ))
            .unwrap();
        assert!(property.cloud);
    }
}
