//! Value validation decorators.
//!
//! Attached to inputs, outputs and vars they check the evaluated value once.
//! Attached to a schema property they are stored on the property and checked
//! against every value a resource assigns to it. Deferred values are skipped:
//! they are checked when apply supplies them.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use stratus_foundation::{Result, Value};
use stratus_language::TargetKind;

use super::{Decorator, DecoratorContext, Effect, Subject, VALUE_TARGETS};
use crate::schema::PropertyValidator;

/// Stores the validator on a schema property, or runs `check` against the
/// subject's value.
fn validate(
    ctx: &mut DecoratorContext<'_>,
    check: impl FnOnce(&DecoratorContext<'_>, &str, &Value) -> Result<()>,
) -> Result<Effect> {
    if let Subject::Property(property) = &mut ctx.subject {
        property.validators.push(PropertyValidator {
            annotation: ctx.annotation.clone(),
            args: ctx.args.to_vec(),
        });
        return Ok(Effect::None);
    }
    let ctx = &*ctx;
    if let Some((name, value)) = ctx.subject.validated_value() {
        if value.find_deferred().is_none() {
            check(ctx, name, value)?;
        }
    }
    Ok(Effect::None)
}

fn length_of(ctx: &DecoratorContext<'_>, name: &str, value: &Value) -> Result<usize> {
    match value {
        Value::String(_) | Value::Array(_) => value.length().ok_or_else(|| ctx.error("no length")),
        other => Err(ctx
            .error(format!(
                "`{name}` must be a string or array, found {}",
                other.value_type()
            ))
            .with_value(other)),
    }
}

fn number_of(ctx: &DecoratorContext<'_>, name: &str, value: &Value) -> Result<f64> {
    value.as_number().ok_or_else(|| {
        ctx.error(format!("`{name}` must be a number, found {}", value.value_type()))
            .with_value(value)
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bound(ctx: &DecoratorContext<'_>) -> Result<usize> {
    let n = ctx.number_arg()?;
    if n < 0.0 {
        return Err(ctx.error("bound must not be negative"));
    }
    Ok(n as usize)
}

/// `@allowed([v, ...])`: the value, or each element of an array value, must
/// be one of the listed values.
#[derive(Clone, Copy, Debug, Default)]
pub struct Allowed;

impl Decorator for Allowed {
    fn name(&self) -> &'static str {
        "allowed"
    }

    fn targets(&self) -> &'static [TargetKind] {
        VALUE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        validate(ctx, |ctx, name, value| {
            let set = ctx.arg()?;
            let Some(options) = set.as_array() else {
                return Err(ctx
                    .error("expected an array of allowed values")
                    .with_value(set));
            };
            let candidates: Vec<&Value> = match value {
                Value::Array(items) => items.iter().collect(),
                Value::Null => Vec::new(),
                other => vec![other],
            };
            for candidate in candidates {
                if !options.iter().any(|o| o == candidate) {
                    return Err(ctx
                        .error(format!("`{name}` value `{candidate}` is not one of {set}"))
                        .with_value(candidate));
                }
            }
            Ok(())
        })
    }
}

/// `@nonEmpty`: strings, arrays and objects must have content; null is
/// rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonEmpty;

impl Decorator for NonEmpty {
    fn name(&self) -> &'static str {
        "nonEmpty"
    }

    fn targets(&self) -> &'static [TargetKind] {
        VALUE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        validate(ctx, |ctx, name, value| {
            let empty = match value {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                other => other.length() == Some(0),
            };
            if empty {
                return Err(ctx.error(format!("`{name}` must not be empty")).with_value(value));
            }
            Ok(())
        })
    }
}

/// `@minLength(n)` on strings and arrays.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinLength;

impl Decorator for MinLength {
    fn name(&self) -> &'static str {
        "minLength"
    }

    fn targets(&self) -> &'static [TargetKind] {
        VALUE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        validate(ctx, |ctx, name, value| {
            if value.is_null() {
                return Ok(());
            }
            let min = bound(ctx)?;
            let len = length_of(ctx, name, value)?;
            if len < min {
                return Err(ctx
                    .error(format!("`{name}` has length {len}, minimum is {min}"))
                    .with_value(value));
            }
            Ok(())
        })
    }
}

/// `@maxLength(n)` on strings and arrays.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxLength;

impl Decorator for MaxLength {
    fn name(&self) -> &'static str {
        "maxLength"
    }

    fn targets(&self) -> &'static [TargetKind] {
        VALUE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        validate(ctx, |ctx, name, value| {
            if value.is_null() {
                return Ok(());
            }
            let max = bound(ctx)?;
            let len = length_of(ctx, name, value)?;
            if len > max {
                return Err(ctx
                    .error(format!("`{name}` has length {len}, maximum is {max}"))
                    .with_value(value));
            }
            Ok(())
        })
    }
}

/// `@minValue(n)` on numbers.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinValue;

impl Decorator for MinValue {
    fn name(&self) -> &'static str {
        "minValue"
    }

    fn targets(&self) -> &'static [TargetKind] {
        VALUE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        validate(ctx, |ctx, name, value| {
            if value.is_null() {
                return Ok(());
            }
            let min = ctx.number_arg()?;
            if number_of(ctx, name, value)? < min {
                return Err(ctx
                    .error(format!("`{name}` is {value}, minimum is {}", ctx.arg()?))
                    .with_value(value));
            }
            Ok(())
        })
    }
}

/// `@maxValue(n)` on numbers.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxValue;

impl Decorator for MaxValue {
    fn name(&self) -> &'static str {
        "maxValue"
    }

    fn targets(&self) -> &'static [TargetKind] {
        VALUE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        validate(ctx, |ctx, name, value| {
            if value.is_null() {
                return Ok(());
            }
            let max = ctx.number_arg()?;
            if number_of(ctx, name, value)? > max {
                return Err(ctx
                    .error(format!("`{name}` is {value}, maximum is {}", ctx.arg()?))
                    .with_value(value));
            }
            Ok(())
        })
    }
}

/// `@unique`: array elements must be distinct.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unique;

impl Decorator for Unique {
    fn name(&self) -> &'static str {
        "unique"
    }

    fn targets(&self) -> &'static [TargetKind] {
        VALUE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        validate(ctx, |ctx, name, value| {
            let Value::Array(items) = value else {
                return Ok(());
            };
            let mut seen = HashSet::new();
            for item in items.iter() {
                if !seen.insert(item) {
                    return Err(ctx
                        .error(format!("`{name}` contains `{item}` more than once"))
                        .with_value(value));
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldRecord;
    use crate::schema::PropertyDef;
    use stratus_foundation::{DeferredValue, ErrorKind, Type};
    use stratus_language::Annotation;

    fn check(decorator: &dyn Decorator, args: &[Value], value: Value) -> Result<Effect> {
        let annotation = Annotation::new(decorator.name(), vec![]);
        let mut record = FieldRecord::new("field", TargetKind::Input, value);
        let mut ctx = DecoratorContext::new(&annotation, args, Subject::Field(&mut record));
        decorator.execute(&mut ctx)
    }

    #[test]
    fn allowed_names_value_and_set() {
        let set = [Value::from(vec!["a", "b"])];
        assert!(check(&Allowed, &set, Value::from("a")).is_ok());

        let err = check(&Allowed, &set, Value::from("c")).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"@allowed: `field` value `c` is not one of ["a", "b"]"#
        );
        assert!(matches!(err.kind, ErrorKind::DecoratorValidation { .. }));
    }

    #[test]
    fn allowed_checks_each_array_element() {
        let set = [Value::from(vec!["a", "b"])];
        assert!(check(&Allowed, &set, Value::from(vec!["a", "b", "a"])).is_ok());
        assert!(check(&Allowed, &set, Value::from(vec!["a", "z"])).is_err());
    }

    #[test]
    fn non_empty() {
        assert!(check(&NonEmpty, &[], Value::from("x")).is_ok());
        assert!(check(&NonEmpty, &[], Value::from("")).is_err());
        assert!(check(&NonEmpty, &[], Value::Null).is_err());
        assert!(check(&NonEmpty, &[], Value::from(Vec::<i64>::new())).is_err());
        assert!(check(&NonEmpty, &[], Value::object([("k", Value::Int(1))])).is_ok());
    }

    #[test]
    fn length_bounds() {
        let two = [Value::Int(2)];
        assert!(check(&MinLength, &two, Value::from("ab")).is_ok());
        assert!(check(&MinLength, &two, Value::from("a")).is_err());
        assert!(check(&MaxLength, &two, Value::from(vec![1, 2, 3])).is_err());
        assert!(check(&MaxLength, &two, Value::from(vec![1])).is_ok());

        let err = check(&MinLength, &two, Value::Int(5)).unwrap_err();
        assert!(err.to_string().contains("must be a string or array"));
    }

    #[test]
    fn value_bounds() {
        let ten = [Value::Int(10)];
        assert!(check(&MinValue, &ten, Value::Int(10)).is_ok());
        assert!(check(&MinValue, &ten, Value::Float(9.5)).is_err());
        assert!(check(&MaxValue, &ten, Value::Int(11)).is_err());
        let err = check(&MaxValue, &ten, Value::from("x")).unwrap_err();
        assert_eq!(err.to_string(), "@maxValue: `field` must be a number, found string");
    }

    #[test]
    fn unique_elements() {
        assert!(check(&Unique, &[], Value::from(vec![1, 2, 3])).is_ok());
        let err = check(&Unique, &[], Value::from(vec![1, 2, 1])).unwrap_err();
        assert_eq!(err.to_string(), "@unique: `field` contains `1` more than once");
    }

    #[test]
    fn deferred_values_are_skipped() {
        let deferred = Value::Deferred(DeferredValue::new("vpc", "id"));
        assert!(check(&NonEmpty, &[], deferred.clone()).is_ok());
        assert!(check(&Allowed, &[Value::from(vec!["a"])], deferred).is_ok());
    }

    #[test]
    fn property_subject_stores_validator() {
        let annotation = Annotation::new("minValue", vec![]);
        let args = [Value::Int(1)];
        let mut property = PropertyDef::new("size", Type::Number);
        MinValue
            .execute(&mut DecoratorContext::new(
                &annotation,
                &args,
                Subject::Property(&mut property),
            ))
            .unwrap();
        assert_eq!(property.validators.len(), 1);
        assert_eq!(property.validators[0].args, vec![Value::Int(1)]);
    }

    #[test]
    fn schema_value_subject_is_checked() {
        let annotation = Annotation::new("maxLength", vec![]);
        let args = [Value::Int(3)];
        let value = Value::from("toolong");
        let err = MaxLength
            .execute(&mut DecoratorContext::new(
                &annotation,
                &args,
                Subject::Value {
                    name: "Vm.name",
                    value: &value,
                },
            ))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "@maxLength: `Vm.name` has length 7, maximum is 3"
        );
    }
}
