//! Decorators shaping resources and components: instantiation, explicit
//! edges, providers, tags, and already-provisioned markers.

use std::ops::RangeInclusive;

use stratus_foundation::{Result, Value};
use stratus_language::TargetKind;

use super::{
    ArgumentMode, Decorator, DecoratorContext, Effect, INSTANCE_TARGETS, Phase, Subject,
    string_list,
};
use crate::count::CountDirective;
use crate::tracker::EdgeKind;

/// `@count(n)`: instantiate the target `n` times.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl Decorator for Count {
    fn name(&self) -> &'static str {
        "count"
    }

    fn targets(&self) -> &'static [TargetKind] {
        INSTANCE_TARGETS
    }

    fn phase(&self) -> Phase {
        Phase::Expand
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        CountDirective::from_value(ctx.arg()?).map(Effect::Expand)
    }
}

/// `@dependsOn(r)` / `@dependsOn([r, ...])`: explicit ordering edges.
#[derive(Clone, Copy, Debug, Default)]
pub struct DependsOn;

impl Decorator for DependsOn {
    fn name(&self) -> &'static str {
        "dependsOn"
    }

    fn targets(&self) -> &'static [TargetKind] {
        INSTANCE_TARGETS
    }

    fn arguments(&self) -> ArgumentMode {
        ArgumentMode::Names
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=usize::MAX
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        let names = ctx.names;
        if let Some(meta) = ctx.subject.meta_mut() {
            for name in names {
                meta.add_dependency(name.as_str(), EdgeKind::Explicit);
            }
        }
        Ok(Effect::None)
    }
}

/// `@existing(id)`: the resource models an already-provisioned object.
#[derive(Clone, Copy, Debug, Default)]
pub struct Existing;

impl Decorator for Existing {
    fn name(&self) -> &'static str {
        "existing"
    }

    fn targets(&self) -> &'static [TargetKind] {
        &[TargetKind::Resource]
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        let id = ctx.string_arg()?;
        if id.trim().is_empty() {
            return Err(ctx.error("identifier must not be blank"));
        }
        let id = id.to_string();
        if let Subject::Resource(resource) = &mut ctx.subject {
            resource.set_existing(id);
        }
        Ok(Effect::None)
    }
}

/// `@provider(p)` / `@provider([p, ...])`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Provider;

impl Decorator for Provider {
    fn name(&self) -> &'static str {
        "provider"
    }

    fn targets(&self) -> &'static [TargetKind] {
        INSTANCE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        let providers = string_list(ctx, ctx.arg()?)?;
        if providers.is_empty() {
            return Err(ctx.error("at least one provider is required"));
        }
        if let Some(meta) = ctx.subject.meta_mut() {
            for provider in providers {
                meta.add_provider(provider);
            }
        }
        Ok(Effect::None)
    }
}

/// `@tags({k: v})`, `@tags([label, ...])` or `@tags(label)`.
///
/// A keyed tag may take a value that is only known after apply; it is kept as
/// the deferred placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tags;

impl Decorator for Tags {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn targets(&self) -> &'static [TargetKind] {
        INSTANCE_TARGETS
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        let arg = ctx.arg()?;
        let mut entries = Vec::new();
        let mut labels = Vec::new();
        match arg {
            Value::Object(map) => {
                for (key, value) in map.iter() {
                    if key.trim().is_empty() {
                        return Err(ctx.error("tag keys must not be blank"));
                    }
                    if matches!(value, Value::Array(_) | Value::Object(_)) {
                        return Err(ctx
                            .error(format!("tag `{key}` must have a scalar value"))
                            .with_value(value));
                    }
                    entries.push((key.to_string(), value.clone()));
                }
            }
            other => labels = string_list(ctx, other)?,
        }

        if let Some(meta) = ctx.subject.meta_mut() {
            let tags = meta.tags_mut();
            for (key, value) in entries {
                tags.insert(key, value);
            }
            for label in labels {
                tags.label(label);
            }
        }
        Ok(Effect::None)
    }
}
