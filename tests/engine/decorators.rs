//! Decorators applied through whole-program evaluation.

use std::ops::RangeInclusive;

use stratus_engine::{
    Decorator, DecoratorContext, DecoratorRegistry, Effect, Interpreter, StaticInputs, Subject,
    evaluate_with_inputs,
};
use stratus_foundation::{ErrorKind, Result, Type, Value};
use stratus_language::build::{
    annotation, array, input, int, object, prop, resource, schema, string, var,
};
use stratus_language::{Annotation, Program, Statement, TargetKind};

use crate::{fail, run};

fn vm_schema() -> Statement {
    schema(
        "Vm",
        [
            prop(Type::String, "name"),
            prop(Type::Number, "size").with_annotation(annotation("minValue", [int(1)])),
        ],
    )
    .into()
}

// =============================================================================
// Value validation
// =============================================================================

fn env_program() -> Program {
    [Statement::from(
        input(Type::String, "env")
            .with_annotation(annotation(
                "allowed",
                [array([string("dev"), string("prod")])],
            ))
            .with_default(string("dev")),
    )]
    .into_iter()
    .collect()
}

#[test]
fn allowed_accepts_members() {
    let evaluation =
        evaluate_with_inputs(&env_program(), StaticInputs::new().with("env", "prod")).unwrap();
    assert_eq!(evaluation.input("env").unwrap().value, Value::from("prod"));
}

#[test]
fn allowed_names_the_value_and_the_set() {
    let err = evaluate_with_inputs(&env_program(), StaticInputs::new().with("env", "qa"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DecoratorValidation { .. }));
    assert_eq!(
        err.to_string(),
        r#"@allowed: `env` value `qa` is not one of ["dev", "prod"]"#
    );
}

#[test]
fn schema_property_validators_check_assigned_values() {
    let err = fail([
        vm_schema(),
        resource("Vm", "web")
            .with_property("name", string("web"))
            .with_property("size", int(0))
            .into(),
    ]);
    assert_eq!(err.to_string(), "@minValue: `Vm.size` is 0, minimum is 1");
}

#[test]
fn unique_rejects_repeated_items() {
    let err = fail([Statement::from(
        var("zones", array([string("a"), string("b"), string("a")]))
            .with_annotation(Annotation::flag("unique")),
    )]);
    assert!(err.to_string().contains("`zones` contains `a` more than once"));
}

// =============================================================================
// Instance metadata
// =============================================================================

#[test]
fn providers_and_tags_accumulate() {
    let evaluation = run([
        vm_schema(),
        resource("Vm", "web")
            .with_annotation(annotation("provider", [array([string("aws"), string("aws")])]))
            .with_annotation(annotation("tags", [object([("env", string("prod"))])]))
            .with_annotation(annotation("tags", [string("frontend")]))
            .with_property("name", string("web"))
            .with_property("size", int(2))
            .into(),
    ]);

    let web = evaluation.resource("web").unwrap();
    let web = web.borrow();
    let meta = web.meta();
    assert_eq!(meta.providers().collect::<Vec<_>>(), vec!["aws"]);
    assert_eq!(meta.tags().get("env"), Some(&Value::from("prod")));
    assert_eq!(meta.tags().labels().collect::<Vec<_>>(), vec!["frontend"]);
}

#[test]
fn existing_requires_an_identifier() {
    let err = fail([
        vm_schema(),
        resource("Vm", "legacy")
            .with_annotation(annotation("existing", [string("  ")]))
            .with_property("name", string("legacy"))
            .with_property("size", int(1))
            .into(),
    ]);
    assert!(matches!(
        err.kind,
        ErrorKind::DecoratorValidation { ref decorator, .. } if decorator == "existing"
    ));
}

#[test]
fn decorators_reject_illegal_targets() {
    let err = fail([Statement::from(
        input(Type::Number, "replicas")
            .with_annotation(annotation("count", [int(2)]))
            .with_default(int(1)),
    )]);
    assert!(matches!(
        err.kind,
        ErrorKind::IllegalTarget { ref decorator, ref target }
            if decorator == "count" && target == "input"
    ));
}

// =============================================================================
// Custom decorators
// =============================================================================

struct Audited;

impl Decorator for Audited {
    fn name(&self) -> &'static str {
        "audited"
    }

    fn targets(&self) -> &'static [TargetKind] {
        &[TargetKind::Resource]
    }

    fn arity(&self) -> RangeInclusive<usize> {
        0..=0
    }

    fn execute(&self, ctx: &mut DecoratorContext<'_>) -> Result<Effect> {
        if let Subject::Resource(resource) = &mut ctx.subject {
            resource.meta_mut().tags_mut().label("audited");
        }
        Ok(Effect::None)
    }
}

#[test]
fn registries_accept_custom_decorators() {
    let program: Program = [
        vm_schema(),
        resource("Vm", "web")
            .with_annotation(Annotation::flag("audited"))
            .with_property("name", string("web"))
            .with_property("size", int(1))
            .into(),
    ]
    .into_iter()
    .collect();

    let mut registry = DecoratorRegistry::standard();
    registry.register(Audited);
    let evaluation = Interpreter::new()
        .with_registry(registry)
        .evaluate(&program)
        .unwrap();

    let web = evaluation.resource("web").unwrap();
    assert!(web.borrow().meta().tags().has_label("audited"));
}

#[test]
fn unregistered_decorators_fail() {
    let err = fail([
        vm_schema(),
        resource("Vm", "web")
            .with_annotation(Annotation::flag("audited"))
            .with_property("name", string("web"))
            .with_property("size", int(1))
            .into(),
    ]);
    assert!(matches!(err.kind, ErrorKind::UnknownDecorator(ref name) if name == "audited"));
}
