//! `@count` expansion and deferred resource templates.

use proptest::prelude::*;
use stratus_foundation::{Type, Value};
use stratus_language::Statement;
use stratus_language::build::{
    cloud, count, float, int, path, prop, resource, schema, string, template,
};

use crate::{property, run};

fn vm_schema() -> Statement {
    schema("Vm", [prop(Type::String, "name")]).into()
}

fn counted_vm(decl: Statement) -> [Statement; 2] {
    [vm_schema(), decl]
}

// =============================================================================
// Concrete counts
// =============================================================================

#[test]
fn count_binds_the_index_for_interpolation() {
    let evaluation = run(counted_vm(
        resource("Vm", "main")
            .with_annotation(count(int(2)))
            .with_property("name", template("name-$count").unwrap())
            .into(),
    ));

    assert_eq!(property(&evaluation, "main[0]", "name"), Value::from("name-0"));
    assert_eq!(property(&evaluation, "main[1]", "name"), Value::from("name-1"));
    assert!(evaluation.resource("main").is_none());
}

#[test]
fn zero_count_creates_nothing() {
    let evaluation = run(counted_vm(
        resource("Vm", "main")
            .with_annotation(count(int(0)))
            .with_property("name", string("x"))
            .into(),
    ));

    assert!(evaluation.resources().is_empty());
    assert!(evaluation.templates().is_empty());
}

#[test]
fn fractional_counts_are_floored() {
    let evaluation = run(counted_vm(
        resource("Vm", "main")
            .with_annotation(count(float(2.7)))
            .with_property("name", string("x"))
            .into(),
    ));

    let vm = evaluation.schema("Vm").unwrap();
    assert_eq!(vm.borrow().instance_names(), vec!["main[0]", "main[1]"]);
}

// =============================================================================
// Deferred counts
// =============================================================================

#[test]
fn cloud_counts_become_a_single_template() {
    let evaluation = run([
        schema(
            "Vpc",
            [prop(Type::String, "cidr"), cloud(Type::Number, "subnetCount")],
        )
        .into(),
        schema("Subnet", [prop(Type::String, "cidr")]).into(),
        resource("Vpc", "vpc")
            .with_property("cidr", string("10.0.0.0/16"))
            .into(),
        resource("Subnet", "sn")
            .with_annotation(count(path("vpc.subnetCount")))
            .with_property("cidr", template("10.0.$count.0/24").unwrap())
            .into(),
    ]);

    let subnet = evaluation.schema("Subnet").unwrap();
    assert_eq!(subnet.borrow().instance_count(), 0);

    let templates = evaluation.templates();
    assert_eq!(templates.len(), 1);
    let template = &templates[0];
    assert_eq!(template.template_name, "sn");
    assert_eq!(template.resource_type, "Subnet");
    assert_eq!(template.blocking_resource(), "vpc");
    assert_eq!(
        template.dependencies.iter().collect::<Vec<_>>(),
        vec!["vpc"]
    );

    assert!(template.all_dependencies_resolved(["vpc"]));
    assert!(!template.all_dependencies_resolved(Vec::<&str>::new()));
    assert_eq!(evaluation.ready_templates().len(), 1);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn count_produces_exactly_n_indexed_instances(n in 0i64..24) {
        let evaluation = run(counted_vm(
            resource("Vm", "web")
                .with_annotation(count(int(n)))
                .with_property("name", template("web-$count").unwrap())
                .into(),
        ));

        let vm = evaluation.schema("Vm").unwrap();
        let expected: Vec<String> = (0..n).map(|i| format!("web[{i}]")).collect();
        prop_assert_eq!(vm.borrow().instance_names(), expected);
        for i in 0..n {
            let name = format!("web[{i}]");
            prop_assert_eq!(
                property(&evaluation, &name, "name"),
                Value::from(format!("web-{i}"))
            );
        }
    }
}
