//! Small programs exercising one behavior each.

use stratus::engine::{Evaluation, evaluate};
use stratus::foundation::{ErrorKind, Type, Value};
use stratus::language::build::{
    cloud, count, int, path, prop, resource, schema, string, template,
};
use stratus::language::{Program, Statement};
use stratus::runtime::{Report, logging::init_tracing};

fn program(statements: impl IntoIterator<Item = Statement>) -> Program {
    statements.into_iter().collect()
}

fn run(statements: impl IntoIterator<Item = Statement>) -> Evaluation {
    init_tracing();
    evaluate(&program(statements)).unwrap()
}

#[test]
fn a_single_resource_keeps_its_properties() {
    let evaluation = run([
        schema("Vm", [prop(Type::String, "name")]).into(),
        resource("Vm", "main").with_property("name", string("x")).into(),
    ]);

    let vm = evaluation.schema("Vm").unwrap();
    let main = vm.borrow().get_instance("main").unwrap();
    assert_eq!(main.borrow().lookup("name"), Some(Value::from("x")));
}

#[test]
fn counted_resources_interpolate_their_index() {
    let evaluation = run([
        schema("Vm", [prop(Type::String, "name")]).into(),
        resource("Vm", "main")
            .with_annotation(count(int(2)))
            .with_property("name", template("name-$count").unwrap())
            .into(),
    ]);

    let report = Report::from_evaluation(&evaluation).unwrap();
    assert_eq!(
        report.resource("main[0]").unwrap().properties["name"],
        Value::from("name-0")
    );
    assert_eq!(
        report.resource("main[1]").unwrap().properties["name"],
        Value::from("name-1")
    );
}

#[test]
fn cloud_managed_references_defer() {
    let evaluation = run([
        schema(
            "Vpc",
            [prop(Type::String, "cidrBlock"), cloud(Type::String, "vpcId")],
        )
        .into(),
        schema("Subnet", [prop(Type::String, "vpcId")]).into(),
        resource("Vpc", "example")
            .with_property("cidrBlock", string("10.0.0.0/24"))
            .into(),
        resource("Subnet", "subnet")
            .with_property("vpcId", path("example.vpcId"))
            .into(),
    ]);

    let subnet = evaluation.resource("subnet").unwrap();
    let subnet = subnet.borrow();
    assert_eq!(subnet.lookup("vpcId"), Some(Value::Null));
    assert!(subnet.has_deferred_properties());
    let deferred = &subnet.deferred_properties()["vpcId"];
    assert_eq!(
        (deferred.dependency_name(), deferred.property_path()),
        ("example", "vpcId")
    );
}

#[test]
fn mutual_references_are_a_cycle() {
    let err = evaluate(&program([
        schema("Vm", [prop(Type::String, "x"), prop(Type::String, "y")]).into(),
        resource("Vm", "a").with_property("x", path("b.y")).into(),
        resource("Vm", "b").with_property("y", path("a.x")).into(),
    ]))
    .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Cycle(_)));
    let context = err.context.unwrap();
    assert!(context.declaration.is_some());
}

#[test]
fn unknown_counts_produce_a_template() {
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
            .with_property("cidr", string("10.0.1.0/24"))
            .into(),
    ]);

    let subnet = evaluation.schema("Subnet").unwrap();
    assert_eq!(subnet.borrow().instance_count(), 0);
    assert_eq!(evaluation.templates().len(), 1);
    let dependencies: Vec<&str> = evaluation.templates()[0]
        .dependencies
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(dependencies, vec!["vpc"]);
}
