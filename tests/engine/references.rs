//! References between resources, deferred cloud values, and cycles.

use stratus_foundation::{ErrorKind, Type, Value};
use stratus_language::Statement;
use stratus_language::build::{cloud, path, prop, resource, schema, string, template};

use crate::{fail, property, run};

fn network_schemas() -> [Statement; 2] {
    [
        schema(
            "Vpc",
            [prop(Type::String, "cidrBlock"), cloud(Type::String, "vpcId")],
        )
        .into(),
        schema(
            "Subnet",
            [prop(Type::String, "vpcId"), prop(Type::String, "cidr")],
        )
        .into(),
    ]
}

fn example_vpc() -> Statement {
    resource("Vpc", "example")
        .with_property("cidrBlock", string("10.0.0.0/24"))
        .into()
}

// =============================================================================
// Concrete references
// =============================================================================

#[test]
fn properties_are_readable_after_evaluation() {
    let evaluation = run([
        schema("Vm", [prop(Type::String, "name")]).into(),
        resource("Vm", "main").with_property("name", string("x")).into(),
    ]);

    let main = evaluation.instance("Vm", "main").unwrap();
    assert_eq!(main.borrow().lookup("name"), Some(Value::from("x")));
}

#[test]
fn non_cloud_references_resolve_without_deferral() {
    let [vpc, subnet] = network_schemas();
    let evaluation = run([
        vpc,
        subnet,
        example_vpc(),
        resource("Subnet", "subnet")
            .with_property("cidr", path("example.cidrBlock"))
            .into(),
    ]);

    assert_eq!(
        property(&evaluation, "subnet", "cidr"),
        Value::from("10.0.0.0/24")
    );
    let subnet = evaluation.resource("subnet").unwrap();
    assert!(subnet.borrow().deferred_properties().is_empty());
}

// =============================================================================
// Deferred references
// =============================================================================

#[test]
fn cloud_references_record_a_single_deferred_entry() {
    let [vpc, subnet] = network_schemas();
    let evaluation = run([
        vpc,
        subnet,
        example_vpc(),
        resource("Subnet", "subnet")
            .with_property("vpcId", path("example.vpcId"))
            .with_property("cidr", path("example.cidrBlock"))
            .into(),
    ]);

    let subnet = evaluation.resource("subnet").unwrap();
    let subnet = subnet.borrow();
    assert_eq!(subnet.lookup("vpcId"), Some(Value::Null));
    assert!(subnet.has_deferred_properties());
    assert_eq!(subnet.deferred_properties().len(), 1);

    let deferred = &subnet.deferred_properties()["vpcId"];
    assert_eq!(deferred.dependency_name(), "example");
    assert_eq!(deferred.property_path(), "vpcId");
    assert!(subnet.dependencies().contains(&"example"));
}

#[test]
fn interpolating_a_deferred_value_renders_the_placeholder() {
    let [vpc, subnet] = network_schemas();
    let evaluation = run([
        vpc,
        subnet,
        example_vpc(),
        resource("Subnet", "subnet")
            .with_property("cidr", template("${example.vpcId}/sub").unwrap())
            .into(),
    ]);

    assert_eq!(property(&evaluation, "subnet", "cidr"), Value::from("null/sub"));
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn mutual_concrete_references_raise_a_cycle() {
    let err = fail([
        schema("Vm", [prop(Type::String, "x"), prop(Type::String, "y")]).into(),
        resource("Vm", "a").with_property("x", path("b.y")).into(),
        resource("Vm", "b").with_property("y", path("a.x")).into(),
    ]);

    assert!(matches!(err.kind, ErrorKind::Cycle(ref path) if path == &["a", "b", "a"]));
}

#[test]
fn cycles_through_cloud_properties_are_allowed() {
    let evaluation = run([
        schema(
            "Node",
            [prop(Type::String, "peer"), cloud(Type::String, "id")],
        )
        .into(),
        resource("Node", "a").with_property("peer", path("b.id")).into(),
        resource("Node", "b").with_property("peer", path("a.id")).into(),
    ]);

    for name in ["a", "b"] {
        let node = evaluation.resource(name).unwrap();
        assert!(node.borrow().has_deferred_properties());
    }
}

#[test]
fn duplicate_instance_names_are_rejected() {
    let err = fail([
        schema("Vm", [prop(Type::String, "name")]).into(),
        resource("Vm", "main").with_property("name", string("a")).into(),
        resource("Vm", "main").with_property("name", string("b")).into(),
    ]);
    assert!(matches!(err.kind, ErrorKind::DeclarationExists(ref name) if name == "main"));
}
