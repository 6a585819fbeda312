//! Integration tests for syntax tree construction
//!
//! Tests statement metadata and reference collection across whole programs.

use stratus_foundation::Type;
use stratus_language::ast::TargetKind;
use stratus_language::build::{
    annotation, cloud, component, component_def, count, for_each, ident, input, int, member,
    output, path, prop, range, resource, schema, string,
};
use stratus_language::visitor::statement_roots;
use stratus_language::{Program, Statement, referenced_roots};

fn network_program() -> Program {
    [
        Statement::from(schema(
            "Vpc",
            [prop(Type::String, "cidr"), cloud(Type::String, "id")],
        )),
        input(Type::String, "cidr").into(),
        resource("Vpc", "main")
            .with_property("cidr", ident("cidr"))
            .into(),
        resource("Subnet", "private")
            .with_annotation(count(int(2)))
            .with_property("vpcId", path("main.id"))
            .into(),
        output(Type::String, "vpcId", path("main.id")).into(),
    ]
    .into_iter()
    .collect()
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn programs_keep_source_order() {
    let program = network_program();
    let names: Vec<_> = program.statements.iter().filter_map(Statement::name).collect();
    assert_eq!(names, vec!["Vpc", "cidr", "main", "private", "vpcId"]);
}

#[test]
fn statements_report_their_decorator_target() {
    let program = network_program();
    let kinds: Vec<_> = program
        .statements
        .iter()
        .map(Statement::target_kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(TargetKind::Schema),
            Some(TargetKind::Input),
            Some(TargetKind::Resource),
            Some(TargetKind::Resource),
            Some(TargetKind::Output),
        ]
    );
    assert_eq!(TargetKind::SchemaProperty.to_string(), "schema property");
}

#[test]
fn annotations_are_exposed_uniformly() {
    let stmt: Statement = resource("Vm", "web")
        .with_annotation(count(int(3)))
        .with_annotation(annotation("provider", [string("aws.east")]))
        .into();
    let names: Vec<_> = stmt.annotations().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["count", "provider"]);
}

// =============================================================================
// References
// =============================================================================

#[test]
fn roots_follow_member_chains() {
    assert_eq!(referenced_roots(&path("app.vpc.id")), vec!["app"]);
    assert_eq!(referenced_roots(&member(ident("vpc"), "id")), vec!["vpc"]);
    assert!(referenced_roots(&int(1)).is_empty());
}

#[test]
fn statement_roots_cover_nested_bodies() {
    let def = component_def(
        "App",
        [
            input(Type::Number, "replicas").into(),
            for_each(
                "i",
                range(int(0), ident("replicas")),
                [resource("Vm", "vm")
                    .with_property("subnet", path("network.subnetId"))
                    .into()],
            )
            .into(),
        ],
    );
    let roots = statement_roots(&def.into());
    assert!(roots.contains(&"replicas".to_string()));
    assert!(roots.contains(&"network".to_string()));
}

#[test]
fn component_instances_collect_input_roots() {
    let stmt: Statement = component("App", "api")
        .with_input("subnet", path("network.id"))
        .with_input("size", int(1))
        .into();
    assert_eq!(statement_roots(&stmt), vec!["network"]);
}
