//! Programs combining inputs, vars, loops, components and outputs.

use stratus_engine::Evaluation;
use stratus_foundation::{Type, Value};
use stratus_language::Statement;
use stratus_language::build::{
    array, cloud, component, component_def, for_each, ident, idx, input, member, output, path,
    prop, resource, schema, string, template, var,
};

use crate::{property, run};

fn three_tier() -> Vec<Statement> {
    vec![
        schema("Vpc", [prop(Type::String, "cidr"), cloud(Type::String, "id")]).into(),
        schema(
            "Subnet",
            [prop(Type::String, "vpcId"), prop(Type::String, "cidr")],
        )
        .into(),
        schema(
            "Vm",
            [
                prop(Type::String, "name"),
                prop(Type::String, "subnet"),
                cloud(Type::String, "ip"),
            ],
        )
        .into(),
        input(Type::String, "env").with_default(string("dev")).into(),
        var("prefix", template("app-$env").unwrap()).into(),
        resource("Vpc", "main")
            .with_property("cidr", string("10.0.0.0/16"))
            .into(),
        for_each(
            "zone",
            array([string("a"), string("b")]),
            [resource("Subnet", "private")
                .with_property("vpcId", path("main.id"))
                .with_property("cidr", template("${main.cidr}-$zone").unwrap())
                .into()],
        )
        .into(),
        component_def(
            "Tier",
            [
                input(Type::String, "name").into(),
                input(Type::String, "subnet").into(),
                resource("Vm", "vm")
                    .with_property("name", ident("name"))
                    .with_property("subnet", ident("subnet"))
                    .into(),
                output(Type::String, "ip", path("vm.ip")).into(),
            ],
        )
        .into(),
        component("Tier", "web")
            .with_input("name", template("${prefix}-web").unwrap())
            .with_input("subnet", member(idx(ident("private"), string("a")), "cidr"))
            .into(),
        output(Type::String, "webIp", path("web.ip")).into(),
    ]
}

fn evaluation() -> Evaluation {
    run(three_tier())
}

#[test]
fn inputs_and_vars_feed_later_declarations() {
    let evaluation = evaluation();
    assert_eq!(evaluation.input("env").unwrap().value, Value::from("dev"));
    assert_eq!(evaluation.var("prefix").unwrap().value, Value::from("app-dev"));
    assert_eq!(property(&evaluation, "web.vm", "name"), Value::from("app-dev-web"));
}

#[test]
fn loop_instances_mix_concrete_and_deferred_properties() {
    let evaluation = evaluation();
    let subnet = evaluation.resource(r#"private["a"]"#).unwrap();
    let subnet = subnet.borrow();

    assert_eq!(subnet.lookup("cidr"), Some(Value::from("10.0.0.0/16-a")));
    assert_eq!(subnet.lookup("vpcId"), Some(Value::Null));
    assert_eq!(
        subnet.deferred_properties()["vpcId"].dependency_name(),
        "main"
    );
}

#[test]
fn component_members_receive_their_inputs() {
    let evaluation = evaluation();
    assert_eq!(
        property(&evaluation, "web.vm", "subnet"),
        Value::from("10.0.0.0/16-a")
    );

    let web = evaluation.component("web").unwrap();
    assert_eq!(web.borrow().component_type(), "Tier");
    assert_eq!(web.borrow().members(), ["web.vm"]);
}

#[test]
fn outputs_of_cloud_values_stay_deferred() {
    let evaluation = evaluation();
    let record = evaluation.output("webIp").unwrap();
    assert!(record.is_deferred());
    assert_eq!(record.value, Value::Null);
}

#[test]
fn apply_order_respects_value_dependencies() {
    let evaluation = evaluation();
    let order = evaluation.apply_order().unwrap();
    let position = |name: &str| {
        order
            .iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("{name} missing from {order:?}"))
    };

    assert!(position("main") < position(r#"private["a"]"#));
    assert!(position("main") < position(r#"private["b"]"#));
    assert!(position("web.vm") < position("web"));

    let created = evaluation.created_names();
    for name in ["main", r#"private["a"]"#, r#"private["b"]"#, "web.vm", "web"] {
        assert!(created.iter().any(|n| n == name), "{name} not created");
    }
}
