//! Full runs: defaults on disk, a configured session, and the resulting plan.

use std::fs;

use stratus::engine::EngineConfig;
use stratus::foundation::{ErrorKind, Type, Value};
use stratus::language::build::{
    annotation, array, cloud, component, component_def, count, for_each, ident, input, output,
    path, prop, resource, schema, string, template,
};
use stratus::language::{Program, Statement};
use stratus::runtime::{RuntimeConfig, Session};

fn web_stack() -> Program {
    [
        Statement::from(schema(
            "Vm",
            [
                prop(Type::String, "name"),
                prop(Type::String, "zone"),
                cloud(Type::String, "ip"),
            ],
        )),
        schema("Lb", [prop(Type::Any, "targets")]).into(),
        input(Type::array(Type::String), "zones").into(),
        input(Type::Number, "replicas").into(),
        input(Type::String, "env")
            .with_annotation(annotation(
                "allowed",
                [array([string("dev"), string("prod")])],
            ))
            .into(),
        component_def(
            "Pool",
            [
                input(Type::String, "zone").into(),
                resource("Vm", "vm")
                    .with_annotation(count(ident("replicas")))
                    .with_property("name", template("${env}-${zone}-$count").unwrap())
                    .with_property("zone", ident("zone"))
                    .into(),
            ],
        )
        .into(),
        for_each(
            "zone",
            ident("zones"),
            [component("Pool", "pool")
                .with_input("zone", ident("zone"))
                .into()],
        )
        .into(),
        resource("Lb", "lb")
            .with_annotation(annotation("dependsOn", [ident("pool")]))
            .with_property("targets", ident("zones"))
            .into(),
        output(Type::array(Type::String), "targets", path("lb.targets")).into(),
    ]
    .into_iter()
    .collect()
}

struct Workspace {
    dir: std::path::PathBuf,
}

impl Workspace {
    fn new(label: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "stratus-integration-{label}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("inputs.defaults"), "zones = a, b\nreplicas = 1\nenv = dev\n").unwrap();
        fs::write(dir.join("inputs.prod.defaults"), "env = prod\nreplicas = 2\n").unwrap();
        Self { dir }
    }

    fn config(&self) -> RuntimeConfig {
        RuntimeConfig::new()
            .with_working_dir(&self.dir)
            .with_env_prefix("STRATUS_INTEGRATION_TEST_")
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

#[test]
fn environment_defaults_shape_the_plan() {
    let workspace = Workspace::new("prod");
    let session = Session::with_config(workspace.config().with_environment("prod"));
    let report = session.plan(&web_stack()).unwrap();

    let vm_names: Vec<&str> = report
        .resources
        .iter()
        .filter(|r| r.schema == "Vm")
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(vm_names.len(), 4);

    let first = report
        .resources
        .iter()
        .find(|r| r.schema == "Vm" && r.properties["zone"] == Value::from("a"))
        .unwrap();
    assert!(
        first.properties["name"]
            .as_str()
            .is_some_and(|name| name.starts_with("prod-a-"))
    );
    assert!(first.deferred.is_empty());

    let lb = report.resource("lb").unwrap();
    assert_eq!(lb.properties["targets"], Value::from(vec!["a", "b"]));
    let lb_position = report.apply_order.iter().position(|n| n == "lb").unwrap();
    for vm in vm_names {
        let position = report.apply_order.iter().position(|n| n == vm).unwrap();
        assert!(position < lb_position, "{vm} must be created before lb");
    }
}

#[test]
fn overrides_beat_every_file() {
    let workspace = Workspace::new("override");
    let config = workspace
        .config()
        .with_environment("prod")
        .with_override("replicas=0");
    let evaluation = Session::with_config(config).evaluate(&web_stack()).unwrap();

    assert_eq!(evaluation.input("replicas").unwrap().value, Value::Int(0));
    assert_eq!(evaluation.schema("Vm").unwrap().borrow().instance_count(), 0);
    assert_eq!(evaluation.components().count(), 2);
}

#[test]
fn disallowed_values_stop_the_run() {
    let workspace = Workspace::new("disallowed");
    let config = workspace.config().with_override("env=qa");
    let err = Session::with_config(config).plan(&web_stack()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DecoratorValidation { ref decorator, .. } if decorator == "allowed"));
}

#[test]
fn engine_settings_flow_through_the_session() {
    let workspace = Workspace::new("strict");
    let program: Program = [
        Statement::from(schema("Vm", [prop(Type::String, "name")])),
        resource("Vm", "web")
            .with_property("name", string("web"))
            .with_property("colour", string("blue"))
            .into(),
    ]
    .into_iter()
    .collect();

    let strict = Session::with_config(workspace.config());
    let err = strict.evaluate(&program).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownProperty { ref property, .. } if property == "colour"));

    let lenient = Session::with_config(
        workspace
            .config()
            .with_engine(EngineConfig::new().with_strict_properties(false)),
    );
    assert!(lenient.evaluate(&program).is_ok());
}
