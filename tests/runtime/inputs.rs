//! Input resolution through defaults files, environment variables and
//! command-line overrides.

use proptest::prelude::*;
use stratus_engine::InputProvider;
use stratus_foundation::{ErrorKind, Type, Value};
use stratus_language::build::{input, int, string};
use stratus_language::{Program, Statement};
use stratus_runtime::{
    CliOverrides, DefaultsFile, EnvironmentVariables, InputResolver, RuntimeConfig, Session,
    parse_literal,
};

use crate::Scratch;

const PREFIX: &str = "STRATUS_RUNTIME_IT_";

fn program() -> Program {
    [
        Statement::from(input(Type::String, "region")),
        input(Type::Number, "replicas").with_default(int(1)).into(),
        input(Type::array(Type::String), "zones").into(),
        input(Type::String, "tier")
            .with_default(string("standard"))
            .into(),
    ]
    .into_iter()
    .collect()
}

// =============================================================================
// Precedence
// =============================================================================

#[test]
fn each_layer_overrides_the_one_before() {
    let scratch = Scratch::new("layers");
    scratch.write(
        "inputs.defaults",
        "# shared\nregion = us-east-1\nreplicas = 2\nzones = a, b\n",
    );
    scratch.write("inputs.prod.defaults", "replicas = 3\n");

    let resolver = InputResolver::new()
        .with_source(DefaultsFile::load(scratch.path.join("inputs.defaults")).unwrap())
        .with_source(DefaultsFile::load(scratch.path.join("inputs.prod.defaults")).unwrap())
        .with_source(EnvironmentVariables::new(
            PREFIX,
            [(format!("{PREFIX}REGION"), "eu-west-1".to_string())],
        ))
        .with_source(CliOverrides::parse(["zones=[c]"]).unwrap());

    let evaluation = Session::new().evaluate_with(&program(), resolver).unwrap();
    assert_eq!(evaluation.input("region").unwrap().value, Value::from("eu-west-1"));
    assert_eq!(evaluation.input("replicas").unwrap().value, Value::Int(3));
    assert_eq!(evaluation.input("zones").unwrap().value, Value::from(vec!["c"]));
    assert_eq!(evaluation.input("tier").unwrap().value, Value::from("standard"));
}

#[test]
fn sessions_build_the_chain_from_configuration() {
    let scratch = Scratch::new("session");
    scratch.write("inputs.defaults", "region = us-east-1\nzones = a\n");
    scratch.write("inputs.staging.defaults", "tier = premium\n");

    let config = RuntimeConfig::new()
        .with_working_dir(&scratch.path)
        .with_environment("staging")
        .with_env_prefix(PREFIX)
        .with_override("replicas=5");
    let evaluation = Session::with_config(config).evaluate(&program()).unwrap();

    assert_eq!(evaluation.input("region").unwrap().value, Value::from("us-east-1"));
    assert_eq!(evaluation.input("replicas").unwrap().value, Value::Int(5));
    assert_eq!(evaluation.input("tier").unwrap().value, Value::from("premium"));
}

#[test]
fn unset_inputs_without_defaults_are_missing() {
    let scratch = Scratch::new("missing");
    scratch.write("inputs.defaults", "region = us-east-1\n");

    let config = RuntimeConfig::new()
        .with_working_dir(&scratch.path)
        .with_env_prefix(PREFIX);
    let err = Session::with_config(config).evaluate(&program()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingInput(ref name) if name == "zones"));
}

#[test]
fn malformed_override_arguments_are_rejected() {
    let err = CliOverrides::parse(["region"]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InputParse { .. }));
}

#[test]
fn malformed_file_lines_name_the_location() {
    let err = DefaultsFile::from_text("inputs.defaults", "region = a\nbroken\n").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::InputParse { ref name, .. } if name == "inputs.defaults:2"
    ));
}

#[test]
fn environment_names_match_case_insensitively() {
    let vars = EnvironmentVariables::new(
        PREFIX,
        [
            (format!("{PREFIX}INSTANCETYPE"), "t3.micro".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ],
    );
    let resolver = InputResolver::new().with_source(vars);
    assert_eq!(
        resolver.resolve("instanceType", &Type::String).unwrap(),
        Some(Value::from("t3.micro"))
    );
    assert_eq!(resolver.resolve("unrelated", &Type::String).unwrap(), None);
}

// =============================================================================
// Literals
// =============================================================================

proptest! {
    #[test]
    fn integers_round_trip_through_text(n in any::<i64>()) {
        prop_assert_eq!(parse_literal(&n.to_string()).unwrap(), Value::Int(n));
    }

    #[test]
    fn comma_lists_become_arrays(items in prop::collection::vec(any::<i32>(), 2..8)) {
        let text = items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        prop_assert_eq!(parse_literal(&text).unwrap(), Value::from(items));
    }
}
