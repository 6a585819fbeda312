//! Plan reports built from configured sessions.

use stratus_foundation::{Type, Value};
use stratus_language::build::{
    annotation, cloud, count, ident, input, int, object, output, path, prop, resource, schema,
    string,
};
use stratus_language::{Annotation, Program, Statement};
use stratus_runtime::{CliOverrides, InputResolver, REDACTED, Report, Session};

use crate::Scratch;

fn program() -> Program {
    [
        Statement::from(schema(
            "Bucket",
            [prop(Type::String, "name"), cloud(Type::String, "arn")],
        )),
        schema(
            "Queue",
            [prop(Type::String, "bucketArn"), cloud(Type::Number, "shards")],
        )
        .into(),
        input(Type::String, "apiKey")
            .with_annotation(Annotation::flag("sensitive"))
            .into(),
        input(Type::String, "env").with_default(string("dev")).into(),
        resource("Bucket", "logs")
            .with_annotation(annotation("existing", [string("arn:aws:s3:::logs")]))
            .with_annotation(annotation("tags", [object([("env", ident("env"))])]))
            .with_property("name", string("logs"))
            .into(),
        resource("Queue", "events")
            .with_property("bucketArn", path("logs.arn"))
            .into(),
        resource("Queue", "workers")
            .with_annotation(count(path("events.shards")))
            .with_property("bucketArn", string("none"))
            .into(),
        output(Type::String, "key", ident("apiKey"))
            .with_annotation(Annotation::flag("sensitive"))
            .into(),
        output(Type::Number, "replicas", int(2)).into(),
    ]
    .into_iter()
    .collect()
}

fn report() -> Report {
    let resolver = InputResolver::new()
        .with_source(CliOverrides::parse(["apiKey=abc123", "env=prod"]).unwrap());
    let evaluation = Session::new().evaluate_with(&program(), resolver).unwrap();
    Report::from_evaluation(&evaluation).unwrap()
}

#[test]
fn sensitive_inputs_and_outputs_are_redacted() {
    let report = report();
    let key = report.inputs.iter().find(|i| i.name == "apiKey").unwrap();
    assert!(key.sensitive);
    assert_eq!(key.value, Value::from(REDACTED));

    let output = report.outputs.iter().find(|o| o.name == "key").unwrap();
    assert_eq!(output.value, Value::from(REDACTED));
}

#[test]
fn resources_carry_their_metadata() {
    let report = report();
    let logs = report.resource("logs").unwrap();
    assert_eq!(logs.existing.as_deref(), Some("arn:aws:s3:::logs"));
    assert_eq!(logs.tags["env"], Value::from("prod"));

    let events = report.resource("events").unwrap();
    assert_eq!(events.deferred["bucketArn"], "logs.arn");
    assert_eq!(events.dependencies, vec!["logs"]);
}

#[test]
fn deferred_counts_appear_as_templates() {
    let report = report();
    assert!(report.resource("workers[0]").is_none());
    assert_eq!(report.templates.len(), 1);

    let workers = &report.templates[0];
    assert_eq!(workers.name, "workers");
    assert_eq!(workers.resource_type, "Queue");
    assert_eq!(workers.blocked_on, "events.shards");
    assert_eq!(workers.dependencies, vec!["events"]);
}

#[test]
fn plan_text_lists_every_change() {
    let text = report().to_string();
    assert!(text.contains("= Bucket logs"));
    assert!(text.contains("+ Queue events"));
    assert!(text.contains("bucketArn = (known after apply: logs.arn)"));
    assert!(text.contains("~ Queue workers[*] (count known after apply: events.shards)"));
    assert!(text.contains("output replicas = 2"));
    assert!(!text.contains("abc123"));
}

#[test]
fn reports_are_written_as_messagepack() {
    let scratch = Scratch::new("report");
    let path = scratch.path.join("plan.msgpack");
    let report = report();

    report.save_to_file(&path).unwrap();
    let written = std::fs::read(&path).unwrap();
    assert!(!written.is_empty());
    assert_eq!(written, report.to_bytes().unwrap());
}
