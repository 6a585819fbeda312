//! Integration tests for the pretty printer

use pretty_assertions::assert_eq;
use stratus_foundation::Type;
use stratus_language::build::{
    annotation, cloud, count, ident, input, int, output, path, prop, resource, schema, string,
    template,
};
use stratus_language::pretty::pretty_program;
use stratus_language::{Statement, pretty_statement};

#[test]
fn programs_print_with_blank_lines_between_statements() {
    let statements: Vec<Statement> = vec![
        schema("Vpc", [prop(Type::String, "cidr"), cloud(Type::String, "id")]).into(),
        input(Type::String, "env")
            .with_default(string("dev"))
            .into(),
        resource("Vpc", "main")
            .with_property("cidr", string("10.0.0.0/16"))
            .into(),
        output(Type::String, "vpcId", path("main.id")).into(),
    ];

    assert_eq!(
        pretty_program(&statements),
        "schema Vpc {\n  string cidr\n  @cloud\n  string id\n}\n\n\
         input string env = \"dev\"\n\n\
         resource Vpc main {\n  cidr = \"10.0.0.0/16\"\n}\n\n\
         output string vpcId = main.id"
    );
}

#[test]
fn counted_resources_print_their_decorators() {
    let stmt = resource("Vm", "web")
        .with_annotation(count(ident("replicas")))
        .with_annotation(annotation("provider", [string("aws.east")]))
        .with_property("name", template("web-$count").unwrap())
        .with_property("size", int(2));

    assert_eq!(
        pretty_statement(&stmt.into()),
        "@count(replicas)\n@provider(\"aws.east\")\nresource Vm web {\n  name = \"web-$count\"\n  size = 2\n}"
    );
}
