//! Benchmarks for the Stratus runtime (input parsing, reports).
//!
//! Run with: `cargo bench --package stratus_runtime --bench runtime_benchmarks`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use stratus_engine::evaluate;
use stratus_foundation::Type;
use stratus_language::build::{cloud, count, int, path, prop, resource, schema, string};
use stratus_language::{Annotation, Program, Statement};
use stratus_runtime::{DefaultsFile, Report, parse_literal};

// =============================================================================
// Helper Functions
// =============================================================================

fn defaults_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("input{i} = [zone-{i}a, zone-{i}b, {{size: {i}}}]\n"))
        .collect()
}

fn counted_program(n: i64) -> Program {
    [
        Statement::from(schema(
            "Db",
            [
                prop(Type::String, "engine"),
                prop(Type::String, "password").with_annotation(Annotation::flag("sensitive")),
                cloud(Type::String, "endpoint"),
            ],
        )),
        resource("Db", "primary")
            .with_property("engine", string("postgres"))
            .with_property("password", string("secret"))
            .into(),
        resource("Db", "replica")
            .with_property("engine", path("primary.engine"))
            .with_property("password", path("primary.endpoint"))
            .with_annotation(count(int(n)))
            .into(),
    ]
    .into_iter()
    .collect()
}

// =============================================================================
// Input Benchmarks
// =============================================================================

fn bench_literals(c: &mut Criterion) {
    let mut group = c.benchmark_group("inputs/literal");

    group.bench_function("scalar", |b| b.iter(|| black_box(parse_literal("us-east-1"))));
    group.bench_function("list", |b| b.iter(|| black_box(parse_literal("a, b, c, d"))));
    group.bench_function("nested", |b| {
        b.iter(|| black_box(parse_literal("{zones: [a, b], sizes: {small: 1, large: 4}}")));
    });

    group.finish();
}

fn bench_defaults_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("inputs/defaults_file");

    for lines in [10usize, 1000] {
        let text = defaults_text(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &text, |b, text| {
            b.iter(|| black_box(DefaultsFile::from_text("inputs.defaults", text).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// Report Benchmarks
// =============================================================================

fn bench_reports(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");

    for n in [10i64, 500] {
        let evaluation = evaluate(&counted_program(n)).unwrap();
        group.bench_with_input(BenchmarkId::new("snapshot", n), &evaluation, |b, evaluation| {
            b.iter(|| black_box(Report::from_evaluation(evaluation).unwrap()));
        });

        let report = Report::from_evaluation(&evaluation).unwrap();
        group.bench_with_input(BenchmarkId::new("encode", n), &report, |b, report| {
            b.iter(|| black_box(report.to_bytes().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_literals, bench_defaults_file, bench_reports);
criterion_main!(benches);
