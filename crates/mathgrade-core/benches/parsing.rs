use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mathgrade_core::normalize::normalize;
use mathgrade_core::parser::parse_grade_set_str;
use mathgrade_symbolic::{parse, simplify};

const GRADE_SET: &str = r#"
[grade_set]
id = "bench"
name = "Bench"

[[cases]]
id = "c1"
student = "2+2"
expected = "4"

[cases.expect]
is_correct = true

[[cases]]
id = "c2"
student = "-4"
expected = "4"

[[step_cases]]
id = "s1"
steps = ["x=5", "10"]
expected = "x=10"
"#;

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box("3,5 × x² divided by √16 moins 2")))
    });
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.bench_function("short", |b| b.iter(|| parse(black_box("2x + 1"))));
    group.bench_function("nested", |b| {
        b.iter(|| parse(black_box("sin(x)^2 + cos(x)^2 - (a + b)^3 / (2*(c - d))")))
    });
    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    let expanded = parse("(x + y + 1)^6 - (x + y)^6").unwrap_or_else(|e| panic!("{e}"));
    c.bench_function("simplify_power", |b| b.iter(|| simplify(black_box(&expanded))));
}

fn bench_grade_set(c: &mut Criterion) {
    let path = std::path::Path::new("bench.toml");
    c.bench_function("parse_grade_set", |b| {
        b.iter(|| parse_grade_set_str(black_box(GRADE_SET), path))
    });
}

criterion_group!(benches, bench_normalize, bench_parse, bench_simplify, bench_grade_set);
criterion_main!(benches);
