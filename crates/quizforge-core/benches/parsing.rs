use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizforge_core::parser::{parse_test_str, validate_test};

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    // Generate test TOML strings of various sizes
    let small_toml = generate_test_toml(5);
    let medium_toml = generate_test_toml(50);
    let large_toml = generate_test_toml(200);

    group.bench_function("5_questions", |b| {
        b.iter(|| parse_test_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("50_questions", |b| {
        b.iter(|| parse_test_str(black_box(&medium_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("200_questions", |b| {
        b.iter(|| parse_test_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let test = match parse_test_str(&generate_test_toml(200), "bench.toml".as_ref()) {
        Ok(test) => test,
        Err(e) => panic!("bench TOML should parse: {e:#}"),
    };

    c.bench_function("validate/200_questions", |b| {
        b.iter(|| validate_test(black_box(&test)))
    });
}

fn generate_test_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[test]
id = 1
title = "Benchmark"
access_code = "BENCH"
show_answers = true
"#,
    );
    for i in 0..n {
        let kind = ["single_choice", "multiple_choice", "fill_in_blank"][i % 3];
        s.push_str(&format!(
            r#"
[[questions]]
id = {i}
type = "{kind}"
text = "Question {i}"
points = 2
order = {i}

[[questions.options]]
id = {a}
text = "Answer {i}"
is_correct = true
"#,
            a = i * 10
        ));
        if kind != "fill_in_blank" {
            s.push_str(&format!(
                r#"
[[questions.options]]
id = {b}
text = "Distractor {i}"
"#,
                b = i * 10 + 1
            ));
        }
    }
    s
}

criterion_group!(benches, bench_toml_parsing, bench_validation);
criterion_main!(benches);
