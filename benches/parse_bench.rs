//! Benchmarks for lexing, parsing, binding and resolution.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use protolint::parser::{self, Lexer, SyntaxKind};
use protolint::{Binder, Resolver};

// ============================================================================
// Input Generation
// ============================================================================

/// A schema with `messages` messages, each with a nested enum and a few fields
/// referring to the previous message.
fn generate_schema(messages: usize) -> String {
    let mut text = String::from("syntax = \"proto3\";\npackage bench.v1;\n\n");
    for i in 0..messages {
        text.push_str(&format!(
            "// Message number {i}\nmessage M{i} {{\n  enum State {{ UNKNOWN = 0; ACTIVE = 1; }}\n  string name = 1;\n  int64 id = 2 [deprecated = false];\n  State state = 3;\n  map<string, int32> counts = 4;\n"
        ));
        if i > 0 {
            text.push_str(&format!("  .bench.v1.M{} previous = 5;\n", i - 1));
        }
        text.push_str("}\n\n");
    }
    text.push_str("service Api {\n  rpc Get (M0) returns (stream M0);\n}\n");
    text
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_lex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lex");
    for size in [10, 100] {
        let text = generate_schema(size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| {
                let mut lexer = Lexer::new(black_box(text), true);
                let mut count = 0usize;
                while lexer.scan() != SyntaxKind::EndOfFile {
                    count += 1;
                }
                count
            })
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [10, 100] {
        let text = generate_schema(size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| parser::parse("bench.proto", black_box(text)).unwrap())
        });
    }
    group.finish();
}

fn bench_bind_and_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind_resolve");
    let text = generate_schema(100);
    let file = parser::parse("bench.proto", &text).unwrap();

    group.throughput(Throughput::Elements(1));
    group.bench_function("bind/100", |b| {
        b.iter(|| {
            let mut file = file.clone();
            let mut binder = Binder::new();
            binder.bind(black_box(&mut file)).unwrap();
            binder.into_symbols()
        })
    });

    let mut bound = file.clone();
    let mut binder = Binder::new();
    binder.bind(&mut bound).unwrap();
    let symbols = binder.into_symbols();
    group.bench_function("references/100", |b| {
        b.iter(|| Resolver::new(&symbols).references(black_box(&bound)).len())
    });
    group.finish();
}

criterion_group!(benches, bench_lex, bench_parse, bench_bind_and_resolve);
criterion_main!(benches);
