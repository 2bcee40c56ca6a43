//! Benchmarks for detection and fixing.
//!
//! These benchmarks measure:
//! - Parsing and lowering alone
//! - Full analysis (parse, semantic model, rule) as files grow
//! - Batch fixing of every finding in a file

// Benchmark code - performance of the benchmark setup is not critical
#![allow(missing_docs)]
#![allow(clippy::format_push_string)]
#![allow(clippy::cast_possible_truncation)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use readguard::analysis::analyze_source;
use readguard::batch::fix_source;
use readguard::languages::csharp;

/// Generate a C# file with `num_classes` classes, each mixing discarded,
/// captured and unrelated reads.
fn generate_csharp_file(num_classes: usize) -> String {
    let mut code = String::new();
    code.push_str("using System;\nusing System.IO;\n\nnamespace Bench\n{\n");

    for i in 0..num_classes {
        code.push_str(&format!(
            "    public class Reader{i} : MemoryStream\n\
             {{\n\
                 private readonly FileStream file = File.OpenRead(\"data{i}.bin\");\n\n\
                 public int Drain(byte[] buffer)\n\
                 {{\n\
                     file.Read(buffer, 0, buffer.Length);\n\
                     var total = file.Read(buffer, 0, buffer.Length);\n\
                     Read(buffer, 0, 1);\n\
                     var reader = new StreamReader(file);\n\
                     reader.Read(new char[4], 0, 4);\n\
                     if (total > 0)\n\
                         file.Read(buffer, 0, total);\n\
                     return total;\n\
                 }}\n\
             }}\n\n"
        ));
    }

    code.push_str("}\n");
    code
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for num_classes in [10, 100] {
        let source = generate_csharp_file(num_classes);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_classes), &source, |b, source| {
            b.iter(|| csharp::parse(black_box(source)));
        });
    }

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for num_classes in [10, 100, 500] {
        let source = generate_csharp_file(num_classes);
        group.throughput(Throughput::Elements(num_classes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_classes), &source, |b, source| {
            b.iter(|| analyze_source(black_box(source)));
        });
    }

    group.finish();
}

fn bench_fix(c: &mut Criterion) {
    let mut group = c.benchmark_group("fix");

    for num_classes in [10, 100] {
        let source = generate_csharp_file(num_classes);
        group.bench_with_input(BenchmarkId::from_parameter(num_classes), &source, |b, source| {
            b.iter(|| fix_source(black_box(source)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_analyze, bench_fix);
criterion_main!(benches);
