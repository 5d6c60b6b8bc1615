//! Pipeline throughput: naive string prefix vs. segment-aware validation
//!
//! Every approach receives the same untrusted fragments and the same root, so the
//! numbers show what the segment-aware check and the type-state stages cost over
//! a plain `format!` + `starts_with`, which is fast and wrong.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sandbox_path::{
    normalize, resolve, validate, FixedClock, Pipeline, TransformPolicy, TrustedRoot,
};
use std::hint::black_box;

const ROOT: &str = "/srv/uploads";

// Marker type for benchmarks
struct BenchRoot;

fn fragments() -> Vec<&'static str> {
    vec![
        "reports/2025.pdf",
        "existing/nested/file2.txt",
        "existing/../existing/file1.txt",
        "existing/./nested/../file1.txt",
        "very/deeply/nested/nonexistent/path/file.txt",
        "..\\..\\windows\\system32",
        "../../etc/passwd",
        "../uploads2/secret",
        "/etc/passwd",
        "logs//app.log",
    ]
}

/// Baseline: string concatenation plus a raw prefix test (admits `/srv/uploads2`).
fn bench_naive_prefix(c: &mut Criterion) {
    let fragments = fragments();
    let mut group = c.benchmark_group("naive_prefix");
    group.throughput(Throughput::Elements(fragments.len() as u64));

    group.bench_function("mixed_workload", |b| {
        b.iter(|| {
            for fragment in &fragments {
                let joined = format!("{ROOT}/{}", black_box(fragment));
                black_box(joined.starts_with(ROOT));
            }
        });
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let fragments = fragments();
    let mut group = c.benchmark_group("normalize");
    group.throughput(Throughput::Elements(fragments.len() as u64));

    group.bench_function("mixed_workload", |b| {
        b.iter(|| {
            for fragment in &fragments {
                black_box(normalize(black_box(fragment)));
            }
        });
    });

    group.finish();
}

/// Measures: resolve(root, fragment) -> validate(root, candidate) -> ValidationVerdict
fn bench_resolve_and_validate(c: &mut Criterion) {
    let fragments = fragments();
    let root: TrustedRoot<BenchRoot> = TrustedRoot::try_new(ROOT).expect("valid root");
    let mut group = c.benchmark_group("resolve_and_validate");
    group.throughput(Throughput::Elements(fragments.len() as u64));

    group.bench_function("mixed_workload", |b| {
        b.iter(|| {
            for fragment in &fragments {
                if let Ok(candidate) = resolve(&root, black_box(fragment)) {
                    black_box(validate(&root, &candidate));
                }
            }
        });
    });

    group.finish();
}

/// Side-by-side: verdict, typed SafePath, and full transformation per fragment.
fn bench_pipeline_operations(c: &mut Criterion) {
    let fragments = fragments();
    let pipeline: Pipeline<BenchRoot> = Pipeline::try_new(ROOT).expect("valid root");
    let rotate =
        TransformPolicy::timestamp_rotate(&FixedClock::new("2025-01-04")).expect("valid token");
    let relocate = TransformPolicy::relocate("/backup").expect("valid target");

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(fragments.len() as u64));

    group.bench_with_input(BenchmarkId::new("operation", "check"), &fragments, |b, fragments| {
        b.iter(|| {
            for fragment in fragments {
                black_box(pipeline.check(black_box(fragment)));
            }
        });
    });

    group.bench_with_input(BenchmarkId::new("operation", "resolve"), &fragments, |b, fragments| {
        b.iter(|| {
            for fragment in fragments {
                let _ = black_box(pipeline.resolve(black_box(fragment)));
            }
        });
    });

    for (name, policy) in [("process_rotate", &rotate), ("process_relocate", &relocate)] {
        group.bench_with_input(BenchmarkId::new("operation", name), &fragments, |b, fragments| {
            b.iter(|| {
                for fragment in fragments {
                    let _ = black_box(pipeline.process(black_box(fragment), policy));
                }
            });
        });
    }

    group.finish();
}

/// Many requests under one root: the root is parsed once, each call pays only
/// for its own fragment.
fn bench_repeated_operations(c: &mut Criterion) {
    let pipeline: Pipeline<BenchRoot> = Pipeline::try_new(ROOT).expect("valid root");
    let request_count = 100;
    let fragment = "existing/file1.txt";

    let mut group = c.benchmark_group("repeated_operations");
    group.throughput(Throughput::Elements(request_count));

    group.bench_function("resolve_100x", |b| {
        b.iter(|| {
            for _ in 0..request_count {
                let _ = black_box(pipeline.resolve(black_box(fragment)));
            }
        });
    });

    group.bench_function("safe_path_join_100x", |b| {
        let base = pipeline.resolve("existing").expect("inside root");
        b.iter(|| {
            for _ in 0..request_count {
                let _ = black_box(base.sandbox_join(black_box("file1.txt")));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_naive_prefix,
    bench_normalize,
    bench_resolve_and_validate,
    bench_pipeline_operations,
    bench_repeated_operations
);
criterion_main!(benches);
