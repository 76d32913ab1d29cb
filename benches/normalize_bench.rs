// SPDX-License-Identifier: MIT OR Apache-2.0
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rpcerr_normalize::{Arg, Metadata, RpcError, SourceError, Slots, create};
use serde_json::json;

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    group.bench_function("message_code", |b| {
        b.iter(|| Slots::classify(black_box("Boom".into()), black_box(Arg::Int(3)), Arg::Absent))
    });

    let mapping: Arg = json!({ "foo": "bar" }).into();
    group.bench_function("mapping_first", |b| {
        b.iter(|| Slots::classify(black_box(mapping.clone()), Arg::Absent, Arg::Absent))
    });

    group.finish();
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    group.bench_function("message_only", |b| {
        b.iter(|| create(black_box("Boom"), Arg::Absent, Arg::Absent))
    });

    let raw = json!({ "ERROR_CODE": "INVALID_TOKEN", "retry_after": 30 });
    group.bench_function("message_code_mapping", |b| {
        b.iter(|| create(black_box("Boom"), black_box(2000), black_box(raw.clone())))
    });

    let mut md = Metadata::new();
    md.set("foo", "bar").unwrap();
    let existing = RpcError::new("Boom").with_code(1000).with_metadata_handle(md);
    let source = SourceError::capture(&existing);
    group.bench_function("seed_and_merge", |b| {
        b.iter(|| {
            create(
                black_box(source.clone()),
                black_box(2000),
                black_box(raw.clone()),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_create);
criterion_main!(benches);
