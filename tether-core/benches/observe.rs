//! Benchmarks for instrumentation and notification.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::json;
use tether_core::{Object, Runtime, Value, Watcher};

fn wide_object(keys: usize) -> Object {
    (0..keys).map(|i| (format!("k{i}"), i as f64)).collect()
}

fn bench_observe(c: &mut Criterion) {
    let mut group = c.benchmark_group("observe");

    group.bench_function("wide_object_100", |b| {
        let runtime = Runtime::new();
        b.iter_batched(
            || Value::from(wide_object(100)),
            |value| black_box(runtime.observe(&value, false)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("nested_json", |b| {
        let runtime = Runtime::new();
        let source = json!({
            "user": { "name": "ada", "roles": ["admin", "dev"] },
            "items": [{ "id": 1 }, { "id": 2 }, { "id": 3 }],
        });
        b.iter_batched(
            || Value::from(source.clone()),
            |value| black_box(runtime.observe(&value, false)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let runtime = Runtime::new();
    let state: Object = [("count", 0)].into_iter().collect();
    runtime.observable(state.clone());

    let watchers: Vec<Watcher> = (0..32)
        .map(|_| {
            let watcher = Watcher::new(&runtime, || {});
            watcher.track(|| state.get("count"));
            watcher
        })
        .collect();

    let mut n = 0.0;
    c.bench_function("write_notify_32", |b| {
        b.iter(|| {
            n += 1.0;
            state.set("count", black_box(n));
        })
    });

    drop(watchers);
}

fn bench_read(c: &mut Criterion) {
    let runtime = Runtime::new();
    let state = runtime.observable(Value::from(json!({ "a": { "b": [1, 2, 3] } })));
    let Some(state) = state.as_object().cloned() else {
        return;
    };

    c.bench_function("tracked_nested_read", |b| {
        let watcher = Watcher::new(&runtime, || {});
        b.iter(|| {
            watcher.track(|| {
                let a = state.get("a").unwrap_or_default();
                black_box(a.as_object().and_then(|a| a.get("b")))
            })
        })
    });
}

fn bench_list(c: &mut Criterion) {
    let runtime = Runtime::new();
    c.bench_function("list_push_observed", |b| {
        b.iter_batched(
            || runtime.observable(Value::from(json!([]))),
            |value| {
                if let Some(list) = value.as_list() {
                    for i in 0..64 {
                        list.push([Value::from(i)]);
                    }
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_observe, bench_read, bench_write, bench_list);
criterion_main!(benches);
