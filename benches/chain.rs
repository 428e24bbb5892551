// SPDX-License-Identifier: MIT OR Apache-2.0
#![allow(missing_docs)]
#![allow(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use delve::{Json, LazyDecode, Strategy, path};
use serde_json::json;

fn document() -> Json {
    Json::new(json!({"user": {"id": 200, "name": "ada", "roles": ["admin", "dev"]}}))
}

fn bench_chain(c: &mut Criterion) {
    let json = document();

    let mut group = c.benchmark_group("chain");

    group.bench_function("eager_decode", |b| {
        b.iter(|| black_box(json.decode::<i64>(path!["user", "id"]).map(|id| id * 2)));
    });

    for strategy in [Strategy::Cached, Strategy::Uncached] {
        let name = format!("{strategy:?}").to_lowercase();

        group.bench_function(format!("build_and_eval_{name}"), |b| {
            b.iter(|| {
                let chain = json
                    .decoded_with::<i64>(path!["user", "id"], strategy)
                    .map(|id| id * 2)
                    .filter(|id| *id > 0)
                    .recover_value(0);
                black_box(chain.get())
            });
        });

        let chain = json
            .decoded_with::<Vec<String>>(path!["user", "roles"], strategy)
            .map(|roles| roles.join(","));
        group.bench_function(format!("reread_{name}"), |b| {
            b.iter(|| black_box(chain.eval()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chain);
criterion_main!(benches);
