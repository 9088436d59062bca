// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use criterion::*;
use libdd_profiling_sampler::collections::StringTable;

fn symbol_names() -> Vec<String> {
    // A mix of repeats and unique names, like symbols across many stacks.
    (0..4096)
        .map(|n| format!("module_{}.function_{}", n % 97, n % 389))
        .collect()
}

pub fn bench_interning(c: &mut Criterion) {
    let names = symbol_names();
    c.bench_function("string_table_intern_4096", |b| {
        b.iter(|| {
            let mut table = StringTable::new();
            for name in names.iter() {
                black_box(table.intern(name));
            }
            black_box(table.len())
        })
    });
}

criterion_group!(benches, bench_interning);
