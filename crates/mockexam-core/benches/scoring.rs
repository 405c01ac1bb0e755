use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mockexam_core::mock::sample_bank;
use mockexam_core::scoring::{calculate_results, percentage};
use mockexam_core::shuffle::{prepare_bank, Shuffler};

fn bench_prepare_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare_bank");

    for size in [100usize, 1_000, 10_000] {
        let bank = sample_bank(size);
        group.bench_function(format!("seeded/{size}"), |b| {
            b.iter(|| {
                let mut shuffler = Shuffler::seeded(42);
                prepare_bank(black_box(bank.clone()), &mut shuffler, 100)
            })
        });
    }

    group.finish();
}

fn bench_calculate_results(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_results");
    let bank = sample_bank(100);

    group.bench_function("all_answered", |b| {
        let answers: BTreeMap<usize, String> = (0..100)
            .map(|i| (i, if i % 2 == 0 { "A" } else { "B" }.to_string()))
            .collect();
        b.iter(|| calculate_results(black_box(&bank), black_box(&answers)))
    });

    group.bench_function("none_answered", |b| {
        let answers = BTreeMap::new();
        b.iter(|| calculate_results(black_box(&bank), black_box(&answers)))
    });

    group.bench_function("percentage", |b| {
        b.iter(|| percentage(black_box(63), black_box(100)))
    });

    group.finish();
}

criterion_group!(benches, bench_prepare_bank, bench_calculate_results);
criterion_main!(benches);
