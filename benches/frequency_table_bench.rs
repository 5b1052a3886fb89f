use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use freq_table::{FrequencyTable, TableConfig};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

// Zipf-ish word pairs: small vocabulary, so many merges alongside new keys.
fn pair(n: u64) -> String {
    format!("w{} w{}", n % 512, (n >> 20) % 64)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("frequency_table::insert");
    group.throughput(Throughput::Elements(100_000));
    group.bench_function("pairs_100k_from_default", |b| {
        let keys: Vec<String> = lcg(1).take(100_000).map(pair).collect();
        b.iter_batched(
            || (FrequencyTable::with_config(TableConfig::default()).unwrap(), keys.clone()),
            |(mut t, keys)| {
                for k in keys {
                    t.insert(k).unwrap();
                }
                black_box(t)
            },
            BatchSize::LargeInput,
        )
    });
    group.bench_function("distinct_100k_from_one_bucket", |b| {
        b.iter_batched(
            || FrequencyTable::new(1).unwrap(),
            |mut t| {
                for x in lcg(7).take(100_000) {
                    t.insert(x.to_le_bytes().to_vec()).unwrap();
                }
                black_box(t)
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

fn bench_ranked_dump(c: &mut Criterion) {
    let mut t = FrequencyTable::new(10).unwrap();
    for x in lcg(11).take(200_000) {
        t.insert(pair(x)).unwrap();
    }
    c.bench_function("frequency_table::ranked_dump_all", |b| {
        b.iter(|| black_box(t.ranked_dump(None).len()))
    });
    c.bench_function("frequency_table::ranked_dump_top_10", |b| {
        b.iter(|| black_box(t.ranked_dump(Some(10)).len()))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_ranked_dump
}
criterion_main!(benches);
