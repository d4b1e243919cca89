use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pipeflow::{generate, Collector, Drain, Sorter, ThreadFeeder, ThreadPool};
use rand::Rng;

/// Benchmarks for the fan-out/fan-in hot paths.
///
/// Each iteration spawns real threads and channels on purpose: the setup
/// cost is part of what these components cost in practice.
///
/// To run these, use:
/// ```bash
/// cargo bench -p pipeflow
/// ```
const ITEMS: usize = 1_000;

/// Shared input channel, competitive consumption, varying pool widths.
fn bench_thread_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("thread_pool");
    group.throughput(Throughput::Elements(ITEMS as u64));

    for workers in [1usize, 2, 4] {
        group.bench_function(format!("square/{}", workers), |b| {
            b.iter(|| {
                let pool =
                    ThreadPool::new(|input: Drain<u64>| input.flatten().map(|x| x * x), workers)
                        .unwrap();
                pool.feed(0..ITEMS as u64).unwrap();
                black_box(pool.iter().count());
            })
        });
    }
    group.finish();
}

/// Unordered fan-in of two feeders over a random payload.
fn bench_collector(c: &mut Criterion) {
    let mut rng = rand::rng();
    let payload: Vec<u64> = (0..ITEMS).map(|_| rng.random_range(0..1_000_000)).collect();

    let mut group = c.benchmark_group("collector");
    group.throughput(Throughput::Elements(ITEMS as u64));
    group.bench_function("fan_in_2", |b| {
        b.iter(|| {
            let half = payload.len() / 2;
            let left = payload[..half].to_vec();
            let right = payload[half..].to_vec();
            let a = ThreadFeeder::spawn(move || left).unwrap();
            let b_feeder = ThreadFeeder::spawn(move || right).unwrap();

            let collector = Collector::new();
            collector.attach(&a);
            collector.attach(&b_feeder);
            black_box(collector.count());
        })
    });
    group.finish();
}

/// K-way merge of four interleaved arithmetic sequences.
fn bench_sorter(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorter");
    group.throughput(Throughput::Elements(ITEMS as u64));
    group.bench_function("merge_4_sources", |b| {
        b.iter(|| {
            let sorter = Sorter::new();
            let feeders: Vec<_> = (0..4u64)
                .map(|lane| {
                    ThreadFeeder::spawn(move || generate::seq(lane, 4).take(ITEMS / 4)).unwrap()
                })
                .collect();
            for feeder in &feeders {
                sorter.attach(feeder).unwrap();
            }
            black_box(sorter.iter().unwrap().count());
        })
    });
    group.finish();
}

criterion_group!(benches, bench_thread_pool, bench_collector, bench_sorter);
criterion_main!(benches);
