use criterion::{black_box, criterion_group, criterion_main, Criterion};
use joinsample::{
    AgmEvaluator, BoundStrategy, BoxSplitter, DomainBox, LinearScan, OrderStatisticStore, Query,
    RangeCounter, Relation, Sampler, SortedIndex,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// R1(A, B) ⋈ R2(B, C) with `n` random tuples each over `0..range`.
fn random_query(n: usize, range: i64, seed: u64) -> Query {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = || {
        (0..n)
            .map(|_| vec![rng.random_range(0..range), rng.random_range(0..range)])
            .collect::<Vec<_>>()
    };
    let r1 = Relation::new("R1", &["A", "B"], rows()).expect("r1");
    let r2 = Relation::new("R2", &["B", "C"], rows()).expect("r2");
    Query::new(vec![r1, r2], vec![1.0, 1.0]).expect("query")
}

fn bench_order_stat(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_stat");
    let sizes = [1_000, 10_000, 100_000];

    for &size in &sizes {
        group.bench_function(format!("sorted_insert_median_n{}", size), |b| {
            b.iter(|| {
                let store: OrderStatisticStore = (0..size as i64).collect();
                black_box(store.median().ok());
            })
        });
    }
    group.finish();
}

fn bench_range_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_count");
    let q = random_query(10_000, 1_000, 1);
    let region = DomainBox::from_bounds(&[(100, 200), (0, 999), (0, 999)]).expect("box");
    let index = SortedIndex::build(&q);

    group.bench_function("linear_scan_n10000", |b| {
        b.iter(|| black_box(LinearScan.count(&q, 0, black_box(&region))))
    });
    group.bench_function("sorted_index_n10000", |b| {
        b.iter(|| black_box(index.count(&q, 0, black_box(&region))))
    });
    group.finish();
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");
    let sizes = [100, 1_000];

    for &size in &sizes {
        let q = random_query(size, 100, 2);
        let agm = AgmEvaluator::new(BoundStrategy::Unweighted);
        let region = DomainBox::uniform(3, 0, 99).expect("box");
        group.bench_function(format!("split_n{}", size), |b| {
            b.iter(|| {
                let splitter = BoxSplitter::new(&q, &agm);
                black_box(splitter.split(0, black_box(&region)).ok());
            })
        });
    }
    group.finish();
}

fn bench_trial(c: &mut Criterion) {
    let mut group = c.benchmark_group("trial");
    let sizes = [100, 1_000];

    for &size in &sizes {
        let q = random_query(size, 100, 3);
        let domain = DomainBox::uniform(3, 0, 99).expect("box");
        let scan = Sampler::new(&q, domain.clone()).expect("sampler");
        let indexed = Sampler::with_evaluator(
            &q,
            domain,
            AgmEvaluator::with_counter(SortedIndex::build(&q), BoundStrategy::Unweighted),
        )
        .expect("sampler");
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        group.bench_function(format!("scan_n{}", size), |b| {
            b.iter(|| black_box(scan.sample_with_rng(&mut rng).ok()))
        });
        group.bench_function(format!("indexed_n{}", size), |b| {
            b.iter(|| black_box(indexed.sample_with_rng(&mut rng).ok()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_order_stat, bench_range_count, bench_split, bench_trial);
criterion_main!(benches);
