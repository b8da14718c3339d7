use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ordtree::Map;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn rng() -> StdRng { StdRng::seed_from_u64(0x0dd5_eed5) }

fn random_map(n: usize, rng: &mut StdRng) -> Map<usize, usize> {
    let mut map = Map::with_capacity(n);

    for _ in 0..n {
        let i = rng.gen_range(0..n);
        map.insert(i, i);
    }

    map
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for n in [100, 10_000] {
        group.bench_function(BenchmarkId::new("rand", n), |b| {
            let mut rng = rng();
            let mut map = random_map(n, &mut rng);

            b.iter(|| {
                let k = rng.gen_range(0..n);
                map.insert(k, k);
                map.erase(&k);
            });

            black_box(map);
        });
    }

    // Ascending keys degenerate the tree into a chain.
    for n in [100, 1_000] {
        group.bench_function(BenchmarkId::new("seq", n), |b| {
            let mut map = Map::new();
            for i in 0..n { map.insert(i * 2, i * 2); }

            let mut i = 1;

            b.iter(|| {
                map.insert(i, i);
                map.erase(&i);
                i = (i + 2) % (n * 2);
            });

            black_box(map);
        });
    }

    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");

    for n in [100, 10_000] {
        group.bench_function(BenchmarkId::new("rand", n), |b| {
            let mut rng = rng();
            let mut keys: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

            let mut map = Map::new();
            for &k in &keys { map.insert(k, k); }

            keys.shuffle(&mut rng);

            let mut i = 0;

            b.iter(|| {
                let t = map.get(&keys[i]);
                i = (i + 1) % n;
                black_box(t);
            });
        });

        group.bench_function(BenchmarkId::new("lower_bound", n), |b| {
            let mut rng = rng();
            let map = random_map(n, &mut rng);

            b.iter(|| black_box(map.lower_bound(&rng.gen_range(0..n)).entry()));
        });
    }

    group.finish();
}

fn bench_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("iter");

    for n in [100, 1_000, 100_000] {
        let mut rng = rng();
        let map: Map<u32, u32> = (0..n).map(|_| (rng.gen(), rng.gen())).collect();

        group.bench_function(BenchmarkId::new("iter", n), |b| {
            b.iter(|| {
                for entry in map.iter() {
                    black_box(entry);
                }
            });
        });

        group.bench_function(BenchmarkId::new("cursor", n), |b| {
            b.iter(|| {
                let mut cursor = map.begin();

                while let Some(entry) = cursor.entry() {
                    black_box(entry);
                    cursor.move_next();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_find, bench_iter);
criterion_main!(benches);
