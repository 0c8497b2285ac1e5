use core::hash::BuildHasher;
use core::hash::Hash;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownMap;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use siphasher::sip::SipHasher;
use tri_table::HashComparer;
use tri_table::HashTable;

#[derive(Clone, Copy, Default)]
struct SipBuilder;

impl BuildHasher for SipBuilder {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new_with_keys(0x5eed, 0xcafe)
    }
}

type TriTable<K> = HashTable<K, u64, HashComparer<SipBuilder>>;

trait BenchKey: Clone + Hash + Eq {
    fn new(key: u64) -> Self;
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct SmallKey(u64);

impl BenchKey for SmallKey {
    fn new(key: u64) -> Self {
        black_box(Self(key))
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct StringKey(String);

impl BenchKey for StringKey {
    fn new(key: u64) -> Self {
        black_box(Self(format!("key_{:016X}", key)))
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 11),
    (1 << 12),
    (1 << 13),
    (1 << 14),
    (1 << 15),
    (1 << 16),
];

fn new_table<K>(slots: usize) -> TriTable<K> {
    HashTable::with_capacity(slots, HashComparer::new(SipBuilder))
}

fn new_hashbrown<K>(capacity: usize) -> HashbrownMap<K, u64, SipBuilder> {
    HashbrownMap::with_capacity_and_hasher(capacity, SipBuilder)
}

/// Number of entries a table with `slots` slots holds without growing.
fn fill_for(slots: usize) -> usize {
    new_table::<u64>(slots).growth_threshold()
}

fn random_keys<K: BenchKey>(count: usize) -> Vec<K> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| K::new(rng.try_next_u64().unwrap()))
        .collect()
}

fn sequential_keys<K: BenchKey>(count: usize) -> Vec<K> {
    (0..count as u64).map(K::new).collect()
}

fn group_name<K>(name: &str) -> String {
    format!("{}_{}", name, core::any::type_name::<K>())
}

fn bench_insert_random<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("insert_random"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let count = fill_for(size);
        let keys = random_keys::<K>(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("tri_table/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut table = new_table(0);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(table.add(key, i as u64).unwrap());
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut table = new_hashbrown(0);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(table.insert(key, i as u64));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_insert_preallocated<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("insert_preallocated"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let count = fill_for(size);
        let keys = random_keys::<K>(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("tri_table/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut table = new_table(size);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(table.add(key, i as u64).unwrap());
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || keys.clone(),
                |keys| {
                    let mut table = new_hashbrown(count);
                    for (i, key) in keys.into_iter().enumerate() {
                        black_box(table.insert(key, i as u64));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("find_hit"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let count = fill_for(size);
        let mut keys = sequential_keys::<K>(count);

        let mut ours = new_table(size);
        let mut theirs = new_hashbrown(count);
        for (i, key) in keys.iter().enumerate() {
            ours.add(key.clone(), i as u64).unwrap();
            theirs.insert(key.clone(), i as u64);
        }
        keys.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("tri_table/{size}"), |b| {
            b.iter(|| {
                for key in &keys {
                    black_box(ours.try_get(key));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &keys {
                    black_box(theirs.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_find_miss<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("find_miss"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let count = fill_for(size);
        let present = sequential_keys::<K>(count);
        let absent = (count as u64..2 * count as u64)
            .map(K::new)
            .collect::<Vec<_>>();

        let mut ours = new_table(size);
        let mut theirs = new_hashbrown(count);
        for (i, key) in present.into_iter().enumerate() {
            ours.add(key.clone(), i as u64).unwrap();
            theirs.insert(key, i as u64);
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("tri_table/{size}"), |b| {
            b.iter(|| {
                for key in &absent {
                    black_box(ours.try_get(key));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &absent {
                    black_box(theirs.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("remove"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let count = fill_for(size);
        let keys = sequential_keys::<K>(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("tri_table/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut table = new_table(size);
                    for (i, key) in keys.iter().enumerate() {
                        table.add(key.clone(), i as u64).unwrap();
                    }
                    let mut order = keys.clone();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    (table, order)
                },
                |(mut table, order)| {
                    for key in &order {
                        black_box(table.remove(key).unwrap());
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut table = new_hashbrown(count);
                    for (i, key) in keys.iter().enumerate() {
                        table.insert(key.clone(), i as u64);
                    }
                    let mut order = keys.clone();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    (table, order)
                },
                |(mut table, order)| {
                    for key in &order {
                        black_box(table.remove(key));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("iteration"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let count = fill_for(size);
        let mut ours = new_table(size);
        let mut theirs = new_hashbrown(count);
        for (i, key) in random_keys::<K>(count).into_iter().enumerate() {
            ours.add(key.clone(), i as u64).unwrap();
            theirs.insert(key, i as u64);
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("tri_table/{size}"), |b| {
            b.iter(|| black_box(ours.values().sum::<u64>()))
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| black_box(theirs.values().sum::<u64>()))
        });
    }

    group.finish();
}

/// Each key is inserted and then removed again, so the table holds few live
/// entries while tombstones accumulate and get purged.
fn bench_churn<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("churn"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let count = fill_for(size);
        let operations = sequential_keys::<K>(count)
            .into_iter()
            .flat_map(|key| [key.clone(), key])
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(operations.len() as u64));
        group.bench_function(format!("tri_table/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut operations = operations.clone();
                    operations.shuffle(&mut SmallRng::from_os_rng());
                    operations
                },
                |operations| {
                    let mut table = new_table(0);
                    for key in operations {
                        match table.entry(key).unwrap() {
                            tri_table::hash_table::Entry::Vacant(entry) => {
                                black_box(entry.insert(0));
                            }
                            tri_table::hash_table::Entry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut operations = operations.clone();
                    operations.shuffle(&mut SmallRng::from_os_rng());
                    operations
                },
                |operations| {
                    let mut table = new_hashbrown(0);
                    for key in operations {
                        match table.entry(key) {
                            hashbrown::hash_map::Entry::Vacant(entry) => {
                                black_box(entry.insert(0));
                            }
                            hashbrown::hash_map::Entry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

#[derive(Clone, Copy)]
enum Operation {
    Insert(u64),
    Find(u64),
    Remove(u64),
}

/// 50% lookups, 30% inserts, 20% removals over a key space twice the
/// working-set size.
fn bench_mixed_probabilistic<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(group_name::<K>("mixed_probabilistic"));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let count = fill_for(size);
        let key_space = 2 * count as u64;
        let mut rng = SmallRng::from_os_rng();
        let operations = (0..count * 4)
            .map(|_| {
                let key = rng.random_range(0..key_space);
                match rng.random_range(0..10) {
                    0..5 => Operation::Find(key),
                    5..8 => Operation::Insert(key),
                    _ => Operation::Remove(key),
                }
            })
            .collect::<Vec<_>>();
        let keys = sequential_keys::<K>(key_space as usize);

        group.throughput(Throughput::Elements(operations.len() as u64));
        group.bench_function(format!("tri_table/{size}"), |b| {
            b.iter(|| {
                let mut table = new_table(0);
                for op in &operations {
                    match *op {
                        Operation::Insert(k) => {
                            black_box(table.set(keys[k as usize].clone(), k).unwrap());
                        }
                        Operation::Find(k) => {
                            black_box(table.try_get(&keys[k as usize]));
                        }
                        Operation::Remove(k) => {
                            black_box(table.remove(&keys[k as usize]).unwrap());
                        }
                    }
                }
                black_box(table)
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut table = new_hashbrown(0);
                for op in &operations {
                    match *op {
                        Operation::Insert(k) => {
                            black_box(table.insert(keys[k as usize].clone(), k));
                        }
                        Operation::Find(k) => {
                            black_box(table.get(&keys[k as usize]));
                        }
                        Operation::Remove(k) => {
                            black_box(table.remove(&keys[k as usize]));
                        }
                    }
                }
                black_box(table)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_mixed_probabilistic::<SmallKey, 6>,
    bench_mixed_probabilistic::<StringKey, 6>,
    bench_churn::<SmallKey, 6>,
    bench_churn::<StringKey, 6>,
    bench_insert_random::<SmallKey, 6>,
    bench_insert_random::<StringKey, 6>,
    bench_insert_preallocated::<SmallKey, 6>,
    bench_insert_preallocated::<StringKey, 6>,
    bench_find_hit::<SmallKey, 6>,
    bench_find_hit::<StringKey, 6>,
    bench_find_miss::<SmallKey, 6>,
    bench_find_miss::<StringKey, 6>,
    bench_remove::<SmallKey, 6>,
    bench_remove::<StringKey, 6>,
    bench_iteration::<SmallKey, 6>,
    bench_iteration::<StringKey, 6>,
);

criterion_main!(benches);
