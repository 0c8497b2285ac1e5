// Model-based property tests for HashTable.
//
// Model: std HashMap<u16, u32> holding exactly the live entries.
// Operations: add, set, remove, get/try_get, entry upsert, retain, shrink,
// shrink_to, reserve, clear.
// Invariants after every step:
//  - len() and contents match the model;
//  - capacity is a power of two, at least 4;
//  - used_count() == len() + deleted_count() and used_count() < capacity();
//  - a fresh cursor visits exactly len() entries.
use std::collections::HashMap as ModelMap;

use proptest::prelude::*;
use tri_table::Comparer;
use tri_table::HashTable;
use tri_table::error::Error;

/// Buckets keys into only a handful of hashes so probe chains and
/// tombstones pile up.
struct Clustered {
    buckets: u64,
}

impl Comparer<u16> for Clustered {
    fn hash(&self, key: &u16) -> u64 {
        (*key as u64 % self.buckets).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    fn equals(&self, a: &u16, b: &u16) -> bool {
        a == b
    }
}

fn check_consistent(
    table: &HashTable<u16, u32, Clustered>,
    model: &ModelMap<u16, u32>,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(table.len(), model.len());
    prop_assert!(table.capacity().is_power_of_two());
    prop_assert!(table.capacity() >= 4);
    prop_assert_eq!(table.used_count(), table.len() + table.deleted_count());
    prop_assert!(table.used_count() < table.capacity());

    for (k, v) in model {
        prop_assert_eq!(table.try_get(k), Some(v));
    }

    let mut cursor = table.cursor();
    let mut visited = 0;
    while let Some((k, v)) = cursor.advance(table).expect("table not modified") {
        prop_assert_eq!(model.get(k), Some(v));
        visited += 1;
    }
    prop_assert_eq!(visited, model.len());
    Ok(())
}

proptest! {
    #[test]
    fn prop_table_matches_model(
        buckets in 1u64..=64,
        initial in 0usize..64,
        ops in proptest::collection::vec((0u8..=9u8, 0u16..256u16, any::<u32>()), 1..400),
    ) {
        let mut table = HashTable::with_capacity(initial, Clustered { buckets });
        let mut model = ModelMap::new();

        for (op, key, value) in ops {
            match op {
                0 => {
                    let result = table.add(key, value).map(|v| *v);
                    if model.contains_key(&key) {
                        prop_assert_eq!(result, Err(Error::DuplicateKey));
                    } else {
                        prop_assert_eq!(result, Ok(value));
                        model.insert(key, value);
                    }
                }
                1 => {
                    prop_assert_eq!(table.set(key, value), Ok(model.insert(key, value)));
                }
                2 => {
                    prop_assert_eq!(table.remove(&key), Ok(model.remove(&key).is_some()));
                }
                3 => {
                    let expected = model.get(&key);
                    prop_assert_eq!(table.try_get(&key), expected);
                    prop_assert_eq!(table.get(&key).ok(), expected);
                    prop_assert_eq!(table.contains(&key), Ok(expected.is_some()));
                }
                4 => {
                    let entry = table.entry(key).unwrap().or_insert(0);
                    *entry = entry.wrapping_add(value);
                    let slot = model.entry(key).or_insert(0);
                    *slot = slot.wrapping_add(value);
                }
                5 => {
                    let parity = key % 2;
                    table.retain(|k, _| k % 2 != parity);
                    model.retain(|k, _| k % 2 != parity);
                }
                6 => {
                    table.shrink();
                    prop_assert_eq!(table.deleted_count(), 0);
                }
                7 => {
                    let target = key as usize;
                    let before = table.capacity();
                    let result = table.shrink_to(target);
                    if target < model.len() {
                        prop_assert_eq!(
                            result,
                            Err(Error::InvalidArgument { requested: target, len: model.len() })
                        );
                        prop_assert_eq!(table.capacity(), before);
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        prop_assert!(table.capacity() <= before);
                    }
                }
                8 => {
                    let target = key as usize;
                    table.reserve(target);
                    prop_assert!(table.capacity() >= target);
                }
                9 => {
                    if value % 16 == 0 {
                        table.clear();
                        model.clear();
                        prop_assert_eq!(table.used_count(), 0);
                    }
                }
                _ => unreachable!(),
            }

            check_consistent(&table, &model)?;
        }
    }

    #[test]
    fn prop_cursor_detects_structural_changes(
        keys in proptest::collection::hash_set(0u16..1000, 1..50),
        overwrite in any::<bool>(),
    ) {
        let mut table = HashTable::new(Clustered { buckets: 1 << 20 });
        for &k in &keys {
            table.add(k, k as u32).unwrap();
        }

        let present = *keys.iter().next().unwrap();
        let mut cursor = table.cursor();
        let version = table.version();
        if overwrite {
            // No tombstones here, so only growth can rehash during `set`.
            let capacity = table.capacity();
            table.set(present, 0).unwrap();
            if table.capacity() == capacity {
                prop_assert_eq!(table.version(), version);
                prop_assert!(cursor.advance(&table).is_ok());
            } else {
                prop_assert_eq!(table.capacity(), capacity * 2);
                prop_assert_eq!(
                    cursor.advance(&table),
                    Err(Error::ConcurrentModification { expected: version, found: version + 1 })
                );
            }
        } else {
            table.remove(&present).unwrap();
            prop_assert_eq!(
                cursor.advance(&table),
                Err(Error::ConcurrentModification { expected: version, found: version + 1 })
            );
        }
    }

    #[test]
    fn prop_churn_never_grows(rounds in 1usize..2000, live in 1usize..8) {
        let mut table = HashTable::with_capacity(16, Clustered { buckets: 7 });
        let capacity = table.capacity();
        for i in 0..rounds {
            table.add(i as u16, 0).unwrap();
            if i >= live {
                prop_assert_eq!(table.remove(&((i - live) as u16)), Ok(true));
            }
        }
        prop_assert_eq!(table.capacity(), capacity);
        prop_assert!(table.len() <= live);
    }
}
