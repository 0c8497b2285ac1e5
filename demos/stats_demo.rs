use std::collections::hash_map::DefaultHasher;
use std::hash::BuildHasherDefault;

use clap::Parser;
use tri_table::HashComparer;
use tri_table::HashTable;
use tri_table::LoadFactor;
use tri_table::TableConfig;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Load factor numerator; the denominator is fixed at 100.
    #[arg(short = 'l', long = "load_percent", default_value_t = 80)]
    load_percent: u32,

    /// Percentage of inserted keys to remove again before reporting.
    #[arg(short = 'r', long = "remove_percent", default_value_t = 0)]
    remove_percent: u64,
}

fn main() -> Result<(), tri_table::Error> {
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("debug")).init();
    let args = Args::parse();

    let config = TableConfig::default()
        .with_initial_capacity(args.target_capacity)
        .with_load_factor(LoadFactor::new(args.load_percent, 100)?);
    let comparer = HashComparer::<BuildHasherDefault<DefaultHasher>>::default();
    let mut table: HashTable<u64, u64, _> = HashTable::with_config(config, comparer);

    println!(
        "Created table for {} slots: capacity {}, grows at {} entries",
        args.target_capacity,
        table.capacity(),
        table.growth_threshold()
    );

    let num_values = table.growth_threshold() as u64;
    for value in 0..num_values {
        table.add(value, value)?;
    }

    let removed = num_values * args.remove_percent.min(100) / 100;
    for value in 0..removed {
        table.remove(&value)?;
    }

    println!(
        "Inserted {} values, removed {}; {} live entries",
        num_values,
        removed,
        table.len()
    );
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );

    table.probe_histogram().print();
    table.debug_stats().print();

    let mut cursor = table.cursor();
    let mut visited = 0usize;
    while cursor.advance(&table)?.is_some() {
        visited += 1;
    }
    println!("Cursor visited {} entries", visited);

    Ok(())
}
