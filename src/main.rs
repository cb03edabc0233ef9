use std::collections::BTreeMap as StdBTreeMap;
use std::time::Instant;

use avl_tree::AvlTree;
use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fills an AVL tree with random keys, cross-checks it against
/// `std::collections::BTreeMap` and reports timings.
#[derive(Parser, Debug)]
struct Args {
    /// Number of random inserts.
    #[arg(long, default_value_t = 100_000)]
    count: usize,

    /// Seed for the key generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Keys are drawn from `0..key_range`.
    #[arg(long = "key-range", default_value_t = u32::MAX)]
    key_range: u32,

    /// Fraction of the inserted keys removed afterwards.
    #[arg(long = "remove-ratio", default_value_t = 0.5)]
    remove_ratio: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.remove_ratio) {
        return Err(format!("--remove-ratio must be within 0..=1, got {}", args.remove_ratio).into());
    }
    if args.key_range == 0 {
        return Err("--key-range must be positive".into());
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let keys: Vec<u32> = (0..args.count)
        .map(|_| rng.gen_range(0..args.key_range))
        .collect();
    let removals = (keys.len() as f64 * args.remove_ratio) as usize;

    let start = Instant::now();
    let mut tree = AvlTree::new();
    for &k in &keys {
        tree.insert(k, k.wrapping_add(1));
    }
    for k in &keys[..removals] {
        tree.remove(k);
    }
    let our_time = start.elapsed();

    let start = Instant::now();
    let mut std_map = StdBTreeMap::new();
    for &k in &keys {
        std_map.insert(k, k.wrapping_add(1));
    }
    for k in &keys[..removals] {
        std_map.remove(k);
    }
    let std_time = start.elapsed();

    if !tree.iter().eq(std_map.iter()) {
        return Err("AVL tree contents diverged from std::collections::BTreeMap".into());
    }
    if !tree.is_balanced() {
        return Err("AVL tree lost its height balance".into());
    }
    let bound = 1.4405 * ((tree.len() + 2) as f64).log2();
    if tree.height() as f64 > bound {
        warn!("height {} exceeds the AVL bound {:.2}", tree.height(), bound);
    }

    info!(
        "{} inserts, {} removes, {} entries left, height {}",
        keys.len(),
        removals,
        tree.len(),
        tree.height()
    );
    println!("Our AvlTree:   {:?}", our_time);
    println!("Std BTreeMap:  {:?}", std_time);
    Ok(())
}
