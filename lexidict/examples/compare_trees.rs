//! Print the insert/search/traverse comparison table for each dataset size.
//!
//! Build with `--release`; debug timings are not meaningful.

use lexidict::bench;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("BENCHMARK: BST vs AVL vs TBT");
    println!("Word order: pseudo-random (seeded shuffle)\n");

    for report in bench::run_all() {
        println!("{report}");
    }

    println!("BST - unbalanced; height follows insertion order, O(n) on sorted input.");
    println!("AVL - self-balancing; height stays O(log n) at the cost of rotations.");
    println!("TBT - threaded; traversal needs no stack, delete rebuilds the tree.");
}
