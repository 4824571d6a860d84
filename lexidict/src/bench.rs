//! Side-by-side timing of the three trees on one deterministic workload.
//!
//! Each run inserts `n` shuffled `wdNNNNN` records into a fresh tree of each
//! kind, then times repeated random lookups and one full in-order traversal.
//! Wall-clock numbers here are for a quick table; the criterion benches in
//! `benches/` are the ones to trust.

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use lexitree::{BalancedTree, OrderedDictionary, Record, ThreadedTree, UnbalancedTree};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Dataset sizes used by [`run_all`].
pub const BENCH_SIZES: [usize; 3] = [500, 2_000, 5_000];

/// Lookups timed per tree.
pub const SEARCH_REPS: usize = 1_000;

const SHUFFLE_SEED: u64 = 42;
const SEARCH_SEED: u64 = 99;

/// The workload word for index `i` (0-based): `wd00001`, `wd00002`, ...
pub fn workload_key(i: usize) -> String {
    format!("wd{:05}", i + 1)
}

/// `n` records keyed `wd00001..`, frequency `1 + i % 100`, in a shuffled order
/// that is the same on every run.
pub fn workload(n: usize) -> Vec<Record> {
    let mut records: Vec<Record> = (0..n)
        .map(|i| {
            Record::new(&workload_key(i))
                .with_part_of_speech("noun")
                .with_frequency(1 + (i % 100) as u32)
        })
        .collect();
    records.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));
    records
}

/// `reps` keys drawn uniformly from a workload of size `n`.
pub fn search_keys(n: usize, reps: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(SEARCH_SEED);
    (0..reps).map(|_| workload_key(rng.gen_range(0..n))).collect()
}

/// Timings for one tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeTimings {
    pub insert: Duration,
    /// `None` where the tree does not report a height.
    pub height: Option<usize>,
    pub search: Duration,
    /// Lookups that found their key. Always `search_reps` on a correct tree.
    pub hits: usize,
    pub traverse: Duration,
}

#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub size: usize,
    pub search_reps: usize,
    pub unbalanced: TreeTimings,
    pub balanced: TreeTimings,
    pub threaded: TreeTimings,
}

/// Benchmark one dataset size with [`SEARCH_REPS`] lookups.
pub fn run(n: usize) -> BenchmarkReport {
    run_with(n, SEARCH_REPS)
}

pub fn run_with(n: usize, search_reps: usize) -> BenchmarkReport {
    let records = workload(n);
    let keys = search_keys(n, search_reps);
    BenchmarkReport {
        size: n,
        search_reps,
        unbalanced: measure(&records, &keys, |t: &UnbalancedTree| Some(t.height())),
        balanced: measure(&records, &keys, |t: &BalancedTree| Some(t.height())),
        threaded: measure(&records, &keys, |_: &ThreadedTree| None),
    }
}

/// One report per entry of [`BENCH_SIZES`].
pub fn run_all() -> Vec<BenchmarkReport> {
    BENCH_SIZES.iter().map(|&n| run(n)).collect()
}

fn measure<T>(records: &[Record], keys: &[String], height: impl Fn(&T) -> Option<usize>) -> TreeTimings
where
    T: OrderedDictionary + Default,
{
    let mut tree = T::default();
    let start = Instant::now();
    for record in records {
        tree.insert(record.clone());
    }
    let insert = start.elapsed();

    let start = Instant::now();
    let mut hits = 0;
    for key in keys {
        if black_box(tree.search(key)).is_some() {
            hits += 1;
        }
    }
    let search = start.elapsed();

    let start = Instant::now();
    let mut visited = 0usize;
    tree.traverse_in_order(&mut |r| {
        black_box(r);
        visited += 1;
    });
    let traverse = start.elapsed();
    debug_assert_eq!(visited, tree.len());

    TreeTimings {
        insert,
        height: height(&tree),
        search,
        hits,
        traverse,
    }
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = [&self.unbalanced, &self.balanced, &self.threaded];
        let sep = "  ------------------------+-----------+-----------+-----------";

        writeln!(f, "  {:<24}|  {:>8} |  {:>8} |  {:>8}", "Dataset: words", "BST", "AVL", "TBT")?;
        writeln!(
            f,
            "  {:<24}|  {:>8} |  {:>8} |  {:>8}",
            "Size (words)", self.size, self.size, self.size
        )?;
        writeln!(f, "{sep}")?;

        let row = |f: &mut fmt::Formatter<'_>, label: &str, pick: fn(&TreeTimings) -> Duration| {
            writeln!(
                f,
                "  {:<24}|  {:>8.3} |  {:>8.3} |  {:>8.3}",
                label,
                ms(pick(cols[0])),
                ms(pick(cols[1])),
                ms(pick(cols[2]))
            )
        };
        row(f, "Bulk insert (ms)", |t| t.insert)?;

        let height = |t: &TreeTimings| t.height.map_or_else(|| "n/a".to_string(), |h| h.to_string());
        writeln!(
            f,
            "  {:<24}|  {:>8} |  {:>8} |  {:>8}",
            "Tree height",
            height(cols[0]),
            height(cols[1]),
            height(cols[2])
        )?;

        row(f, &format!("Search x{} (ms)", self.search_reps), |t| t.search)?;
        row(f, "Traverse full (ms)", |t| t.traverse)?;
        writeln!(f, "{sep}")
    }
}
