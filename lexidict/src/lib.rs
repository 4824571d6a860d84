//! # lexidict
//!
//! A dictionary that keeps the same records in all three `lexitree` trees at
//! once, so their behaviour and cost can be compared on identical data.
//!
//! - [`Dictionary`]: thread-safe facade; every mutation is applied to every
//!   tree, reads can target any one of them.
//! - [`loader`]: word and frequency files in, word file out.
//! - [`bench`]: a deterministic insert/search/traverse comparison.
//!
//! ## Example
//!
//! ```rust
//! use lexidict::{Dictionary, TreeKind};
//! use lexitree::Record;
//!
//! let dict = Dictionary::new();
//! dict.insert(Record::new("apple").with_frequency(95));
//! dict.insert(Record::new("app").with_frequency(10));
//! dict.insert(Record::new("application").with_frequency(50));
//!
//! dict.select("app");
//! let top: Vec<String> = dict
//!     .autocomplete("ap", Some(2))
//!     .into_iter()
//!     .map(|r| r.key().to_string())
//!     .collect();
//! assert_eq!(top, ["apple", "application"]);
//! assert_eq!(dict.stats().threaded.len, 3);
//! assert_eq!(dict.records(TreeKind::Threaded).len(), 3);
//! ```

#![warn(clippy::all)]

pub mod bench;
pub mod config;
pub mod error;
pub mod loader;

pub use config::Config;
pub use error::{DictError, Result};
pub use loader::{FrequencyReport, LoadReport};

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use lexitree::{
    record_selection, BalancedTree, OrderedDictionary, PrefixRanker, Record, ThreadedTree,
    UnbalancedTree,
};
use parking_lot::RwLock;
use tracing::{debug, warn};

/// Selects one of the three trees for a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Unbalanced,
    Balanced,
    Threaded,
}

impl TreeKind {
    pub const ALL: [TreeKind; 3] = [TreeKind::Unbalanced, TreeKind::Balanced, TreeKind::Threaded];

    pub fn name(self) -> &'static str {
        match self {
            TreeKind::Unbalanced => "BST",
            TreeKind::Balanced => "AVL",
            TreeKind::Threaded => "TBT",
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Size and shape of one tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub len: usize,
    /// `None` for the threaded tree, whose height is not tracked.
    pub height: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DictionaryStats {
    pub unbalanced: TreeStats,
    pub balanced: TreeStats,
    pub threaded: TreeStats,
}

/// Thread-safe dictionary mirroring every record into all three trees.
///
/// Locks are always taken in the order unbalanced, balanced, threaded.
/// Records are cloned out of the trees, so no guard outlives a call.
pub struct Dictionary {
    unbalanced: RwLock<UnbalancedTree>,
    balanced: RwLock<BalancedTree>,
    threaded: RwLock<ThreadedTree>,
    len: AtomicUsize,
    config: Config,
}

impl Dictionary {
    /// Create an empty dictionary with default configuration.
    pub fn new() -> Self {
        Self::build(Config::default())
    }

    /// Create an empty dictionary after checking `config`.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: Config) -> Self {
        Self {
            unbalanced: RwLock::new(UnbalancedTree::new()),
            balanced: RwLock::new(BalancedTree::new()),
            threaded: RwLock::new(ThreadedTree::new()),
            len: AtomicUsize::new(0),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` once `max_words` records are held.
    pub fn is_full(&self) -> bool {
        self.len() >= self.config.max_words
    }

    /// Insert `record` into every tree.
    ///
    /// Returns `false` for an empty or duplicate key, or when the dictionary
    /// is full.
    pub fn insert(&self, record: Record) -> bool {
        let mut unbalanced = self.unbalanced.write();
        let mut balanced = self.balanced.write();
        let mut threaded = self.threaded.write();

        if unbalanced.len() >= self.config.max_words {
            warn!(key = record.key(), max_words = self.config.max_words, "dictionary is full");
            return false;
        }
        if !unbalanced.insert(record.clone()) {
            return false;
        }
        let in_balanced = balanced.insert(record.clone());
        let in_threaded = threaded.insert(record);
        debug_assert!(in_balanced && in_threaded, "trees disagree on membership");

        self.len.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Remove `key` from every tree.
    pub fn delete(&self, key: &str) -> Option<Record> {
        let mut unbalanced = self.unbalanced.write();
        let mut balanced = self.balanced.write();
        let mut threaded = self.threaded.write();

        let removed = unbalanced.delete(key)?;
        balanced.delete(key);
        threaded.delete(key);
        self.len.fetch_sub(1, Ordering::Relaxed);
        debug!(key = removed.key(), "deleted");
        Some(removed)
    }

    /// Look `key` up in the balanced tree.
    pub fn get(&self, key: &str) -> Option<Record> {
        self.get_in(TreeKind::Balanced, key)
    }

    pub fn get_in(&self, kind: TreeKind, key: &str) -> Option<Record> {
        self.read(kind, |tree| tree.search(key).cloned())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read(TreeKind::Balanced, |tree| tree.contains(key))
    }

    /// Best matches for `prefix` from the balanced tree.
    ///
    /// `top_k` defaults to `top_k_default` and is capped at `top_k_max`.
    pub fn autocomplete(&self, prefix: &str, top_k: Option<usize>) -> Vec<Record> {
        self.autocomplete_in(TreeKind::Balanced, prefix, top_k)
    }

    pub fn autocomplete_in(&self, kind: TreeKind, prefix: &str, top_k: Option<usize>) -> Vec<Record> {
        let top_k = self.config.top_k(top_k);
        let ranker = PrefixRanker::with_candidate_limit(self.config.candidate_limit);
        self.read(kind, |tree| {
            ranker
                .rank_prefix(tree, prefix, top_k)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Count one user pick of `key`. Returns the number of trees updated:
    /// 3 when present, 0 otherwise.
    pub fn select(&self, key: &str) -> usize {
        let mut unbalanced = self.unbalanced.write();
        let mut balanced = self.balanced.write();
        let mut threaded = self.threaded.write();
        record_selection(key, &mut [&mut *unbalanced, &mut *balanced, &mut *threaded])
    }

    /// Set the frequency of `key` in every tree, clamped the way loaded
    /// scores are. Returns `false` if the key is absent.
    pub fn set_frequency(&self, key: &str, raw: i64) -> bool {
        let score = self.config.clamp_frequency(raw);
        let mut unbalanced = self.unbalanced.write();
        let mut balanced = self.balanced.write();
        let mut threaded = self.threaded.write();

        let trees: [&mut dyn OrderedDictionary; 3] = [&mut *unbalanced, &mut *balanced, &mut *threaded];
        let mut updated = false;
        for tree in trees {
            if let Some(mut record) = tree.search_mut(key) {
                record.set_frequency_score(score);
                updated = true;
            }
        }
        updated
    }

    /// Every record of one tree, in key order.
    pub fn records(&self, kind: TreeKind) -> Vec<Record> {
        self.read(kind, |tree| {
            let mut out = Vec::with_capacity(tree.len());
            tree.traverse_in_order(&mut |r| out.push(r.clone()));
            out
        })
    }

    /// Records in unbalanced-tree pre-order. Re-inserting them in this order
    /// rebuilds the same unbalanced shape.
    pub fn records_pre_order(&self) -> Vec<Record> {
        self.unbalanced.read().iter_pre_order().cloned().collect()
    }

    pub fn stats(&self) -> DictionaryStats {
        let unbalanced = self.unbalanced.read();
        let balanced = self.balanced.read();
        let threaded = self.threaded.read();
        DictionaryStats {
            unbalanced: TreeStats {
                len: unbalanced.len(),
                height: Some(unbalanced.height()),
            },
            balanced: TreeStats {
                len: balanced.len(),
                height: Some(balanced.height()),
            },
            threaded: TreeStats {
                len: threaded.len(),
                height: None,
            },
        }
    }

    /// Load a word file. See [`loader`] for the line format.
    pub fn load_words(&self, path: impl AsRef<Path>) -> Result<LoadReport> {
        loader::load_words(self, path.as_ref())
    }

    /// Apply a `word,score` frequency file to words already present.
    pub fn load_frequencies(&self, path: impl AsRef<Path>) -> Result<FrequencyReport> {
        loader::load_frequencies(self, path.as_ref())
    }

    /// Write every record in the extended word format. Returns the number of
    /// lines written.
    pub fn save_words(&self, path: impl AsRef<Path>) -> Result<usize> {
        loader::save_words(self, path.as_ref())
    }

    fn read<R>(&self, kind: TreeKind, f: impl FnOnce(&dyn OrderedDictionary) -> R) -> R {
        match kind {
            TreeKind::Unbalanced => f(&*self.unbalanced.read()),
            TreeKind::Balanced => f(&*self.balanced.read()),
            TreeKind::Threaded => f(&*self.threaded.read()),
        }
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("len", &self.len())
            .field("config", &self.config)
            .finish()
    }
}
