//! # lexitree
//!
//! Three ordered dictionaries over the same [`Record`] type, built to be
//! compared side by side, plus a ranked prefix query that runs on any of them.
//!
//! - [`UnbalancedTree`]: plain binary search tree; shape follows insertion order.
//! - [`BalancedTree`]: AVL tree with cached heights; `O(log n)` worst case.
//! - [`ThreadedTree`]: right-threaded tree with a sentinel header and
//!   stack-free in-order traversal.
//!
//! Keys are ASCII-lowercased and capped at [`MAX_KEY_LEN`] bytes before any
//! comparison, so `"Apple"` and `"APPLE"` name the same entry.
//!
//! ## Example
//!
//! ```rust
//! use lexitree::{rank_prefix, record_selection, BalancedTree, Record};
//!
//! let mut tree = BalancedTree::new();
//! tree.insert(Record::new("apple").with_frequency(95));
//! tree.insert(Record::new("app").with_frequency(10));
//! tree.insert(Record::new("application").with_frequency(50));
//! tree.insert(Record::new("banana").with_frequency(80));
//!
//! let top: Vec<&str> = rank_prefix(&tree, "app", 2).iter().map(|r| r.key()).collect();
//! assert_eq!(top, ["apple", "application"]);
//!
//! record_selection("apple", &mut [&mut tree]);
//! assert_eq!(tree.search("apple").map(|r| r.composite_score()), Some(105));
//! ```

#![deny(unsafe_code)]

mod record;
mod walk;

pub mod autocomplete;
pub mod avl;
pub mod bst;
pub mod threaded;

pub use autocomplete::{rank_prefix, record_selection, PrefixRanker, MAX_CANDIDATES};
pub use avl::BalancedTree;
pub use bst::UnbalancedTree;
pub use record::{normalize_key, Record, RecordMut, FREQ_SCORE_DEFAULT, MAX_KEY_LEN, SELECTION_WEIGHT};
pub use threaded::{NodeId, ThreadedTree};

// =============================================================================
// Shared interface
// =============================================================================

/// Operations every tree variant supports.
///
/// Object safe, so heterogeneous collections such as
/// `&mut [&mut dyn OrderedDictionary]` work with [`record_selection`].
/// Keys passed in are normalized by the implementation; callers may pass
/// them in any case.
pub trait OrderedDictionary {
    /// Insert `record`. Returns `false` and leaves the tree untouched if the
    /// key is empty or already present.
    fn insert(&mut self, record: Record) -> bool;

    fn search(&self, key: &str) -> Option<&Record>;

    /// Mutable access to the payload and counters of `key`. The key itself
    /// stays read-only.
    fn search_mut(&mut self, key: &str) -> Option<RecordMut<'_>>;

    /// Remove `key`, returning its record.
    fn delete(&mut self, key: &str) -> Option<Record>;

    /// Visit every record once, in ascending key order.
    fn traverse_in_order(&self, visit: &mut dyn FnMut(&Record));

    /// Append records whose key starts with `prefix` (already normalized) to
    /// `out` in ascending key order, stopping once `out.len() == limit`.
    fn collect_prefix<'a>(&'a self, prefix: &str, limit: usize, out: &mut Vec<&'a Record>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &str) -> bool {
        self.search(key).is_some()
    }
}


#[cfg(test)]
mod proptests;
