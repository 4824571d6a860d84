//! Prefix ranking over any [`OrderedDictionary`].
//!
//! Candidates are gathered in ascending key order by the tree's own pruned
//! prefix walk, capped at a ceiling, then stable-sorted by
//! [`Record::composite_score`] descending. Equal scores therefore keep
//! ascending key order.

use tracing::debug;

use crate::record::{normalize_key, Record};
use crate::OrderedDictionary;

/// Default ceiling on candidates gathered for a single query.
pub const MAX_CANDIDATES: usize = 512;

/// Ranks prefix matches with a configurable candidate ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixRanker {
    candidate_limit: usize,
}

impl Default for PrefixRanker {
    fn default() -> Self {
        Self {
            candidate_limit: MAX_CANDIDATES,
        }
    }
}

impl PrefixRanker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gather at most `candidate_limit` matches before ranking. Matches past
    /// the ceiling in key order are not considered, whatever their score.
    pub fn with_candidate_limit(candidate_limit: usize) -> Self {
        Self { candidate_limit }
    }

    #[inline]
    pub fn candidate_limit(&self) -> usize {
        self.candidate_limit
    }

    /// Up to `top_k` records whose key starts with `prefix`, best first.
    ///
    /// The prefix is normalized like a key. An empty prefix or `top_k == 0`
    /// yields nothing.
    pub fn rank_prefix<'a, T>(&self, tree: &'a T, prefix: &str, top_k: usize) -> Vec<&'a Record>
    where
        T: OrderedDictionary + ?Sized,
    {
        let prefix = normalize_key(prefix);
        if prefix.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        tree.collect_prefix(&prefix, self.candidate_limit, &mut candidates);
        if candidates.len() >= self.candidate_limit {
            debug!(
                prefix = %prefix,
                limit = self.candidate_limit,
                "prefix candidates hit the ceiling"
            );
        }

        // `sort_by` is stable: ties stay in key order.
        candidates.sort_by(|a, b| b.composite_score().cmp(&a.composite_score()));
        candidates.truncate(top_k);
        candidates
    }
}

/// [`PrefixRanker::rank_prefix`] with the default candidate ceiling.
pub fn rank_prefix<'a, T>(tree: &'a T, prefix: &str, top_k: usize) -> Vec<&'a Record>
where
    T: OrderedDictionary + ?Sized,
{
    PrefixRanker::default().rank_prefix(tree, prefix, top_k)
}

/// Count one user pick of `key` in every tree that holds it.
///
/// Returns how many trees were updated. A key absent from all of them is a
/// silent no-op.
pub fn record_selection(key: &str, trees: &mut [&mut dyn OrderedDictionary]) -> usize {
    let mut updated = 0;
    for tree in trees.iter_mut() {
        if let Some(mut record) = tree.search_mut(key) {
            record.record_selection();
            updated += 1;
        }
    }
    updated
}
