//! Height-balanced (AVL) binary search tree.
//!
//! Same ordering contract as [`UnbalancedTree`](crate::UnbalancedTree), plus
//! a cached height per node. After every insert and delete the path back to
//! the root is rebalanced with single or double rotations, keeping
//! `|height(left) - height(right)| <= 1` everywhere and the overall height
//! within `1.45 * log2(n + 2)`. The recursion in insert/delete is therefore
//! bounded by that height.

use std::cmp::Ordering;
use std::mem;

use crate::record::{normalize_key, Record, RecordMut};
use crate::walk::{self, BinaryNode, InOrder};
use crate::OrderedDictionary;

type Link = Option<Box<Node>>;

struct Node {
    record: Record,
    left: Link,
    right: Link,
    height: u8,
}

#[inline]
fn height(link: &Link) -> u8 {
    link.as_ref().map_or(0, |n| n.height)
}

#[inline]
fn balance_factor(link: &Link) -> i16 {
    link.as_ref().map_or(0, |n| n.balance_factor())
}

impl Node {
    fn leaf(record: Record) -> Self {
        Self {
            record,
            left: None,
            right: None,
            height: 1,
        }
    }

    #[inline]
    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    #[inline]
    fn balance_factor(&self) -> i16 {
        i16::from(height(&self.left)) - i16::from(height(&self.right))
    }
}

impl BinaryNode for Node {
    #[inline]
    fn record(&self) -> &Record {
        &self.record
    }

    #[inline]
    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    #[inline]
    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }
}

// =============================================================================
// Rotations
// =============================================================================

/// ```text
///       y            x
///      / \          / \
///     x   C   =>   A   y
///    / \              / \
///   A   B            B   C
/// ```
fn rotate_right(slot: &mut Link) {
    let Some(mut y) = slot.take() else { return };
    let Some(mut x) = y.left.take() else {
        *slot = Some(y);
        return;
    };
    y.left = x.right.take();
    y.update_height();
    x.right = Some(y);
    x.update_height();
    *slot = Some(x);
}

/// Mirror image of [`rotate_right`].
fn rotate_left(slot: &mut Link) {
    let Some(mut x) = slot.take() else { return };
    let Some(mut y) = x.right.take() else {
        *slot = Some(x);
        return;
    };
    x.right = y.left.take();
    x.update_height();
    y.left = Some(x);
    y.update_height();
    *slot = Some(y);
}

/// Refresh the height of the node in `slot` and restore its balance.
fn rebalance(slot: &mut Link) {
    let Some(node) = slot.as_mut() else { return };
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        if balance_factor(&node.left) < 0 {
            rotate_left(&mut node.left);
        }
        rotate_right(slot);
    } else if balance < -1 {
        if balance_factor(&node.right) > 0 {
            rotate_right(&mut node.right);
        }
        rotate_left(slot);
    }
}

// =============================================================================
// Insert / delete
// =============================================================================

fn insert_at(slot: &mut Link, record: Record) -> bool {
    let inserted = match slot {
        None => {
            *slot = Some(Box::new(Node::leaf(record)));
            return true;
        }
        Some(node) => match record.key().cmp(node.record.key()) {
            Ordering::Less => insert_at(&mut node.left, record),
            Ordering::Greater => insert_at(&mut node.right, record),
            Ordering::Equal => false,
        },
    };
    if inserted {
        rebalance(slot);
    }
    inserted
}

fn delete_at(slot: &mut Link, key: &str) -> Option<Record> {
    let node = slot.as_mut()?;
    let removed = match key.cmp(node.record.key()) {
        Ordering::Less => delete_at(&mut node.left, key),
        Ordering::Greater => delete_at(&mut node.right, key),
        Ordering::Equal if node.left.is_some() && node.right.is_some() => {
            // Move the successor's record up, then rebalance on the way back
            // from where the successor used to be.
            take_min(&mut node.right).map(|successor| mem::replace(&mut node.record, successor))
        }
        Ordering::Equal => {
            let mut gone = slot.take()?;
            *slot = gone.left.take().or_else(|| gone.right.take());
            return Some(gone.record);
        }
    };
    if removed.is_some() {
        rebalance(slot);
    }
    removed
}

fn take_min(slot: &mut Link) -> Option<Record> {
    let node = slot.as_mut()?;
    if node.left.is_some() {
        let min = take_min(&mut node.left);
        rebalance(slot);
        min
    } else {
        let mut gone = slot.take()?;
        *slot = gone.right.take();
        Some(gone.record)
    }
}

/// An ordered dictionary backed by an AVL tree.
pub struct BalancedTree {
    root: Link,
    len: usize,
}

impl BalancedTree {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `record`, rebalancing the search path. Returns `false` if the
    /// key is empty or already present.
    pub fn insert(&mut self, record: Record) -> bool {
        if record.key().is_empty() {
            return false;
        }
        let inserted = insert_at(&mut self.root, record);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    pub fn search(&self, key: &str) -> Option<&Record> {
        let key = normalize_key(key);
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            cur = match key.as_str().cmp(node.record.key()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.record),
            };
        }
        None
    }

    pub fn search_mut(&mut self, key: &str) -> Option<RecordMut<'_>> {
        let key = normalize_key(key);
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            cur = match key.as_str().cmp(node.record.key()) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => return Some(RecordMut::new(&mut node.record)),
            };
        }
        None
    }

    pub fn contains(&self, key: &str) -> bool {
        self.search(key).is_some()
    }

    pub fn delete(&mut self, key: &str) -> Option<Record> {
        let key = normalize_key(key);
        if key.is_empty() {
            return None;
        }
        let removed = delete_at(&mut self.root, &key)?;
        self.len -= 1;
        Some(removed)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: InOrder::new(self.root.as_deref(), self.len),
        }
    }

    pub fn traverse_in_order<F: FnMut(&Record)>(&self, visit: F) {
        self.iter().for_each(visit);
    }

    /// Height of the root, read from its cached field in O(1).
    #[inline]
    pub fn height(&self) -> usize {
        usize::from(height(&self.root))
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }
}

impl Default for BalancedTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BalancedTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(Record::key)).finish()
    }
}

impl OrderedDictionary for BalancedTree {
    fn insert(&mut self, record: Record) -> bool {
        BalancedTree::insert(self, record)
    }

    fn search(&self, key: &str) -> Option<&Record> {
        BalancedTree::search(self, key)
    }

    fn search_mut(&mut self, key: &str) -> Option<RecordMut<'_>> {
        BalancedTree::search_mut(self, key)
    }

    fn delete(&mut self, key: &str) -> Option<Record> {
        BalancedTree::delete(self, key)
    }

    fn traverse_in_order(&self, visit: &mut dyn FnMut(&Record)) {
        self.iter().for_each(visit);
    }

    fn collect_prefix<'a>(&'a self, prefix: &str, limit: usize, out: &mut Vec<&'a Record>) {
        walk::collect_prefix(self.root.as_deref(), prefix, limit, out);
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// In-order iterator over a [`BalancedTree`].
pub struct Iter<'a> {
    inner: InOrder<'a, Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    #[inline]
    fn next(&mut self) -> Option<&'a Record> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a BalancedTree {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
pub(crate) fn height_bound(n: usize) -> f64 {
    1.45 * ((n + 2) as f64).log2()
}

/// Recompute every height from scratch and check it against the cached
/// value, the balance invariant and key ordering. Returns the height.
#[cfg(test)]
fn validate_link(link: &Link, lo: Option<&str>, hi: Option<&str>) -> u8 {
    let Some(node) = link else { return 0 };
    let key = node.record.key();
    if let Some(lo) = lo {
        assert!(key > lo, "{key} must sort after {lo}");
    }
    if let Some(hi) = hi {
        assert!(key < hi, "{key} must sort before {hi}");
    }
    let lh = validate_link(&node.left, lo, Some(key));
    let rh = validate_link(&node.right, Some(key), hi);
    assert!(
        (i16::from(lh) - i16::from(rh)).abs() <= 1,
        "node {key} out of balance: {lh} vs {rh}"
    );
    let h = 1 + lh.max(rh);
    assert_eq!(node.height, h, "stale cached height at {key}");
    h
}

#[cfg(test)]
pub(crate) fn validate_tree(t: &BalancedTree) {
    validate_link(&t.root, None, None);
    assert_eq!(t.iter().count(), t.len());
    assert!(
        (t.height() as f64) <= height_bound(t.len()),
        "height {} exceeds bound for n={}",
        t.height(),
        t.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_basic() {
        let mut t = BalancedTree::new();
        for k in ["delta", "alpha", "charlie", "bravo"] {
            assert!(t.insert(Record::new(k)));
        }
        assert!(!t.insert(Record::new("ALPHA")));
        assert_eq!(t.len(), 4);
        let keys: Vec<&str> = t.iter().map(Record::key).collect();
        assert_eq!(keys, ["alpha", "bravo", "charlie", "delta"]);
        assert!(t.contains("Charlie"));
        validate_tree(&t);
    }

    #[test]
    fn test_rotation_cases() {
        // Right rotation (left-left), left rotation (right-right), and the two
        // double rotations; each leaves "b" at the root of a 3-node tree.
        for order in [["c", "b", "a"], ["a", "b", "c"], ["c", "a", "b"], ["a", "c", "b"]] {
            let mut t = BalancedTree::new();
            for k in order {
                t.insert(Record::new(k));
            }
            assert_eq!(t.height(), 2, "order {order:?}");
            assert_eq!(t.root.as_ref().map(|n| n.record.key()), Some("b"));
            validate_tree(&t);
        }
    }

    #[test]
    fn test_sorted_input_stays_logarithmic() {
        let mut t = BalancedTree::new();
        for i in 0..10_000 {
            t.insert(Record::new(&format!("wd{i:05}")));
        }
        assert_eq!(t.len(), 10_000);
        // A perfectly balanced tree of 10k nodes has height 14.
        assert!(t.height() <= 15, "height {}", t.height());
        validate_tree(&t);
    }

    #[test]
    fn test_delete_rebalances() {
        let mut t = BalancedTree::new();
        for i in 0..64 {
            t.insert(Record::new(&format!("k{i:02}")));
        }
        // Strip the left half; the right side must rotate over.
        for i in 0..32 {
            assert!(t.delete(&format!("k{i:02}")).is_some());
            validate_tree(&t);
        }
        assert_eq!(t.len(), 32);
        assert!(t.delete("k00").is_none());
    }

    #[test]
    fn test_delete_two_children_returns_original() {
        let mut t = BalancedTree::new();
        for k in ["m", "f", "t", "c", "h", "p", "w"] {
            t.insert(Record::new(k).with_meaning(k.to_uppercase()));
        }
        let removed = t.delete("m").expect("present");
        assert_eq!(removed.key(), "m");
        assert_eq!(removed.meaning, "M");
        // The successor moved into the root with its own payload intact.
        let p = t.search("p").expect("present");
        assert_eq!(p.meaning, "P");
        validate_tree(&t);
    }

    #[test]
    fn test_random_insert_delete_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut keys: Vec<String> = (0..2_000).map(|i| format!("w{i}")).collect();
        keys.shuffle(&mut rng);

        let mut t = BalancedTree::new();
        for (i, k) in keys.iter().enumerate() {
            t.insert(Record::new(k));
            if i % 97 == 0 {
                validate_tree(&t);
            }
        }
        validate_tree(&t);

        for _ in 0..1_000 {
            let k = &keys[rng.gen_range(0..keys.len())];
            t.delete(k);
        }
        validate_tree(&t);
    }

    #[test]
    fn test_search_mut() {
        let mut t = BalancedTree::new();
        t.insert(Record::new("apple").with_frequency(95));
        t.search_mut("apple").expect("present").record_selection();
        assert_eq!(t.search("apple").map(Record::composite_score), Some(105));
    }

    #[test]
    fn test_empty() {
        let mut t = BalancedTree::new();
        assert_eq!(t.height(), 0);
        assert!(t.search("x").is_none());
        assert!(t.delete("x").is_none());
        assert!(!t.insert(Record::new("")));
        assert_eq!(t.iter().next(), None);
    }
}
