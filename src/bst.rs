//! Unbalanced binary search tree.
//!
//! The baseline of the comparison: no rebalancing, so the shape depends
//! entirely on insertion order and sorted input degrades into a vine of depth
//! `n`. Every operation therefore descends iteratively through a
//! pointer-to-slot cursor, and teardown unwinds the tree without recursion.

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
}

impl Node {
    fn leaf(record: Record) -> Self {
        Self {
            record,
            left: None,
            right: None,
        }
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

/// An ordered dictionary backed by a plain binary search tree.
pub struct UnbalancedTree {
    root: Link,
    len: usize,
}

impl UnbalancedTree {
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

    /// Insert `record` as a new leaf.
    ///
    /// Returns `false` and drops `record` if its key is empty or already
    /// present; the first write wins.
    pub fn insert(&mut self, record: Record) -> bool {
        if record.key().is_empty() {
            return false;
        }

        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = match record.key().cmp(node.record.key()) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return false,
            };
        }
        *slot = Some(Box::new(Node::leaf(record)));
        self.len += 1;
        true
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

    /// Look up `key` and return a handle for updating its counters in place.
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

    /// Remove `key` and return its record. Absent keys leave the tree
    /// untouched.
    pub fn delete(&mut self, key: &str) -> Option<Record> {
        let key = normalize_key(key);
        if key.is_empty() {
            return None;
        }
        let slot = find_slot(&mut self.root, &key)?;
        let removed = unlink(slot)?;
        self.len -= 1;
        Some(removed)
    }

    /// Records in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: InOrder::new(self.root.as_deref(), self.len),
        }
    }

    /// Records with each node before its subtrees.
    ///
    /// Re-inserting this sequence into an empty tree reproduces the same
    /// shape, which is what a saver wants; re-inserting the ascending
    /// sequence would build a vine.
    pub fn iter_pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.root.as_deref().into_iter().collect(),
        }
    }

    pub fn traverse_in_order<F: FnMut(&Record)>(&self, visit: F) {
        self.iter().for_each(visit);
    }

    /// 0 when empty, 1 for a single leaf.
    pub fn height(&self) -> usize {
        walk::measure_height(self.root.as_deref())
    }

    /// Drop every node. Runs in O(n) time and O(1) extra space regardless
    /// of shape: left children are rotated up until the tree is a
    /// right-leaning vine, which is released node by node.
    pub fn clear(&mut self) {
        let mut cur = self.root.take();
        while let Some(mut node) = cur {
            cur = match node.left.take() {
                Some(mut left) => {
                    node.left = left.right.take();
                    left.right = Some(node);
                    Some(left)
                }
                None => node.right.take(),
            };
        }
        self.len = 0;
    }
}

/// Follow the search path for `key` and return the slot that owns its node.
fn find_slot<'a>(mut slot: &'a mut Link, key: &str) -> Option<&'a mut Link> {
    loop {
        let ord = key.cmp(slot.as_ref()?.record.key());
        slot = match ord {
            Ordering::Equal => return Some(slot),
            Ordering::Less => &mut slot.as_mut()?.left,
            Ordering::Greater => &mut slot.as_mut()?.right,
        };
    }
}

/// Remove the node held by `slot`, keeping its subtrees in order.
fn unlink(slot: &mut Link) -> Option<Record> {
    let mut node = slot.take()?;
    match (node.left.take(), node.right.take()) {
        (None, None) => Some(node.record),
        (Some(child), None) | (None, Some(child)) => {
            *slot = Some(child);
            Some(node.record)
        }
        (Some(left), Some(right)) => {
            // Two children: the successor's record moves up into this node and
            // the successor's own node is unlinked from the right subtree.
            node.left = Some(left);
            node.right = Some(right);
            let successor = take_min(&mut node.right)?;
            let removed = mem::replace(&mut node.record, successor);
            *slot = Some(node);
            Some(removed)
        }
    }
}

/// Unlink the leftmost node under `slot` and return its record.
fn take_min(mut slot: &mut Link) -> Option<Record> {
    while slot.as_ref()?.left.is_some() {
        slot = &mut slot.as_mut()?.left;
    }
    let mut node = slot.take()?;
    *slot = node.right.take();
    Some(node.record)
}

impl Default for UnbalancedTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UnbalancedTree {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Clone for UnbalancedTree {
    fn clone(&self) -> Self {
        // Pre-order replay reproduces the exact shape.
        let mut tree = Self::new();
        for record in self.iter_pre_order() {
            tree.insert(record.clone());
        }
        tree
    }
}

impl std::fmt::Debug for UnbalancedTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(Record::key)).finish()
    }
}

impl OrderedDictionary for UnbalancedTree {
    fn insert(&mut self, record: Record) -> bool {
        UnbalancedTree::insert(self, record)
    }

    fn search(&self, key: &str) -> Option<&Record> {
        UnbalancedTree::search(self, key)
    }

    fn search_mut(&mut self, key: &str) -> Option<RecordMut<'_>> {
        UnbalancedTree::search_mut(self, key)
    }

    fn delete(&mut self, key: &str) -> Option<Record> {
        UnbalancedTree::delete(self, key)
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

/// In-order iterator over an [`UnbalancedTree`].
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

/// Pre-order iterator over an [`UnbalancedTree`].
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<&'a Record> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right.as_deref() {
            self.stack.push(right);
        }
        if let Some(left) = node.left.as_deref() {
            self.stack.push(left);
        }
        Some(&node.record)
    }
}

impl<'a> IntoIterator for &'a UnbalancedTree {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(t: &UnbalancedTree) -> Vec<&str> {
        t.iter().map(Record::key).collect()
    }

    /// Every node's key is strictly inside the bounds set by its ancestors.
    fn assert_ordered(t: &UnbalancedTree) {
        let mut stack: Vec<(&Node, Option<&str>, Option<&str>)> = Vec::new();
        if let Some(root) = t.root.as_deref() {
            stack.push((root, None, None));
        }
        let mut seen = 0;
        while let Some((node, lo, hi)) = stack.pop() {
            seen += 1;
            let key = node.record.key();
            if let Some(lo) = lo {
                assert!(key > lo, "{key} must sort after ancestor {lo}");
            }
            if let Some(hi) = hi {
                assert!(key < hi, "{key} must sort before ancestor {hi}");
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, lo, Some(key)));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, Some(key), hi));
            }
        }
        assert_eq!(seen, t.len(), "reachable nodes must match len");
    }

    #[test]
    fn test_basic() {
        let mut t = UnbalancedTree::new();
        assert!(t.insert(Record::new("mango")));
        assert!(t.insert(Record::new("apple")));
        assert!(t.insert(Record::new("zebra")));
        assert_eq!(t.len(), 3);
        assert_eq!(keys(&t), ["apple", "mango", "zebra"]);
        assert_eq!(t.search("APPLE").map(Record::key), Some("apple"));
        assert!(t.search("pear").is_none());
        assert_ordered(&t);
    }

    #[test]
    fn test_duplicate_first_write_wins() {
        let mut t = UnbalancedTree::new();
        assert!(t.insert(Record::new("word").with_meaning("first")));
        assert!(!t.insert(Record::new("WORD").with_meaning("second")));
        assert_eq!(t.len(), 1);
        assert_eq!(t.search("word").map(|r| r.meaning.as_str()), Some("first"));
    }

    #[test]
    fn test_empty_key_is_ignored() {
        let mut t = UnbalancedTree::new();
        assert!(!t.insert(Record::new("")));
        assert!(t.is_empty());
        assert!(t.search("").is_none());
        assert!(t.delete("").is_none());
    }

    #[test]
    fn test_search_mut_updates_in_place() {
        let mut t = UnbalancedTree::new();
        t.insert(Record::new("apple").with_frequency(5));
        {
            let mut h = t.search_mut("Apple").expect("present");
            h.record_selection();
            h.set_frequency_score(9);
        }
        let r = t.search("apple").expect("present");
        assert_eq!(r.selection_count, 1);
        assert_eq!(r.frequency_score, 9);
        assert!(t.search_mut("missing").is_none());
    }

    #[test]
    fn test_delete_leaf_one_child_two_children() {
        let mut t = UnbalancedTree::new();
        for k in ["m", "f", "t", "c", "h", "p", "w", "g"] {
            t.insert(Record::new(k));
        }

        // Leaf.
        assert_eq!(t.delete("c").map(|r| r.key().to_owned()), Some("c".into()));
        assert_ordered(&t);

        // One child ("h" keeps "g").
        assert!(t.delete("h").is_some());
        assert_ordered(&t);
        assert_eq!(keys(&t), ["f", "g", "m", "p", "t", "w"]);

        // Two children at the root.
        assert_eq!(t.delete("m").map(|r| r.key().to_owned()), Some("m".into()));
        assert_ordered(&t);
        assert_eq!(keys(&t), ["f", "g", "p", "t", "w"]);
        assert_eq!(t.root.as_ref().map(|n| n.record.key()), Some("p"));

        // Missing key is a no-op.
        assert!(t.delete("zz").is_none());
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn test_delete_two_children_successor_with_right_child() {
        let mut t = UnbalancedTree::new();
        for k in ["d", "b", "h", "f", "g", "a"] {
            t.insert(Record::new(k));
        }
        // Successor of "d" is "f", which carries a right child "g".
        let removed = t.delete("d").expect("present");
        assert_eq!(removed.key(), "d");
        assert_ordered(&t);
        assert_eq!(keys(&t), ["a", "b", "f", "g", "h"]);
    }

    #[test]
    fn test_round_trip() {
        let mut t = UnbalancedTree::new();
        t.insert(Record::new("Kettle").with_meaning("pot").with_part_of_speech("noun"));
        let r = t.search("kettle").expect("present");
        assert_eq!(r.meaning, "pot");
        assert_eq!(r.part_of_speech, "noun");
        t.delete("KETTLE");
        assert!(t.search("kettle").is_none());
        assert!(t.is_empty());
    }

    #[test]
    fn test_height() {
        let mut t = UnbalancedTree::new();
        assert_eq!(t.height(), 0);
        t.insert(Record::new("m"));
        assert_eq!(t.height(), 1);
        t.insert(Record::new("c"));
        t.insert(Record::new("x"));
        assert_eq!(t.height(), 2);
        t.insert(Record::new("a"));
        assert_eq!(t.height(), 3);
    }

    #[test]
    fn test_sorted_input_vine_is_safe() {
        // Deep enough that recursive insert/drop would overflow the test
        // thread's stack.
        let n = 20_000;
        let mut t = UnbalancedTree::new();
        for i in 0..n {
            t.insert(Record::new(&format!("key{i:06}")));
        }
        assert_eq!(t.len(), n);
        assert_eq!(t.height(), n);
        assert!(t.search("key019999").is_some());
        assert_eq!(t.iter().count(), n);
        assert!(t.delete("key010000").is_some());
        assert!(t.delete("key000000").is_some());
        assert_eq!(t.len(), n - 2);
        drop(t);
    }

    #[test]
    fn test_pre_order_replay_keeps_shape() {
        let mut t = UnbalancedTree::new();
        for k in ["m", "f", "t", "c", "h", "p", "w"] {
            t.insert(Record::new(k));
        }
        let pre: Vec<&str> = t.iter_pre_order().map(Record::key).collect();
        assert_eq!(pre, ["m", "f", "c", "h", "t", "p", "w"]);

        let copy = t.clone();
        assert_eq!(copy.height(), t.height());
        let copy_pre: Vec<&str> = copy.iter_pre_order().map(Record::key).collect();
        assert_eq!(copy_pre, pre);
    }

    #[test]
    fn test_clear() {
        let mut t = UnbalancedTree::new();
        for k in ["b", "a", "c"] {
            t.insert(Record::new(k));
        }
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.height(), 0);
        assert!(t.insert(Record::new("a")));
    }

    #[test]
    fn test_iter_is_exact_size() {
        let mut t = UnbalancedTree::new();
        for k in ["b", "a", "c"] {
            t.insert(Record::new(k));
        }
        let mut it = t.iter();
        assert_eq!(it.len(), 3);
        it.next();
        assert_eq!(it.len(), 2);
    }
}
