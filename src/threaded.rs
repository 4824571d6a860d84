//! Right-threaded binary search tree with a sentinel header.
//!
//! Child slots that would otherwise be empty hold *threads* to the in-order
//! predecessor (left side) or successor (right side), so ordered traversal is
//! a loop over [`ThreadedTree::in_order_successor`] with no stack and no
//! recursion.
//!
//! Nodes live in an index arena. Each side of a node is a link: either a
//! structural child or a sequence thread. Descent code can only follow the
//! former, so a thread can never be mistaken for a subtree.
//! [`NodeId::HEADER`] names the sentinel: its left link is the root (or a
//! thread to itself when empty) and its right link always threads back to
//! itself, marking the end of the sequence.
//!
//! A [`NodeId`] carries the arena generation it was issued in. Deletion and
//! [`ThreadedTree::clear`] start a new generation, so handles taken before
//! them are rejected rather than naming whatever record now sits at the
//! same index.
//!
//! Deletion rebuilds the whole tree from the surviving records instead of
//! unthreading locally. It is O(n log n) on balanced shapes and the weakest
//! operation here; re-inserting in ascending order also leaves the rebuilt
//! tree as a right-leaning vine. Threads speed up traversal, they do not
//! balance anything, and every operation is iterative so depth is harmless.

use std::cmp::Ordering;
use std::mem;

use tracing::debug;

use crate::record::{normalize_key, prefix_cmp, Record, RecordMut};
use crate::OrderedDictionary;

/// Handle to a position in a [`ThreadedTree`]: a data node or the header.
///
/// Valid only until the next delete or clear on the tree that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// The sentinel. Never holds a record, never visited or counted.
    pub const HEADER: NodeId = NodeId {
        index: u32::MAX,
        generation: 0,
    };

    #[inline]
    pub fn is_header(self) -> bool {
        self.index == Self::HEADER.index
    }

    #[inline]
    fn index(self) -> usize {
        self.index as usize
    }
}

/// One side of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Link {
    /// A real subtree.
    Child(NodeId),
    /// In-order predecessor (left side) or successor (right side), or the
    /// header when there is none.
    Thread(NodeId),
}

impl Link {
    #[inline]
    fn child(self) -> Option<NodeId> {
        match self {
            Link::Child(id) => Some(id),
            Link::Thread(_) => None,
        }
    }
}

struct Node {
    record: Record,
    left: Link,
    right: Link,
}

struct Header {
    left: Link,
    right: Link,
}

/// An ordered dictionary backed by a threaded binary tree.
pub struct ThreadedTree {
    header: Header,
    nodes: Vec<Node>,
    // Bumped whenever the arena is emptied; wraps after 2^32 rebuilds.
    generation: u32,
}

impl ThreadedTree {
    /// An empty tree: just the header, threaded to itself on both sides.
    pub fn new() -> Self {
        Self {
            header: Header {
                left: Link::Thread(NodeId::HEADER),
                right: Link::Thread(NodeId::HEADER),
            },
            nodes: Vec::new(),
            generation: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    fn left_of(&self, id: NodeId) -> Link {
        if id.is_header() {
            self.header.left
        } else {
            self.nodes[id.index()].left
        }
    }

    #[inline]
    fn right_of(&self, id: NodeId) -> Link {
        if id.is_header() {
            self.header.right
        } else {
            self.nodes[id.index()].right
        }
    }

    #[inline]
    fn set_left(&mut self, id: NodeId, link: Link) {
        if id.is_header() {
            self.header.left = link;
        } else {
            self.nodes[id.index()].left = link;
        }
    }

    #[inline]
    fn set_right(&mut self, id: NodeId, link: Link) {
        if id.is_header() {
            self.header.right = link;
        } else {
            self.nodes[id.index()].right = link;
        }
    }

    #[inline]
    fn root(&self) -> Option<NodeId> {
        self.header.left.child()
    }

    /// Whether `id` names a data node of this tree as it stands now.
    #[inline]
    fn is_live(&self, id: NodeId) -> bool {
        id.generation == self.generation && id.index() < self.nodes.len()
    }

    /// The record stored at `id`, or `None` for the header or a handle issued
    /// before the last delete.
    pub fn record(&self, id: NodeId) -> Option<&Record> {
        if !self.is_live(id) {
            return None;
        }
        Some(&self.nodes[id.index()].record)
    }

    /// Insert `record`. Returns `false` if the key is empty or already present.
    pub fn insert(&mut self, record: Record) -> bool {
        if record.key().is_empty() {
            return false;
        }

        let mut parent = NodeId::HEADER;
        let mut went_left = true;
        let mut cur = self.root();
        while let Some(id) = cur {
            let node = &self.nodes[id.index()];
            parent = id;
            cur = match record.key().cmp(node.record.key()) {
                Ordering::Equal => return false,
                Ordering::Less => {
                    went_left = true;
                    node.left.child()
                }
                Ordering::Greater => {
                    went_left = false;
                    node.right.child()
                }
            };
        }

        assert!(self.nodes.len() < NodeId::HEADER.index(), "threaded tree arena is full");
        let id = NodeId {
            index: self.nodes.len() as u32,
            generation: self.generation,
        };
        let node = if went_left {
            // Inherits the parent's predecessor; the parent is its successor.
            Node {
                record,
                left: self.left_of(parent),
                right: Link::Thread(parent),
            }
        } else {
            Node {
                record,
                left: Link::Thread(parent),
                right: self.right_of(parent),
            }
        };
        self.nodes.push(node);
        if went_left {
            self.set_left(parent, Link::Child(id));
        } else {
            self.set_right(parent, Link::Child(id));
        }
        true
    }

    /// Locate the node holding `key`.
    pub fn find(&self, key: &str) -> Option<NodeId> {
        let key = normalize_key(key);
        let mut cur = self.root();
        while let Some(id) = cur {
            let node = &self.nodes[id.index()];
            cur = match key.as_str().cmp(node.record.key()) {
                Ordering::Equal => return Some(id),
                Ordering::Less => node.left.child(),
                Ordering::Greater => node.right.child(),
            };
        }
        None
    }

    pub fn search(&self, key: &str) -> Option<&Record> {
        self.find(key).map(|id| &self.nodes[id.index()].record)
    }

    pub fn search_mut(&mut self, key: &str) -> Option<RecordMut<'_>> {
        let id = self.find(key)?;
        Some(RecordMut::new(&mut self.nodes[id.index()].record))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Link::Child(left) = self.left_of(id) {
            id = left;
        }
        id
    }

    /// The smallest node, or the header when the tree is empty.
    pub fn first(&self) -> NodeId {
        match self.root() {
            Some(root) => self.leftmost(root),
            None => NodeId::HEADER,
        }
    }

    /// Next node in key order; the header after the largest node.
    ///
    /// O(1) when the right side is a thread, otherwise the leftmost node of
    /// the right subtree. A stale handle has no successor and yields the
    /// header.
    pub fn in_order_successor(&self, id: NodeId) -> NodeId {
        if !id.is_header() && !self.is_live(id) {
            return NodeId::HEADER;
        }
        self.successor(id)
    }

    /// [`Self::in_order_successor`] for ids known to be live.
    #[inline]
    fn successor(&self, id: NodeId) -> NodeId {
        match self.right_of(id) {
            Link::Thread(next) => next,
            Link::Child(right) => self.leftmost(right),
        }
    }

    /// Records in ascending key order, following threads.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            cur: self.first(),
            remaining: self.len(),
        }
    }

    pub fn traverse_in_order<F: FnMut(&Record)>(&self, visit: F) {
        self.iter().for_each(visit);
    }

    /// Remove `key` by rebuilding the tree from every other record.
    ///
    /// Records are moved out in threaded order, each node's successor being
    /// read before its record is released, then the header is reset and the
    /// survivors are re-inserted in ascending order.
    pub fn delete(&mut self, key: &str) -> Option<Record> {
        let key = normalize_key(key);
        self.find(&key)?;

        let mut survivors = Vec::with_capacity(self.len().saturating_sub(1));
        let mut removed = None;
        let mut cur = self.first();
        while !cur.is_header() {
            let next = self.successor(cur);
            let record = mem::replace(&mut self.nodes[cur.index()].record, Record::vacant());
            if record.key() == key {
                removed = Some(record);
            } else {
                survivors.push(record);
            }
            cur = next;
        }

        self.clear();
        for record in survivors {
            self.insert(record);
        }
        debug!(key = %key, remaining = self.len(), "rebuilt threaded tree after delete");
        removed
    }

    /// Release every data node and return the header to its empty state.
    /// Outstanding [`NodeId`]s become stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.generation = self.generation.wrapping_add(1);
        self.header.left = Link::Thread(NodeId::HEADER);
        self.header.right = Link::Thread(NodeId::HEADER);
    }

    /// Leftmost node whose key is `>=` `prefix` under first-`len(prefix)`
    /// comparison, i.e. the first candidate for a prefix scan.
    fn lower_bound(&self, prefix: &str) -> Option<NodeId> {
        let mut bound = None;
        let mut cur = self.root();
        while let Some(id) = cur {
            let node = &self.nodes[id.index()];
            cur = if prefix_cmp(node.record.key(), prefix) == Ordering::Less {
                node.right.child()
            } else {
                bound = Some(id);
                node.left.child()
            };
        }
        bound
    }
}

impl Default for ThreadedTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ThreadedTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(Record::key)).finish()
    }
}

impl OrderedDictionary for ThreadedTree {
    fn insert(&mut self, record: Record) -> bool {
        ThreadedTree::insert(self, record)
    }

    fn search(&self, key: &str) -> Option<&Record> {
        ThreadedTree::search(self, key)
    }

    fn search_mut(&mut self, key: &str) -> Option<RecordMut<'_>> {
        ThreadedTree::search_mut(self, key)
    }

    fn delete(&mut self, key: &str) -> Option<Record> {
        ThreadedTree::delete(self, key)
    }

    fn traverse_in_order(&self, visit: &mut dyn FnMut(&Record)) {
        self.iter().for_each(visit);
    }

    /// Lower-bound descent, then a forward walk along successor threads until
    /// a key sorts past the prefix range.
    fn collect_prefix<'a>(&'a self, prefix: &str, limit: usize, out: &mut Vec<&'a Record>) {
        let Some(start) = self.lower_bound(prefix) else {
            return;
        };
        let mut cur = start;
        while !cur.is_header() && out.len() < limit {
            let record = &self.nodes[cur.index()].record;
            match prefix_cmp(record.key(), prefix) {
                Ordering::Greater => break,
                Ordering::Equal => out.push(record),
                Ordering::Less => {}
            }
            cur = self.successor(cur);
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Stackless in-order iterator over a [`ThreadedTree`].
pub struct Iter<'a> {
    tree: &'a ThreadedTree,
    cur: NodeId,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<&'a Record> {
        if self.cur.is_header() {
            return None;
        }
        let record = &self.tree.nodes[self.cur.index()].record;
        self.cur = self.tree.successor(self.cur);
        self.remaining = self.remaining.saturating_sub(1);
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a ThreadedTree {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
pub(crate) fn validate_threads(t: &ThreadedTree) {
    // Structural in-order sequence, computed without using any thread.
    let mut order = Vec::with_capacity(t.len());
    let mut stack = Vec::new();
    let mut cur = t.root();
    loop {
        while let Some(id) = cur {
            stack.push(id);
            cur = t.left_of(id).child();
        }
        let Some(id) = stack.pop() else { break };
        order.push(id);
        cur = t.right_of(id).child();
    }
    assert_eq!(order.len(), t.len(), "reachable nodes must match len");

    for (i, &id) in order.iter().enumerate() {
        let pred = if i == 0 { NodeId::HEADER } else { order[i - 1] };
        let succ = order.get(i + 1).copied().unwrap_or(NodeId::HEADER);
        if let Link::Thread(target) = t.left_of(id) {
            assert_eq!(target, pred, "left thread of {id:?} must name its predecessor");
        }
        if let Link::Thread(target) = t.right_of(id) {
            assert_eq!(target, succ, "right thread of {id:?} must name its successor");
        }
        if i > 0 {
            let prev = &t.nodes[order[i - 1].index()].record;
            assert!(prev.key() < t.nodes[id.index()].record.key(), "keys must ascend");
        }
    }
    assert_eq!(t.header.right, Link::Thread(NodeId::HEADER));
    if t.is_empty() {
        assert_eq!(t.header.left, Link::Thread(NodeId::HEADER));
    }
}
