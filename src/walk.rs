//! Stack-based walks shared by the two pointer-linked trees.
//!
//! Both [`UnbalancedTree`](crate::UnbalancedTree) and
//! [`BalancedTree`](crate::BalancedTree) store `Option<Box<Node>>` children,
//! so ordered iteration, pruned prefix collection and height measurement are
//! written once against [`BinaryNode`]. None of these walks recurse; an
//! unbalanced tree built from sorted input is a vine of depth `n`.

use std::cmp::Ordering;

use crate::record::{prefix_cmp, Record};

pub(crate) trait BinaryNode {
    fn record(&self) -> &Record;
    fn left(&self) -> Option<&Self>;
    fn right(&self) -> Option<&Self>;
}

// =============================================================================
// In-order iteration
// =============================================================================

/// Ascending-order iterator. Holds at most `height` frames.
pub(crate) struct InOrder<'a, N> {
    stack: Vec<&'a N>,
    remaining: usize,
}

impl<'a, N: BinaryNode> InOrder<'a, N> {
    pub(crate) fn new(root: Option<&'a N>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a N>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left();
        }
    }
}

impl<'a, N: BinaryNode> Iterator for InOrder<'a, N> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<&'a Record> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right());
        self.remaining = self.remaining.saturating_sub(1);
        Some(node.record())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

// =============================================================================
// Pruned prefix collection
// =============================================================================

enum Step<'a, N> {
    Descend(&'a N),
    Emit(&'a N),
}

/// Push every record whose key starts with `prefix` onto `out`, in ascending
/// key order, stopping once `out` holds `limit` entries.
///
/// Subtrees that cannot hold a match are never entered: a node sorting after
/// the prefix range only sends us left, one sorting before it only right.
pub(crate) fn collect_prefix<'a, N: BinaryNode>(
    root: Option<&'a N>,
    prefix: &str,
    limit: usize,
    out: &mut Vec<&'a Record>,
) {
    let mut stack = Vec::new();
    if let Some(root) = root {
        stack.push(Step::Descend(root));
    }

    while let Some(step) = stack.pop() {
        if out.len() >= limit {
            break;
        }
        match step {
            Step::Emit(node) => out.push(node.record()),
            Step::Descend(node) => match prefix_cmp(node.record().key(), prefix) {
                Ordering::Greater => {
                    if let Some(left) = node.left() {
                        stack.push(Step::Descend(left));
                    }
                }
                Ordering::Less => {
                    if let Some(right) = node.right() {
                        stack.push(Step::Descend(right));
                    }
                }
                Ordering::Equal => {
                    // Reverse push order: left subtree, node, right subtree.
                    if let Some(right) = node.right() {
                        stack.push(Step::Descend(right));
                    }
                    stack.push(Step::Emit(node));
                    if let Some(left) = node.left() {
                        stack.push(Step::Descend(left));
                    }
                }
            },
        }
    }
}

// =============================================================================
// Height
// =============================================================================

/// Height by depth-first walk: 0 for an empty tree, 1 for a single leaf.
pub(crate) fn measure_height<N: BinaryNode>(root: Option<&N>) -> usize {
    let mut stack: Vec<(&N, usize)> = Vec::new();
    if let Some(root) = root {
        stack.push((root, 1));
    }

    let mut max_depth = 0;
    while let Some((node, depth)) = stack.pop() {
        max_depth = max_depth.max(depth);
        if let Some(right) = node.right() {
            stack.push((right, depth + 1));
        }
        if let Some(left) = node.left() {
            stack.push((left, depth + 1));
        }
    }
    max_depth
}
