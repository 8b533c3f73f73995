//! In-order iteration.
//!
//! The iterator doesn't keep a stack: it steps from node to node through right and parent
//! links, so it costs the same memory however deep the tree is.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{Link, Node};
use crate::side_chain;

/// Iterator over the `(key, value)` pairs of a tree in key order. A key with duplicates
/// yields its primary value first, then its side-chain oldest first.
pub struct Iter<'a, K, V> {
    next: Link<K, V>,
    siblings: Option<(&'a K, side_chain::Iter<'a, V>)>,
    remaining: usize,
    marker: PhantomData<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// `first` must be the leftmost node of a tree holding exactly `len` values.
    pub(crate) fn new(first: Link<K, V>, len: usize) -> Self {
        Self {
            next: first,
            siblings: None,
            remaining: len,
            marker: PhantomData,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((key, siblings)) = &mut self.siblings {
            if let Some(value) = siblings.next() {
                self.remaining -= 1;
                return Some((*key, value));
            }
            self.siblings = None;
        }

        let node: &'a Node<K, V> = self.next.node()?;
        self.next = self.next.successor();
        if !node.siblings.is_empty() {
            self.siblings = Some((&node.key, node.siblings.iter()));
        }
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
