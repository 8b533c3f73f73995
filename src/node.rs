//! The record stored for every distinct key in a tree.
//!
//! Nodes are heap allocated and linked with raw pointers. The `left` and `right` links own
//! their targets by convention: there is exactly one path of child links from the root to
//! every node, and only the tree frees nodes, always through that path. The `parent` link is
//! a plain back-edge used for upward walks and rotations and is never freed through.
//!
//! Callers only ever see `&Node`, borrowed from the tree, so the links cannot change while a
//! node is being inspected.

use std::fmt;
use std::ptr::NonNull;

use crate::side_chain::{self, SideChain};

/// A possibly-empty pointer to a [`Node`].
pub(crate) struct Link<K, V>(pub(crate) Option<NonNull<Node<K, V>>>);

impl<K, V> Clone for Link<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K, V> Copy for Link<K, V> {}

impl<K, V> PartialEq for Link<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<K, V> Eq for Link<K, V> {}

impl<K, V> Link<K, V> {
    pub(crate) const NONE: Self = Link(None);

    pub(crate) fn to(node: NonNull<Node<K, V>>) -> Self {
        Link(Some(node))
    }

    pub(crate) fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub(crate) fn node<'a>(self) -> Option<&'a Node<K, V>> {
        // SAFETY: A non-empty link always points at a live node owned by a tree. Every caller
        // ties the returned lifetime to a borrow of that tree, so the node can't be freed or
        // mutated while the reference is alive.
        self.0.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Height of the subtree behind this link; an absent subtree has height 0.
    pub(crate) fn height(self) -> usize {
        self.node().map_or(0, |n| n.height)
    }

    /// Follows left links as far as they go.
    pub(crate) fn leftmost(self) -> Self {
        let mut current = self;
        while let Some(left) = current.node().and_then(|n| n.left.0) {
            current = Link::to(left);
        }
        current
    }

    /// Follows right links as far as they go.
    pub(crate) fn rightmost(self) -> Self {
        let mut current = self;
        while let Some(right) = current.node().and_then(|n| n.right.0) {
            current = Link::to(right);
        }
        current
    }

    /// The next node of an in-order walk, found through right and parent links only.
    pub(crate) fn successor(self) -> Self {
        let Some(node) = self.node() else {
            return Link::NONE;
        };
        if !node.right.is_none() {
            return node.right.leftmost();
        }

        let mut child = self;
        while let Some(parent) = child.node().and_then(|n| n.parent.0) {
            // SAFETY: See `Link::node`.
            if unsafe { parent.as_ref() }.left == child {
                return Link::to(parent);
            }
            child = Link::to(parent);
        }
        Link::NONE
    }
}

/// A structural node: one distinct key, its primary value, and the [`SideChain`] of values
/// that arrived later for the same key.
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) siblings: SideChain<V>,

    /// How many levels are in the subtree rooted at this node. A node with no children has a
    /// height of 1.
    pub(crate) height: usize,

    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
    pub(crate) parent: Link<K, V>,
}

impl<K, V> fmt::Debug for Node<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("height", &self.height)
            .field("siblings", &self.siblings)
            .finish_non_exhaustive()
    }
}

impl<K, V> Node<K, V> {
    /// Allocates a fresh leaf hanging off `parent` and leaks it into a pointer. The tree that
    /// links the result in becomes responsible for freeing it.
    pub(crate) fn leak(key: K, value: V, parent: Link<K, V>) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(Node {
            key,
            value,
            siblings: SideChain::new(),
            height: 1,
            left: Link::NONE,
            right: Link::NONE,
            parent,
        })))
    }

    /// The key this node is ordered by.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The oldest value still stored under this node's key.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// How many levels are in the subtree rooted at this node, counting the node itself.
    ///
    /// Only meaningful on a [`BalancedTree`][crate::BalancedTree]; a plain
    /// [`BaseTree`][crate::BaseTree] doesn't keep heights current.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The root of the left subtree, if any.
    pub fn left(&self) -> Option<&Self> {
        self.left.node()
    }

    /// The root of the right subtree, if any.
    pub fn right(&self) -> Option<&Self> {
        self.right.node()
    }

    /// The structural parent, or `None` for the root.
    pub fn parent(&self) -> Option<&Self> {
        self.parent.node()
    }

    /// How many values share this key besides [`Node::value`].
    pub fn duplicate_count(&self) -> usize {
        self.siblings.count()
    }

    /// The values that share this key besides [`Node::value`], oldest first.
    pub fn siblings(&self) -> side_chain::Iter<'_, V> {
        self.siblings.iter()
    }

    /// Left subtree height minus right subtree height. See [the Wikipedia page][wiki] for more
    /// details.
    ///
    /// [wiki]: https://en.wikipedia.org/wiki/AVL_tree#Balance_factor
    pub fn balance_factor(&self) -> isize {
        self.left.height() as isize - self.right.height() as isize
    }

    /// Adjusts the height of `self` to be the max of its children's heights + 1.
    pub(crate) fn fix_height(&mut self) {
        self.height = self.left.height().max(self.right.height()) + 1;
    }
}
