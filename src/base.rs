//! A plain, unbalanced BST. Every walk is a loop rather than a recursive call, so a badly
//! skewed tree costs time but never stack.
//!
//! Keys equal to one already stored don't get a node of their own. They join that node's
//! [`SideChain`][crate::side_chain::SideChain] and come back out in the order they went in.
//!
//! # Examples
//!
//! ```
//! use balanced_bst::BaseTree;
//!
//! let mut tree = BaseTree::new();
//!
//! // Nothing in here yet.
//! assert!(tree.find(&1).is_none());
//!
//! tree.insert(1, "a");
//! tree.insert(1, "b");
//! assert_eq!(tree.size(), 2);
//!
//! // Values for the same key come back oldest first.
//! assert_eq!(tree.remove(&1), Some("a"));
//! assert_eq!(tree.get(&1), Some(&"b"));
//! assert_eq!(tree.remove(&1), Some("b"));
//! assert!(tree.is_empty());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::error::InvariantViolation;
use crate::iter::Iter;
use crate::node::{Link, Node};
use crate::util::{Insertion, Removal};

/// An unbalanced Binary Search Tree with duplicate-key chaining.
pub struct BaseTree<K, V> {
    // This is a `Link` instead of an `Option<Box<Node>>` so that nodes can point back at their
    // parents without the tree moving out from under them.
    pub(crate) root: Link<K, V>,
    size: usize,
    marker: PhantomData<Box<Node<K, V>>>,
}

// SAFETY: The tree owns every node reachable from its root and nothing else points into them,
// so moving the tree to another thread moves the keys and values with it.
unsafe impl<K: Send, V: Send> Send for BaseTree<K, V> {}
// SAFETY: `&BaseTree` only hands out shared references to keys and values.
unsafe impl<K: Sync, V: Sync> Sync for BaseTree<K, V> {}

impl<K, V> Default for BaseTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for BaseTree<K, V> {
    fn drop(&mut self) {
        self.free_all();
    }
}

impl<K, V> Clone for BaseTree<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut cloned = Self::new();
        cloned.size = self.size;

        // Each entry is a node to copy plus the already-copied parent it should hang from.
        let mut stack: Vec<(&Node<K, V>, Link<K, V>)> = Vec::new();
        stack.extend(self.root.node().map(|root| (root, Link::NONE)));

        while let Some((original, parent)) = stack.pop() {
            let copy = Node::leak(original.key.clone(), original.value.clone(), parent);
            // SAFETY: `copy` was just allocated and nothing else references it yet.
            unsafe {
                let node = &mut *copy.as_ptr();
                node.siblings = original.siblings.clone();
                node.height = original.height;
            }

            match parent.0 {
                None => cloned.root = Link::to(copy),
                // SAFETY: `parent` was copied earlier in this loop and is only reachable
                // through `cloned`, which we own exclusively.
                Some(parent) => unsafe {
                    let parent = &mut *parent.as_ptr();
                    if original.parent.node().is_some_and(|p| p.left.0 == Some(original.into())) {
                        parent.left = Link::to(copy);
                    } else {
                        parent.right = Link::to(copy);
                    }
                },
            }

            stack.extend(original.left().map(|left| (left, Link::to(copy))));
            stack.extend(original.right().map(|right| (right, Link::to(copy))));
        }

        cloned
    }
}

impl<K, V> fmt::Debug for BaseTree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a BaseTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> BaseTree<K, V> {
    /// Generate a new, empty `BaseTree`.
    pub fn new() -> Self {
        Self {
            root: Link::NONE,
            size: 0,
            marker: PhantomData,
        }
    }

    /// The topmost node, if the tree isn't empty.
    pub fn root(&self) -> Option<&Node<K, V>> {
        self.root.node()
    }

    /// How many values the tree holds, duplicates included.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Same as [`BaseTree::size`].
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Frees every node and resets the size.
    pub fn clear(&mut self) {
        debug!(entries = self.size, "clearing tree");
        self.free_all();
    }

    /// Iterates every value in key order. Values sharing a key come out oldest first.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_bst::BaseTree;
    ///
    /// let mut tree = BaseTree::new();
    /// tree.insert(2, 'b');
    /// tree.insert(1, 'a');
    /// tree.insert(2, 'c');
    ///
    /// let entries: Vec<_> = tree.iter().collect();
    /// assert_eq!(entries, vec![(&1, &'a'), (&2, &'b'), (&2, &'c')]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.leftmost(), self.size)
    }

    /// Potentially finds the node for the given key. If no node has the key, `None` is
    /// returned.
    pub fn find(&self, key: &K) -> Option<&Node<K, V>>
    where
        K: Ord,
    {
        self.find_from(self.root, key).node()
    }

    /// The oldest value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        self.find(key).map(Node::value)
    }

    /// Whether any value is stored under `key`.
    pub fn contains(&self, key: &K) -> bool
    where
        K: Ord,
    {
        !self.find_from(self.root, key).is_none()
    }

    /// The node with the smallest key.
    pub fn min(&self) -> Option<&Node<K, V>> {
        self.root.leftmost().node()
    }

    /// The node with the largest key.
    pub fn max(&self) -> Option<&Node<K, V>> {
        self.root.rightmost().node()
    }

    /// Inserts `value` under `key` and returns the node now holding the key. If the key is
    /// already present, no node is created: `value` is queued behind the existing ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_bst::BaseTree;
    ///
    /// let mut tree = BaseTree::new();
    /// tree.insert(1, 2);
    ///
    /// let node = tree.insert(1, 3);
    /// assert_eq!(node.value(), &2);
    /// assert_eq!(node.duplicate_count(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> &Node<K, V>
    where
        K: Ord,
    {
        let node = self.insert_at(self.root, key, value).node();
        // SAFETY: `node` is live and the returned reference borrows `self`.
        unsafe { &*node.as_ptr() }
    }

    /// Removes the oldest value stored under `key`. The node for `key` is only freed once it
    /// has no values left.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_bst::BaseTree;
    ///
    /// let mut tree = BaseTree::new();
    /// tree.insert(1, 2);
    ///
    /// assert_eq!(tree.remove(&1), Some(2));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V>
    where
        K: Ord,
    {
        self.remove_at(self.root, key).into_value()
    }

    /// Removes the oldest value stored under the smallest key.
    pub fn remove_min(&mut self) -> Option<V> {
        self.remove_min_at(self.root).into_value()
    }

    /// Removes the oldest value stored under the largest key.
    pub fn remove_max(&mut self) -> Option<V> {
        self.remove_max_at(self.root).into_value()
    }

    /// Checks key order, parent links, and the size counter. Heights aren't maintained by a
    /// plain BST so they aren't checked.
    pub fn validate(&self) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        self.check(false)
    }

    /// Descends from `start` to where `key` belongs and links in a new leaf there, or queues
    /// `value` on the node already holding `key`.
    ///
    /// `start` must be a node of this tree, or empty when the tree is empty.
    pub(crate) fn insert_at(&mut self, start: Link<K, V>, key: K, value: V) -> Insertion<K, V>
    where
        K: Ord,
    {
        self.size += 1;

        let Some(mut current) = start.0 else {
            debug_assert!(self.root.is_none(), "empty start on a non-empty tree");
            let leaf = Node::leak(key, value, Link::NONE);
            self.root = Link::to(leaf);
            return Insertion::Structural(leaf);
        };

        loop {
            // SAFETY: `current` is a live node of this tree and we hold `&mut self`, so nothing
            // else is looking at it. The reference isn't used after we move on.
            let node = unsafe { &mut *current.as_ptr() };
            let slot = match key.cmp(&node.key) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => {
                    node.siblings.append(value);
                    return Insertion::Duplicate(current);
                }
            };

            match slot.0 {
                Some(child) => current = child,
                None => {
                    let leaf = Node::leak(key, value, Link::to(current));
                    *slot = Link::to(leaf);
                    return Insertion::Structural(leaf);
                }
            }
        }
    }

    pub(crate) fn find_from(&self, start: Link<K, V>, key: &K) -> Link<K, V>
    where
        K: Ord,
    {
        let mut current = start;
        while let Some(node) = current.node() {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return current,
            };
        }
        Link::NONE
    }

    pub(crate) fn remove_at(&mut self, start: Link<K, V>, key: &K) -> Removal<K, V>
    where
        K: Ord,
    {
        match self.find_from(start, key).0 {
            Some(target) => self.remove_node(target),
            None => Removal::NotFound,
        }
    }

    /// Removes from the leftmost node under `start`. The walk down already found the node, so
    /// there is nothing to search for again.
    pub(crate) fn remove_min_at(&mut self, start: Link<K, V>) -> Removal<K, V> {
        match start.leftmost().0 {
            Some(target) => self.remove_node(target),
            None => Removal::NotFound,
        }
    }

    /// Mirror of [`BaseTree::remove_min_at`].
    pub(crate) fn remove_max_at(&mut self, start: Link<K, V>) -> Removal<K, V> {
        match start.rightmost().0 {
            Some(target) => self.remove_node(target),
            None => Removal::NotFound,
        }
    }

    /// Removes the oldest value from `target`, unlinking and freeing it when that was its last
    /// value.
    fn remove_node(&mut self, target: NonNull<Node<K, V>>) -> Removal<K, V> {
        self.size -= 1;

        // SAFETY: `target` is a live node of this tree and we hold `&mut self`. Below we only
        // write to other nodes through their own pointers, never through this reference.
        let node = unsafe { &mut *target.as_ptr() };
        if let Some(next) = node.siblings.remove_head() {
            return Removal::Duplicate(mem::replace(&mut node.value, next));
        }

        let parent = node.parent;
        let changed = match (node.left.0, node.right.0) {
            (None, None) => {
                trace!(case = "leaf", "unlinking node");
                self.replace_child(parent, target, Link::NONE);
                parent
            }
            (Some(child), None) | (None, Some(child)) => {
                trace!(case = "one child", "unlinking node");
                self.replace_child(parent, target, Link::to(child));
                // SAFETY: `child` is live and distinct from `target`.
                unsafe { (*child.as_ptr()).parent = parent };
                parent
            }
            (Some(left), Some(right)) => {
                trace!(case = "two children", "unlinking node");
                let successor = match Link::to(right).leftmost().0 {
                    Some(successor) => successor,
                    None => right,
                };
                // SAFETY: Every pointer dereferenced here is a live node of this tree other
                // than `target`. Each write happens through a fresh, short-lived reference.
                unsafe {
                    let heir = &mut *successor.as_ptr();
                    let changed = if successor == right {
                        // The successor keeps its own right subtree and moves up a level.
                        Link::to(successor)
                    } else {
                        // The successor is a left child with no left subtree of its own;
                        // its right subtree takes its place.
                        let heir_parent = heir.parent;
                        if let Some(heir_parent) = heir_parent.0 {
                            (*heir_parent.as_ptr()).left = heir.right;
                        }
                        if let Some(heir_right) = heir.right.0 {
                            (*heir_right.as_ptr()).parent = heir_parent;
                        }
                        heir.right = Link::to(right);
                        (*right.as_ptr()).parent = Link::to(successor);
                        heir_parent
                    };

                    heir.left = Link::to(left);
                    (*left.as_ptr()).parent = Link::to(successor);
                    heir.parent = parent;
                    heir.height = node.height;
                    self.replace_child(parent, target, Link::to(successor));
                    changed
                }
            }
        };

        // SAFETY: `target` has been unlinked from its parent and children above, so this tree
        // no longer reaches it and no reference to it outlives this call. It was allocated by
        // `Node::leak`, which uses `Box`.
        let removed = unsafe { Box::from_raw(target.as_ptr()) };
        Removal::Structural {
            value: removed.value,
            changed,
        }
    }

    /// Points whichever link of `parent` held `old` at `new` instead. An empty `parent` means
    /// `old` was the root.
    fn replace_child(&mut self, parent: Link<K, V>, old: NonNull<Node<K, V>>, new: Link<K, V>) {
        match parent.0 {
            None => self.root = new,
            Some(parent) => {
                // SAFETY: `parent` is a live node of this tree and we hold `&mut self`.
                let parent = unsafe { &mut *parent.as_ptr() };
                if parent.left.0 == Some(old) {
                    parent.left = new;
                } else {
                    parent.right = new;
                }
            }
        }
    }

    /// Walks the whole tree in order checking every structural invariant. Height and balance
    /// are only checked when `balanced` is set.
    pub(crate) fn check(&self, balanced: bool) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        let mut stack: Vec<(&Node<K, V>, usize)> = Vec::new();
        let mut next = self.root;
        let mut parent = Link::NONE;
        let mut depth = 0;

        let mut previous: Option<&K> = None;
        let mut position = 0;
        let mut entries = 0;

        loop {
            while let Some(node) = next.node() {
                if node.parent != parent {
                    return Err(InvariantViolation::BrokenParentLink { depth });
                }
                stack.push((node, depth));
                parent = next;
                next = node.left;
                depth += 1;
            }

            let Some((node, node_depth)) = stack.pop() else {
                break;
            };

            if previous.is_some_and(|previous| previous >= &node.key) {
                return Err(InvariantViolation::OutOfOrder { position });
            }
            previous = Some(&node.key);

            if balanced {
                let computed = node.left.height().max(node.right.height()) + 1;
                if node.height != computed {
                    return Err(InvariantViolation::StaleHeight {
                        stored: node.height,
                        computed,
                    });
                }
                let factor = node.balance_factor();
                if factor.abs() > 1 {
                    return Err(InvariantViolation::Unbalanced { factor });
                }
            }

            entries += 1 + node.duplicate_count();
            position += 1;

            parent = Link::to(node.into());
            next = node.right;
            depth = node_depth + 1;
        }

        if entries != self.size {
            return Err(InvariantViolation::SizeMismatch {
                counted: self.size,
                entries,
            });
        }
        Ok(())
    }

    fn free_all(&mut self) {
        let mut stack: Vec<NonNull<Node<K, V>>> = self.root.0.take().into_iter().collect();
        while let Some(ptr) = stack.pop() {
            // SAFETY: Every node is reachable through exactly one child link, so each is pushed
            // and freed once. The root link was cleared above, so nothing can reach them
            // afterwards. They were allocated by `Node::leak`, which uses `Box`.
            let node = unsafe { Box::from_raw(ptr.as_ptr()) };
            stack.extend(node.left.0);
            stack.extend(node.right.0);
        }
        self.size = 0;
    }
}
