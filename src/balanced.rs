//! A self-balancing BST (specifically, an AVL tree) layered over [`BaseTree`].
//!
//! The base tree does every structural insert and remove. Afterwards this layer walks parent
//! links from the point where the shape changed up to the root, recomputing heights and
//! rotating wherever one side has grown two levels taller than the other.
//!
//! # Examples
//!
//! ```
//! use balanced_bst::BalancedTree;
//!
//! let mut tree = BalancedTree::new();
//!
//! // Nothing in here yet.
//! assert!(tree.find(&1).is_none());
//!
//! // Ascending inserts would make a plain BST a linked list.
//! for key in 1..=7 {
//!     tree.insert(key, key * 10);
//! }
//! assert_eq!(tree.root().map(|n| *n.key()), Some(4));
//! assert_eq!(tree.height(), 3);
//!
//! // Removing a key returns its value.
//! assert_eq!(tree.remove(&4), Some(40));
//! assert!(tree.find(&4).is_none());
//! assert!(tree.validate().is_ok());
//! ```

use std::fmt;
use std::ptr::NonNull;

use tracing::trace;

use crate::base::BaseTree;
use crate::config::{ExtremeRemoval, Options};
use crate::error::InvariantViolation;
use crate::iter::Iter;
use crate::node::{Link, Node};
use crate::util::{Insertion, Removal};

/// An AVL tree with duplicate-key chaining. This can be used for inserting, finding, and
/// removing keys and values in `O(lg N)`.
#[derive(Clone)]
pub struct BalancedTree<K, V> {
    tree: BaseTree<K, V>,
    options: Options,
}

impl<K, V> Default for BalancedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for BalancedTree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

impl<'a, K, V> IntoIterator for &'a BalancedTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> BalancedTree<K, V> {
    /// Generate a new, empty `BalancedTree` with default [`Options`].
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Generate a new, empty `BalancedTree`.
    pub fn with_options(options: Options) -> Self {
        Self {
            tree: BaseTree::new(),
            options,
        }
    }

    /// The options this tree was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The topmost node, if the tree isn't empty.
    pub fn root(&self) -> Option<&Node<K, V>> {
        self.tree.root()
    }

    /// How many values the tree holds, duplicates included.
    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Same as [`BalancedTree::size`].
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Height of the whole tree; 0 when empty.
    pub fn height(&self) -> usize {
        self.tree.root.height()
    }

    /// Frees every node and resets the size.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Iterates every value in key order. Values sharing a key come out oldest first.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// The node with the smallest key.
    pub fn min(&self) -> Option<&Node<K, V>> {
        self.tree.min()
    }

    /// The node with the largest key.
    pub fn max(&self) -> Option<&Node<K, V>> {
        self.tree.max()
    }

    /// Potentially finds the node for the given key. If no node has the key, `None` is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_bst::BalancedTree;
    ///
    /// let mut tree = BalancedTree::new();
    /// tree.insert(1, 2);
    ///
    /// assert_eq!(tree.find(&1).map(|n| *n.value()), Some(2));
    /// assert!(tree.find(&42).is_none());
    /// ```
    pub fn find(&self, key: &K) -> Option<&Node<K, V>>
    where
        K: Ord,
    {
        self.tree.find(key)
    }

    /// The oldest value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        self.tree.get(key)
    }

    /// Whether any value is stored under `key`.
    pub fn contains(&self, key: &K) -> bool
    where
        K: Ord,
    {
        self.tree.contains(key)
    }

    /// Inserts `value` under `key` and returns the node now holding the key.
    ///
    /// A new key gets a new leaf and every ancestor of that leaf is rebalanced. A key that is
    /// already present only queues `value` behind the existing values, which leaves the shape
    /// of the tree alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_bst::BalancedTree;
    ///
    /// let mut tree = BalancedTree::new();
    ///
    /// let node = tree.insert(5, "a");
    /// assert_eq!(node.duplicate_count(), 0);
    ///
    /// let node = tree.insert(5, "b");
    /// assert_eq!(node.value(), &"a");
    /// assert_eq!(node.duplicate_count(), 1);
    /// assert_eq!(tree.size(), 2);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> &Node<K, V>
    where
        K: Ord,
    {
        let node = match self.tree.insert_at(self.tree.root, key, value) {
            Insertion::Duplicate(node) => node,
            Insertion::Structural(mut node) => {
                // SAFETY: `node` was just linked into this tree and we hold `&mut self`.
                let leaf = unsafe { node.as_mut() };
                leaf.height = 1;
                self.rebalance_upward(leaf.parent);
                node
            }
        };
        // SAFETY: Rotations move nodes but never free them, so `node` is still live. The
        // returned reference borrows `self`.
        unsafe { &*node.as_ptr() }
    }

    /// Removes the oldest value stored under `key`. The node for `key` is only unlinked once
    /// it has no values left, and only then is the tree rebalanced.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_bst::BalancedTree;
    ///
    /// let mut tree = BalancedTree::new();
    /// tree.insert(1, 2);
    ///
    /// assert_eq!(tree.remove(&1), Some(2));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V>
    where
        K: Ord,
    {
        let removal = self.tree.remove_at(self.tree.root, key);
        self.settle(removal, true)
    }

    /// Removes the oldest value stored under the smallest key. Whether ancestors are
    /// rebalanced afterwards depends on [`Options::extreme_removal`].
    pub fn remove_min(&mut self) -> Option<V>
    where
        K: Ord,
    {
        let removal = self.tree.remove_min_at(self.tree.root);
        let rebalance = self.options.extreme_removal == ExtremeRemoval::Rebalance;
        self.settle(removal, rebalance)
    }

    /// Removes the oldest value stored under the largest key. Whether ancestors are
    /// rebalanced afterwards depends on [`Options::extreme_removal`].
    pub fn remove_max(&mut self) -> Option<V>
    where
        K: Ord,
    {
        let removal = self.tree.remove_max_at(self.tree.root);
        let rebalance = self.options.extreme_removal == ExtremeRemoval::Rebalance;
        self.settle(removal, rebalance)
    }

    /// Checks key order, parent links, stored heights, the AVL balance bound, and the size
    /// counter.
    ///
    /// With [`ExtremeRemoval::Skip`] a tree can legitimately fail the height and balance
    /// checks after `remove_min`/`remove_max`.
    pub fn validate(&self) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        self.tree.check(true)
    }

    fn settle(&mut self, removal: Removal<K, V>, rebalance: bool) -> Option<V>
    where
        K: Ord,
    {
        match removal {
            Removal::Structural { value, changed } => {
                if rebalance {
                    self.rebalance_upward(changed);
                }
                Some(value)
            }
            // The shape didn't change so there's nothing to rebalance.
            other => other.into_value(),
        }
    }

    /// Balances `start` and then every ancestor above it, one at a time.
    fn rebalance_upward(&mut self, start: Link<K, V>)
    where
        K: Ord,
    {
        let mut current = start;
        while let Some(node) = current.0 {
            let subtree_root = self.balance(node);
            // SAFETY: `balance` returns a live node of this tree.
            current = unsafe { subtree_root.as_ref() }.parent;
        }
    }

    /// Recomputes the height of `node` and rotates if its subtrees differ in height by two.
    /// Returns whichever node now sits where `node` was.
    ///
    /// See <https://en.wikipedia.org/wiki/AVL_tree#Rebalancing> for terminology.
    fn balance(&mut self, mut node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>>
    where
        K: Ord,
    {
        // SAFETY: `node` is a live node of this tree and we hold `&mut self`.
        let root = unsafe { node.as_mut() };
        root.fix_height();
        let factor = root.balance_factor();

        if factor > 1 {
            if let Some(left) = root.left.0 {
                // SAFETY: `left` is a live child of `node`.
                if unsafe { left.as_ref() }.balance_factor() < 0 {
                    trace!(factor, "left-right case");
                    self.rotate_left(left);
                }
            }
            return self.rotate_right(node);
        }

        if factor < -1 {
            if let Some(right) = root.right.0 {
                // SAFETY: `right` is a live child of `node`.
                if unsafe { right.as_ref() }.balance_factor() > 0 {
                    trace!(factor, "right-left case");
                    self.rotate_right(right);
                }
            }
            return self.rotate_left(node);
        }

        node
    }

    /// Rotate `old_root` to the left. This moves the right child up vertically and `old_root`
    /// down vertically. Used to rebalance the tree when the right child is too tall. Does
    /// nothing when there is no right child.
    ///
    /// # Diagram
    ///
    /// Roughly speaking, we want to perform this transformation:
    ///
    /// ```text
    ///   Option<parent>               Option<parent>
    ///      /                            /
    ///   old_root                     new_root
    ///    /   \                        /    \
    ///   x   new_root   rotate ->  old_root  z
    ///        /  \                  /  \
    ///       y    z                x    y
    /// ```
    fn rotate_left(&mut self, old_root: NonNull<Node<K, V>>) -> NonNull<Node<K, V>>
    where
        K: Ord,
    {
        // SAFETY: `old_root` is a live node of this tree and we hold `&mut self`.
        let Some(new_root) = (unsafe { old_root.as_ref() }).right.0 else {
            return old_root;
        };
        // SAFETY: `old_root`, `new_root`, `y` and `parent` are distinct live nodes. Each is
        // written through its own pointer and `old` isn't touched once `new` reads its height.
        unsafe {
            let old = &mut *old_root.as_ptr();
            let new = &mut *new_root.as_ptr();

            let y = new.left;
            old.right = y;
            if let Some(y) = y.0 {
                (*y.as_ptr()).parent = Link::to(old_root);
            }

            let parent = old.parent;
            old.parent = Link::to(new_root);
            new.left = Link::to(old_root);
            new.parent = parent;

            old.fix_height();
            let old_height = old.height;
            new.fix_height();
            self.reattach(parent, new_root, &new.key);
            trace!(old = old_height, new = new.height, "rotated left");
        }
        new_root
    }

    /// Mirror of [`BalancedTree::rotate_left`].
    ///
    /// # Diagram
    ///
    /// ```text
    ///      Option<parent>            Option<parent>
    ///         /                         /
    ///      old_root                  new_root
    ///       /     \                  /     \
    ///   new_root   z    rotate ->   x    old_root
    ///    / \                               /  \
    ///   x   y                             y    z
    /// ```
    fn rotate_right(&mut self, old_root: NonNull<Node<K, V>>) -> NonNull<Node<K, V>>
    where
        K: Ord,
    {
        // SAFETY: `old_root` is a live node of this tree and we hold `&mut self`.
        let Some(new_root) = (unsafe { old_root.as_ref() }).left.0 else {
            return old_root;
        };
        // SAFETY: See `rotate_left`.
        unsafe {
            let old = &mut *old_root.as_ptr();
            let new = &mut *new_root.as_ptr();

            let y = new.right;
            old.left = y;
            if let Some(y) = y.0 {
                (*y.as_ptr()).parent = Link::to(old_root);
            }

            let parent = old.parent;
            old.parent = Link::to(new_root);
            new.right = Link::to(old_root);
            new.parent = parent;

            old.fix_height();
            let old_height = old.height;
            new.fix_height();
            self.reattach(parent, new_root, &new.key);
            trace!(old = old_height, new = new.height, "rotated right");
        }
        new_root
    }

    /// Points `parent` at `node`, which has taken the place of one of its children, or makes
    /// `node` the root when there is no parent. The side is picked by comparing `key` (the
    /// key of `node`) with the parent's key, which is sound because the subtree moved as a
    /// whole and is still ordered relative to `parent`.
    fn reattach(&mut self, parent: Link<K, V>, node: NonNull<Node<K, V>>, key: &K)
    where
        K: Ord,
    {
        match parent.0 {
            None => self.tree.root = Link::to(node),
            Some(parent) => {
                // SAFETY: `parent` is a live node of this tree, distinct from `node`, and we
                // hold `&mut self`.
                let parent = unsafe { &mut *parent.as_ptr() };
                if *key < parent.key {
                    parent.left = Link::to(node);
                } else {
                    parent.right = Link::to(node);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assert the heights of the root, left child, and right child of a tree.
    macro_rules! assert_heights {
        ($tree:ident, $height:expr, $left_height:expr, $right_height:expr) => {{
            match $tree.root() {
                Some(n) => {
                    assert_eq!(n.height(), $height);

                    let left_height = n.left().map_or(0, |n| n.height());
                    let right_height = n.right().map_or(0, |n| n.height());
                    assert_eq!(right_height, $right_height);
                    assert_eq!(left_height, $left_height);
                }
                None => assert_eq!(0, $height),
            }
        }};
    }

    /// Assert the root key and its children's keys.
    macro_rules! assert_shape {
        ($tree:ident, $root:expr, $left:expr, $right:expr) => {{
            let root = $tree.root().expect("tree has a root");
            assert_eq!(root.key(), &$root);
            assert_eq!(root.left().map(|n| *n.key()), Some($left));
            assert_eq!(root.right().map(|n| *n.key()), Some($right));
        }};
    }

    fn tree_of(keys: &[i32]) -> BalancedTree<i32, i32> {
        let mut tree = BalancedTree::new();
        for &key in keys {
            tree.insert(key, key * 2);
        }
        tree
    }

    #[test]
    fn always_adding_left() {
        let keys = [10, 9, 8, 7, 6, 5, 4, 3, 2, 1];
        let mut inserted = Vec::new();

        let mut tree = BalancedTree::new();
        assert!(tree.find(&10).is_none());

        for key in keys {
            tree.insert(key, key * 2);
            inserted.push(key);
            for inserted in &inserted {
                assert_eq!(tree.get(inserted), Some(&(inserted * 2)));
            }
            assert!(tree.validate().is_ok());
        }
        assert_eq!(tree.height(), 4);
    }

    #[test]
    fn always_adding_right() {
        let keys = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut inserted = Vec::new();

        let mut tree = BalancedTree::new();
        assert!(tree.find(&1).is_none());

        for key in keys {
            tree.insert(key, key * 2);
            inserted.push(key);
            for inserted in &inserted {
                assert_eq!(tree.get(inserted), Some(&(inserted * 2)));
            }
            assert!(tree.validate().is_ok());
        }
        assert_eq!(tree.height(), 4);
    }

    #[test]
    fn test_left_left_rebalance() {
        let tree = tree_of(&[3, 2, 1]);

        assert_shape!(tree, 2, 1, 3);
        assert_heights!(tree, 2, 1, 1);
    }

    #[test]
    fn test_right_right_rebalance() {
        let tree = tree_of(&[1, 2, 3]);

        assert_shape!(tree, 2, 1, 3);
        assert_heights!(tree, 2, 1, 1);
    }

    #[test]
    fn test_left_right_rebalance() {
        let tree = tree_of(&[0, -2, -1]);

        assert_shape!(tree, -1, -2, 0);
        assert_heights!(tree, 2, 1, 1);
    }

    #[test]
    fn test_right_left_rebalance() {
        let tree = tree_of(&[0, 2, 1]);

        assert_shape!(tree, 1, 0, 2);
        assert_heights!(tree, 2, 1, 1);
    }

    #[test]
    fn duplicates_leave_shape_alone() {
        let mut tree = tree_of(&[2, 1, 3]);

        tree.insert(1, 100);
        tree.insert(1, 101);
        assert_shape!(tree, 2, 1, 3);
        assert_heights!(tree, 2, 1, 1);
        assert_eq!(tree.size(), 5);

        assert_eq!(tree.remove(&1), Some(2));
        assert_eq!(tree.remove(&1), Some(100));
        assert_shape!(tree, 2, 1, 3);
        assert_eq!(tree.remove(&1), Some(101));
        assert!(tree.find(&1).is_none());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn delete_rebalances_from_successor_parent() {
        // Removing 5 pulls 6 up from under 8, so rebalancing starts at 8.
        let mut tree = tree_of(&[5, 3, 8, 2, 4, 6, 9, 1, 7, 10, 11]);
        assert!(tree.validate().is_ok());

        assert_eq!(tree.remove(&5), Some(10));
        assert!(tree.find(&5).is_none());
        assert!(tree.validate().is_ok());
        assert_eq!(
            tree.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 6, 7, 8, 9, 10, 11]
        );
    }

    #[test]
    fn delete_root() {
        let mut tree = tree_of(&[5]);

        assert_eq!(tree.remove(&5), Some(10));
        assert!(tree.find(&5).is_none());
        assert!(tree.root().is_none());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn rotate_right_fixes_parent_pointers() {
        let tree = tree_of(&[5, 3, 9, 4, 2, 1]);

        let three = tree.root().unwrap();
        assert_eq!(three.key(), &3);
        let five = three.right().unwrap();
        let nine = five.right().unwrap();
        let four = five.left().unwrap();

        assert!(std::ptr::eq(nine.parent().unwrap(), five));
        assert!(std::ptr::eq(four.parent().unwrap(), five));
        assert!(std::ptr::eq(five.parent().unwrap(), three));
        assert!(three.parent().is_none());
    }

    #[test]
    fn rotate_left_fixes_parent_pointers() {
        let tree = tree_of(&[-5, -3, -9, -4, -2, -1]);

        let three = tree.root().unwrap();
        assert_eq!(three.key(), &-3);
        let five = three.left().unwrap();
        let nine = five.left().unwrap();
        let four = five.right().unwrap();

        assert!(std::ptr::eq(nine.parent().unwrap(), five));
        assert!(std::ptr::eq(four.parent().unwrap(), five));
        assert!(std::ptr::eq(five.parent().unwrap(), three));
    }

    #[test]
    fn rotation_without_child_is_a_no_op() {
        let mut tree = tree_of(&[1]);
        let root = tree.tree.root.0.unwrap();

        assert_eq!(tree.rotate_left(root), root);
        assert_eq!(tree.rotate_right(root), root);
        assert_eq!(tree.tree.root.0, Some(root));
    }

    #[test]
    fn clone_works() {
        let mut tree = {
            let mut tree = BalancedTree::new();
            for key in [5, 3, 7, 1, 4, 6, 8] {
                tree.insert(key, key);
            }
            tree.clone()
        };

        assert!(tree.validate().is_ok());
        for key in [1, 3, 4, 7, 6, 8, 5] {
            assert_eq!(tree.remove(&key), Some(key));
            assert!(tree.validate().is_ok());
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn remove_extremes_rebalance_by_default() {
        let mut tree = tree_of(&(1..=15).collect::<Vec<_>>());

        for expected in 1..=5 {
            assert_eq!(tree.remove_min(), Some(expected * 2));
            assert!(tree.validate().is_ok());
        }
        for expected in (11..=15).rev() {
            assert_eq!(tree.remove_max(), Some(expected * 2));
            assert!(tree.validate().is_ok());
        }
        assert_eq!(tree.size(), 5);
    }

    #[test]
    fn remove_extremes_can_skip_rebalancing() {
        let options = Options::default().extreme_removal(ExtremeRemoval::Skip);
        let mut tree = BalancedTree::with_options(options);
        for key in 1..=7 {
            tree.insert(key, key);
        }

        // 4 is the root with 2 and 6 below it. Emptying the left side never rotates.
        assert_eq!(tree.remove_min(), Some(1));
        assert_eq!(tree.remove_min(), Some(2));
        assert_eq!(tree.remove_min(), Some(3));
        assert_eq!(tree.root().map(|n| *n.key()), Some(4));
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::Unbalanced { factor: -2 })
        );

        // An ordinary remove afterwards rebalances along its own path.
        assert_eq!(tree.remove(&7), Some(7));
        assert!(tree.validate().is_ok());
        assert_eq!(tree.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![4, 5, 6]);
    }

    #[test]
    fn quickcheck_found_invalid_height_after_deletion() {
        let mut tree = BalancedTree::new();

        tree.insert(77, -58);
        tree.insert(-22, -58);
        tree.insert(0, -37);
        tree.insert(-127, 79);
        tree.insert(5, 127);
        tree.insert(109, -83);
        tree.insert(-58, 91);
        tree.insert(-105, -46);
        tree.insert(-65, 8);
        tree.insert(-86, -51);
        tree.insert(45, -112);
        tree.insert(-11, 3);
        tree.insert(-39, 27);
        tree.remove(&0);
        tree.remove(&-122);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn quickcheck_found_invalid_height_after_deletion2() {
        let mut tree = BalancedTree::new();
        tree.insert(-49, -110);
        tree.insert(-107, 80);
        tree.insert(127, 59);
        tree.insert(-22, 71);
        tree.insert(-77, 0);
        tree.insert(-128, 0);
        tree.insert(-119, 17);
        tree.insert(-69, -11);
        tree.insert(-122, 29);
        tree.insert(109, -80);
        tree.insert(115, 40);
        tree.insert(-118, 53);
        tree.remove(&-49);
        tree.remove(&-77);
        assert!(tree.validate().is_ok());
    }
}

#[cfg(test)]
mod quicktests {
    use std::collections::{BTreeMap, VecDeque};

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and to a map of queues. This way we can ensure
    /// that after a random smattering of inserts and removes we hold the same values in the
    /// same order, and that the tree is a valid AVL tree after every step.
    fn do_ops<K, V>(
        ops: &[Op<K, V>],
        bst: &mut BalancedTree<K, V>,
        map: &mut BTreeMap<K, VecDeque<V>>,
    ) where
        K: Clone + Ord + fmt::Debug,
        V: Clone + PartialEq + fmt::Debug,
    {
        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    bst.insert(k.clone(), v.clone());
                    map.entry(k.clone()).or_default().push_back(v.clone());
                }
                Op::Remove(k) => {
                    let expected = map.get_mut(k).and_then(VecDeque::pop_front);
                    if map.get(k).is_some_and(VecDeque::is_empty) {
                        map.remove(k);
                    }
                    assert_eq!(bst.remove(k), expected);
                }
                Op::RemoveMin => {
                    let expected = map.first_entry().and_then(|mut entry| {
                        let value = entry.get_mut().pop_front();
                        if entry.get().is_empty() {
                            entry.remove();
                        }
                        value
                    });
                    assert_eq!(bst.remove_min(), expected);
                }
                Op::RemoveMax => {
                    let expected = map.last_entry().and_then(|mut entry| {
                        let value = entry.get_mut().pop_front();
                        if entry.get().is_empty() {
                            entry.remove();
                        }
                        value
                    });
                    assert_eq!(bst.remove_max(), expected);
                }
                Op::Iter => {
                    let expected: Vec<_> = map
                        .iter()
                        .flat_map(|(k, vs)| vs.iter().map(move |v| (k, v)))
                        .collect();
                    assert_eq!(bst.iter().collect::<Vec<_>>(), expected);
                }
            }
            assert_eq!(bst.validate(), Ok(()));
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
            let mut tree = BalancedTree::new();
            let mut map = BTreeMap::new();

            do_ops(&ops, &mut tree, &mut map);
            let size: usize = map.values().map(VecDeque::len).sum();
            tree.size() == size && map.keys().all(|key| tree.get(key) == map[key].front())
        }
    }

    quickcheck::quickcheck! {
        fn contains(xs: Vec<i8>) -> bool {
            let mut tree = BalancedTree::new();
            for x in &xs {
                tree.insert(*x, *x);
            }

            tree.size() == xs.len() && xs.iter().all(|x| tree.get(x) == Some(x))
        }
    }

    quickcheck::quickcheck! {
        fn height_is_logarithmic(xs: Vec<u16>) -> bool {
            let mut tree = BalancedTree::new();
            for x in &xs {
                tree.insert(*x, ());
            }

            let nodes = tree.iter().map(|(k, _)| k).collect::<std::collections::BTreeSet<_>>().len();
            // An AVL tree with n nodes is at most ~1.44 lg(n + 2) tall.
            let bound = 1.45 * ((nodes + 2) as f64).log2();
            (tree.height() as f64) <= bound
        }
    }
}
