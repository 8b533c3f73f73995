//! The side-chain that holds values sharing a key with an existing node.
//!
//! A tree never creates a second structural node for a key it already stores. Instead, every
//! later value for that key is appended here and handed back in arrival order when the key is
//! removed.
//!
//! # Examples
//!
//! ```
//! use balanced_bst::side_chain::SideChain;
//!
//! let mut chain = SideChain::new();
//! chain.append("b");
//! chain.append("c");
//!
//! assert_eq!(chain.count(), 2);
//! assert_eq!(chain.remove_head(), Some("b"));
//! assert_eq!(chain.remove_head(), Some("c"));
//! assert_eq!(chain.remove_head(), None);
//! ```

use std::collections::vec_deque;
use std::collections::VecDeque;

/// Borrowing iterator over a [`SideChain`], oldest value first.
pub type Iter<'a, V> = vec_deque::Iter<'a, V>;

/// An ordered, FIFO sequence of values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideChain<V> {
    values: VecDeque<V>,
}

impl<V> Default for SideChain<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SideChain<V> {
    /// Generates a new, empty `SideChain`.
    pub fn new() -> Self {
        Self {
            values: VecDeque::new(),
        }
    }

    /// Adds a value behind every value already in the chain.
    pub fn append(&mut self, value: V) {
        self.values.push_back(value);
    }

    /// Removes and returns the oldest value in the chain, if any.
    pub fn remove_head(&mut self) -> Option<V> {
        self.values.pop_front()
    }

    /// The oldest value in the chain without removing it.
    pub fn head(&self) -> Option<&V> {
        self.values.front()
    }

    /// How many values are waiting in the chain.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Whether the chain holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the chain oldest value first.
    pub fn iter(&self) -> Iter<'_, V> {
        self.values.iter()
    }
}

impl<'a, V> IntoIterator for &'a SideChain<V> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
