use std::ptr::NonNull;

use crate::node::{Link, Node};

/// What an insert into a [`BaseTree`][crate::BaseTree] did to the tree's shape.
pub(crate) enum Insertion<K, V> {
    /// A new leaf was linked in. Its ancestors may need rebalancing.
    Structural(NonNull<Node<K, V>>),
    /// The key was already present so the value joined that node's side-chain. The shape of
    /// the tree is unchanged.
    Duplicate(NonNull<Node<K, V>>),
}

impl<K, V> Insertion<K, V> {
    /// The node now holding the inserted key, fresh or not.
    pub(crate) fn node(&self) -> NonNull<Node<K, V>> {
        match *self {
            Self::Structural(node) | Self::Duplicate(node) => node,
        }
    }
}

/// What a remove from a [`BaseTree`][crate::BaseTree] did to the tree's shape.
pub(crate) enum Removal<K, V> {
    /// The key wasn't found so nothing was removed.
    NotFound,
    /// The key had duplicates; the oldest value was handed back and no node was freed.
    Duplicate(V),
    /// A node was unlinked and freed, yielding its value. `changed` is the deepest surviving
    /// node whose subtree lost a level, which is where any rebalancing has to start. It is
    /// empty when nothing above the removed node survived.
    Structural { value: V, changed: Link<K, V> },
}

impl<K, V> Removal<K, V> {
    pub(crate) fn into_value(self) -> Option<V> {
        match self {
            Self::NotFound => None,
            Self::Duplicate(value) | Self::Structural { value, .. } => Some(value),
        }
    }
}
