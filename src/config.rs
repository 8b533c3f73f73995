//! Knobs for a [`BalancedTree`][crate::BalancedTree].
//!
//! # Examples
//!
//! ```
//! use balanced_bst::{BalancedTree, ExtremeRemoval, Options};
//!
//! let options = Options::default().extreme_removal(ExtremeRemoval::Skip);
//! let mut tree = BalancedTree::with_options(options);
//! tree.insert(1, "one");
//!
//! assert_eq!(tree.options().extreme_removal, ExtremeRemoval::Skip);
//! assert_eq!(tree.remove_min(), Some("one"));
//! ```

/// What `remove_min`/`remove_max` do after unlinking a node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExtremeRemoval {
    /// Walk up from the removal point and rebalance every ancestor, like any other remove.
    #[default]
    Rebalance,
    /// Unlink the node and stop. Ancestors keep their old heights and the tree may drift out
    /// of AVL balance until a later insert or remove passes through them.
    Skip,
}

/// Construction options for a [`BalancedTree`][crate::BalancedTree].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Policy for `remove_min`/`remove_max`.
    pub extreme_removal: ExtremeRemoval,
}

impl Options {
    /// Sets the policy for `remove_min`/`remove_max`.
    pub fn extreme_removal(self, extreme_removal: ExtremeRemoval) -> Self {
        Self { extreme_removal }
    }
}
