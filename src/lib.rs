//! This crate exposes a height-balanced Binary Search Tree (an AVL tree) built as a thin
//! balancing layer over a plain, iterative BST.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for keys in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`). [`BaseTree`] makes no effort to keep that
//! height down. [`BalancedTree`] rotates after every structural change so that the heights
//! of any `Node`'s two subtrees never differ by more than one, which limits the height to
//! `O(lg N)`.
//!
//! ## Duplicate keys
//!
//! Neither tree stores two `Node`s for one key. A value inserted under a key that is already
//! present is queued on that key's `Node` and removes hand values back oldest first. Only the
//! removal of a key's last value unlinks its `Node`.
//!
//! ```
//! use balanced_bst::BalancedTree;
//!
//! let mut tree = BalancedTree::new();
//! tree.insert(5, "a");
//! tree.insert(5, "b");
//! assert_eq!(tree.size(), 2);
//!
//! assert_eq!(tree.remove(&5), Some("a"));
//! assert!(tree.find(&5).is_some());
//! assert_eq!(tree.remove(&5), Some("b"));
//! assert!(tree.find(&5).is_none());
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod balanced;
pub mod base;
pub mod config;
pub mod error;
pub mod iter;
pub mod node;
pub mod side_chain;
mod util;


pub use balanced::BalancedTree;
pub use base::BaseTree;
pub use config::{ExtremeRemoval, Options};
pub use error::InvariantViolation;
pub use node::Node;
