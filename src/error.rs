//! Errors reported by structural validation.
//!
//! Ordinary operations never fail: a missing key is `None`. The only fallible call is
//! `validate`, which walks a whole tree and reports the first broken invariant it sees.

use thiserror::Error;

/// A structural invariant that doesn't hold for some node of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// An in-order walk met a key that isn't strictly greater than the one before it.
    #[error("in-order walk found keys out of order at position {position}")]
    OutOfOrder {
        /// Zero-based position of the offending node in the in-order walk.
        position: usize,
    },
    /// A node's parent link doesn't point at the node it hangs from.
    #[error("node at depth {depth} has a parent link that isn't its structural parent")]
    BrokenParentLink {
        /// Distance of the offending node from the root.
        depth: usize,
    },
    /// A node's stored height disagrees with its children's heights.
    #[error("stored height {stored} doesn't match computed height {computed}")]
    StaleHeight {
        /// The height recorded on the node.
        stored: usize,
        /// One more than the taller child's recorded height.
        computed: usize,
    },
    /// A node's subtrees differ in height by more than one.
    #[error("balance factor {factor} is outside -1..=1")]
    Unbalanced {
        /// Left subtree height minus right subtree height.
        factor: isize,
    },
    /// The tree's size counter disagrees with the entries actually reachable from the root.
    #[error("size counter says {counted} but {entries} entries are reachable")]
    SizeMismatch {
        /// The tree's own counter.
        counted: usize,
        /// Structural nodes plus their duplicates.
        entries: usize,
    },
}
