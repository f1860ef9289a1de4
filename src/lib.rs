//! # Baytree - Junction Trees for Factor-Graph Inference
//!
//! Baytree converts an elimination tree (the output of a symbolic
//! variable-ordering stage on a factor graph) into a junction tree, also
//! known as a clique tree, suitable for block-wise probabilistic inference.
//!
//! ## Architecture
//!
//! The crate is organized into two modules:
//!
//! - **inference**: The junction-tree core: symbolic factors and
//!   conditionals, the elimination-tree input model, a depth-first forest
//!   traversal driver, and the clique-merging constructor
//! - **noise**: Noise models with `whiten`/`unwhiten` operations, used by
//!   numeric factor types layered on top of this crate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use baytree::{build_junction_tree, EliminationTree, EliminationTreeNode, Key};
//! use baytree::inference::symbolic::SymbolicFactor;
//!
//! let f = Arc::new(SymbolicFactor::new([Key(0), Key(1)]));
//! let root = EliminationTreeNode::with_children(
//!     Key(1),
//!     vec![],
//!     vec![EliminationTreeNode::new(Key(0), vec![f])],
//! );
//! let tree = EliminationTree::new(vec![root], vec![]);
//!
//! let junction_tree = build_junction_tree(&tree)?;
//! ```

#![forbid(unsafe_code)]

pub mod inference;
pub mod noise;

// Re-export commonly used types
pub use inference::elimination_tree::{EliminationTree, EliminationTreeNode};
pub use inference::errors::InferenceError;
pub use inference::factor::Factor;
pub use inference::junction_tree::{Clique, JunctionTree};
pub use inference::key::Key;

/// Builds a junction tree from an elimination tree.
///
/// This is a convenience function equivalent to
/// [`JunctionTree::from_elimination_tree`]. Each elimination-tree node
/// becomes its own clique, and cliques are merged bottom-up wherever a
/// child's symbolic conditional shows that eliminating the parent key
/// introduced no new separator variables.
pub fn build_junction_tree<F: Factor>(
    tree: &EliminationTree<F>,
) -> Result<JunctionTree<F>, InferenceError> {
    JunctionTree::from_elimination_tree(tree)
}
