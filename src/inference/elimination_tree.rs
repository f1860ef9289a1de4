//! The elimination-tree input model.
//!
//! An elimination tree is produced upstream by a variable-ordering stage
//! (COLAMD, METIS, or a hand-written ordering) and consumed read-only by
//! the junction-tree constructor. Nodes correspond one-to-one with
//! variables; a parent's variable is eliminated after all descendants'.

use std::sync::Arc;

use crate::inference::factor::Factor;
use crate::inference::key::Key;

/// One node of an elimination tree.
///
/// A well-formed tree attaches each factor to exactly one node: the
/// deepest node whose key is among the factor's keys. In particular every
/// factor stored here involves `key`.
#[derive(Debug, Clone)]
pub struct EliminationTreeNode<F> {
    /// The variable eliminated at this node.
    pub key: Key,
    /// The factors assigned to this node, in source order.
    pub factors: Vec<Arc<F>>,
    /// Child nodes, in elimination order.
    pub children: Vec<EliminationTreeNode<F>>,
}

impl<F: Factor> EliminationTreeNode<F> {
    /// Creates a leaf node for `key` carrying the given factors.
    pub fn new(key: Key, factors: Vec<Arc<F>>) -> Self {
        Self {
            key,
            factors,
            children: Vec::new(),
        }
    }

    /// Creates a node for `key` with factors and children.
    pub fn with_children(
        key: Key,
        factors: Vec<Arc<F>>,
        children: Vec<EliminationTreeNode<F>>,
    ) -> Self {
        Self {
            key,
            factors,
            children,
        }
    }
}

/// An elimination-tree forest plus the factors no node claimed.
///
/// Factors are shared by reference between this tree and any junction
/// tree built from it; neither side mutates them.
#[derive(Debug, Clone)]
pub struct EliminationTree<F> {
    roots: Vec<EliminationTreeNode<F>>,
    remaining_factors: Vec<Arc<F>>,
}

impl<F: Factor> EliminationTree<F> {
    /// Creates an elimination tree from its roots and unassigned factors.
    pub fn new(roots: Vec<EliminationTreeNode<F>>, remaining_factors: Vec<Arc<F>>) -> Self {
        Self {
            roots,
            remaining_factors,
        }
    }

    /// Returns the root nodes, in input order.
    pub fn roots(&self) -> &[EliminationTreeNode<F>] {
        &self.roots
    }

    /// Returns the factors not assigned to any node.
    pub fn remaining_factors(&self) -> &[Arc<F>] {
        &self.remaining_factors
    }
}
