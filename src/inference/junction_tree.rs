//! Junction-tree construction by bottom-up clique merging.
//!
//! Construction is a single depth-first traversal of the elimination
//! tree. On descent every node receives its own fresh clique, linked as a
//! child of its parent's clique; on ascent the node's key is symbolically
//! eliminated and each child clique whose conditional has exactly the
//! current frontal count more parents than this node's conditional is
//! absorbed into the current clique. A child passes that test precisely
//! when eliminating the current key introduced no separator variable
//! beyond those the child already carried, which means both belong to one
//! clique with the same separator.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::inference::elimination_tree::{EliminationTree, EliminationTreeNode};
use crate::inference::errors::InferenceError;
use crate::inference::factor::Factor;
use crate::inference::key::Key;
use crate::inference::symbolic::{eliminate_symbolic, SymbolicConditional, SymbolicFactor};
use crate::inference::traversal::depth_first_forest;

/// One clique of a junction tree: a group of jointly eliminated
/// variables, the factors assigned to them, and the child cliques.
#[derive(Debug, Clone)]
pub struct Clique<F> {
    /// Keys eliminated in this clique: the blocks of merged descendant
    /// cliques from the last absorbed subtree to the first, then the key
    /// of the elimination-tree node that created the clique. For the
    /// common single-merged-chain case this is elimination order, the
    /// clique's defining key last.
    pub ordered_frontal_keys: Vec<Key>,
    /// Factors assigned to this clique, in source order; merged children
    /// append theirs after the node's own.
    pub factors: Vec<Arc<F>>,
    /// Surviving child cliques, in input order.
    pub children: Vec<Clique<F>>,
    /// Scheduling estimate: the conditional size times the factor count
    /// at elimination, maxed over every absorbed child.
    pub problem_size: usize,
}

/// A junction-tree forest plus the factors carried over verbatim from
/// the elimination tree.
#[derive(Debug, Clone)]
pub struct JunctionTree<F> {
    roots: Vec<Clique<F>>,
    remaining_factors: Vec<Arc<F>>,
}

/// A clique still under construction, shared between the traversal datum
/// of the node that created it and its parent clique's child list.
///
/// Cliques are linked on descent and filled on ascent; after the
/// traversal completes they are frozen into owned [`Clique`] values.
struct CliqueBuilder<F> {
    ordered_frontal_keys: Vec<Key>,
    factors: Vec<Arc<F>>,
    children: Vec<SharedClique<F>>,
    problem_size: usize,
}

type SharedClique<F> = Rc<RefCell<CliqueBuilder<F>>>;

impl<F> CliqueBuilder<F> {
    fn new(key: Key, factors: Vec<Arc<F>>) -> SharedClique<F> {
        Rc::new(RefCell::new(Self {
            ordered_frontal_keys: vec![key],
            factors,
            children: Vec::new(),
            problem_size: 0,
        }))
    }

    /// Dummy clique used by the synthetic forest root to collect the
    /// real roots during traversal.
    fn dummy() -> SharedClique<F> {
        Rc::new(RefCell::new(Self {
            ordered_frontal_keys: Vec::new(),
            factors: Vec::new(),
            children: Vec::new(),
            problem_size: 0,
        }))
    }
}

/// Converts a finished builder tree into the owned output representation.
fn freeze<F>(shared: SharedClique<F>) -> Clique<F> {
    let mut builder = shared.borrow_mut();
    let children = std::mem::take(&mut builder.children)
        .into_iter()
        .map(freeze)
        .collect();
    Clique {
        ordered_frontal_keys: std::mem::take(&mut builder.ordered_frontal_keys),
        factors: std::mem::take(&mut builder.factors),
        children,
        problem_size: builder.problem_size,
    }
}

/// Per-node traversal state, alive for one elimination-tree node's visit.
///
/// The clique is registered with the parent on descent, while child
/// conditionals and residuals arrive on ascent as each child completes.
/// Left-to-right sibling order keeps the two collections aligned
/// index-for-index; the post-visitor verifies that they stayed in step.
struct TraversalData<F> {
    clique: SharedClique<F>,
    child_conditionals: Vec<SymbolicConditional>,
    child_residuals: Vec<SymbolicFactor>,
}

impl<F> TraversalData<F> {
    fn new(clique: SharedClique<F>) -> Self {
        Self {
            clique,
            child_conditionals: Vec::new(),
            child_residuals: Vec::new(),
        }
    }
}

/// Pre-order visitor: allocate a fresh single-key clique carrying the
/// node's factors and link it as a child of the parent's clique. No
/// symbolic work happens on descent.
fn pre_visit<F: Factor>(
    node: &EliminationTreeNode<F>,
    parent: &mut TraversalData<F>,
) -> Result<TraversalData<F>, InferenceError> {
    for factor in &node.factors {
        if !factor.keys().contains(&node.key) {
            return Err(InferenceError::PreconditionViolation(format!(
                "factor over keys {:?} is attached to the elimination-tree node \
                 for key {} but does not involve that key",
                factor.keys(),
                node.key,
            )));
        }
    }
    let clique = CliqueBuilder::new(node.key, node.factors.clone());
    parent.clique.borrow_mut().children.push(Rc::clone(&clique));
    Ok(TraversalData::new(clique))
}

/// Post-order visitor: eliminate this node's key symbolically, then
/// absorb every child clique whose conditional shows the same separator.
fn post_visit<F: Factor>(
    node: &EliminationTreeNode<F>,
    data: TraversalData<F>,
    parent: &mut TraversalData<F>,
) -> Result<(), InferenceError> {
    let TraversalData {
        clique,
        child_conditionals,
        child_residuals,
    } = data;

    // Eliminate this node's single key from its factors plus the
    // residuals passed up from children, child order preserved.
    let factor_count = node.factors.len() + child_residuals.len();
    let key_sets = node
        .factors
        .iter()
        .map(|f| f.keys())
        .chain(child_residuals.iter().map(|f| f.keys()));
    let (conditional, residual) = eliminate_symbolic(key_sets, &[node.key]);

    // Children were linked on descent, conditionals recorded on ascent;
    // a mismatch means the driver mispaired its visits.
    let mut me = clique.borrow_mut();
    if me.children.len() != child_conditionals.len() {
        return Err(InferenceError::Internal(format!(
            "clique for key {} has {} children but {} recorded child conditionals",
            node.key,
            me.children.len(),
            child_conditionals.len(),
        )));
    }

    // Merge decisions are all taken against the parent count recorded
    // here, before any merge mutates the clique.
    let my_nr_parents = conditional.nr_parents();
    let mut my_nr_frontals = 1usize;
    let mut nr_merged = 0usize;
    let mut combined_problem_size = conditional.size() * factor_count;

    for (i, child_conditional) in child_conditionals.iter().enumerate() {
        // The child joins this clique when eliminating our key introduced
        // no parent beyond those the child already had.
        if child_conditional.nr_parents() == my_nr_parents + my_nr_frontals {
            // Indices into `me.children` shift as merged entries are
            // removed; `child_conditionals` is indexed independently.
            let child_rc = me.children.remove(i - nr_merged);
            let mut child = child_rc.borrow_mut();

            // Appended in reverse; the single reversal after the loop
            // restores each absorbed block's internal order and leaves
            // this node's key last.
            let child_keys = std::mem::take(&mut child.ordered_frontal_keys);
            my_nr_frontals += child_keys.len();
            me.ordered_frontal_keys.extend(child_keys.into_iter().rev());
            me.factors.append(&mut child.factors);
            let mut grandchildren = std::mem::take(&mut child.children);
            me.children.append(&mut grandchildren);

            combined_problem_size = combined_problem_size.max(child.problem_size);
            nr_merged += 1;
        }
    }

    me.ordered_frontal_keys.reverse();
    me.problem_size = combined_problem_size;
    drop(me);

    parent.child_conditionals.push(conditional);
    parent.child_residuals.push(residual);
    Ok(())
}

impl<F: Factor> JunctionTree<F> {
    /// Builds a junction tree from an elimination tree.
    ///
    /// Traverses the elimination tree depth-first, symbolically
    /// eliminating each node's key on ascent and merging child cliques
    /// into their parent wherever the merge predicate holds. The input
    /// is borrowed read-only; factors are shared between both trees.
    ///
    /// # Errors
    ///
    /// * [`InferenceError::PreconditionViolation`] if a factor is
    ///   attached to a node whose key it does not involve
    /// * [`InferenceError::Internal`] if the traversal bookkeeping
    ///   desynchronizes (a driver or visitor bug)
    pub fn from_elimination_tree(tree: &EliminationTree<F>) -> Result<Self, InferenceError> {
        // A dummy clique on the synthetic root datum gathers the forest.
        let forest_root = CliqueBuilder::dummy();
        let mut root_data = TraversalData::new(Rc::clone(&forest_root));
        depth_first_forest(
            tree.roots(),
            &mut root_data,
            |node| node.children.as_slice(),
            pre_visit,
            post_visit,
        )?;

        let shared_roots = std::mem::take(&mut forest_root.borrow_mut().children);
        let junction_tree = JunctionTree {
            roots: shared_roots.into_iter().map(freeze).collect(),
            remaining_factors: tree.remaining_factors().to_vec(),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            roots = junction_tree.roots.len(),
            cliques = junction_tree.cliques().count(),
            remaining_factors = junction_tree.remaining_factors.len(),
            "junction tree constructed"
        );

        Ok(junction_tree)
    }

    /// Returns the root cliques, in elimination-tree root order.
    pub fn roots(&self) -> &[Clique<F>] {
        &self.roots
    }

    /// Returns the factors carried over verbatim from the elimination
    /// tree's unassigned factors.
    pub fn remaining_factors(&self) -> &[Arc<F>] {
        &self.remaining_factors
    }

    /// Iterates over every clique in the forest, pre-order, roots in
    /// input order.
    pub fn cliques(&self) -> CliqueIter<'_, F> {
        CliqueIter {
            stack: self.roots.iter().rev().collect(),
        }
    }
}

/// Pre-order iterator over the cliques of a junction-tree forest.
pub struct CliqueIter<'a, F> {
    stack: Vec<&'a Clique<F>>,
}

impl<'a, F> Iterator for CliqueIter<'a, F> {
    type Item = &'a Clique<F>;

    fn next(&mut self) -> Option<Self::Item> {
        let clique = self.stack.pop()?;
        self.stack.extend(clique.children.iter().rev());
        Some(clique)
    }
}
