//! Symbolic factors, symbolic conditionals, and the elimination primitive.
//!
//! Symbolic elimination mirrors numerical elimination at the level of
//! variable sets: it records which keys a conditional would be over without
//! touching any values. The junction-tree constructor uses the resulting
//! parent counts to decide which elimination-tree nodes collapse into one
//! clique.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::inference::factor::Factor;
use crate::inference::key::Key;

/// Inline capacity for per-factor key lists. Factors in real problems
/// rarely involve more than a handful of variables.
const INLINE_KEYS: usize = 8;

pub(crate) type KeyVec = SmallVec<[Key; INLINE_KEYS]>;

/// A factor that carries nothing but the set of keys it involves.
///
/// Keys are stored deduplicated in first-appearance order. This is the
/// residual representation produced by symbolic elimination and doubles
/// as the simplest concrete [`Factor`] for tests and symbolic-only
/// pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolicFactor {
    keys: KeyVec,
}

impl SymbolicFactor {
    /// Creates a symbolic factor over the given keys.
    ///
    /// Duplicate keys are dropped; the first occurrence fixes the position.
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        let mut seen = FxHashSet::default();
        let mut deduped = KeyVec::new();
        for key in keys {
            if seen.insert(key) {
                deduped.push(key);
            }
        }
        Self { keys: deduped }
    }

    /// Returns the keys this factor involves.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Returns `true` if this factor involves no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Factor for SymbolicFactor {
    fn keys(&self) -> &[Key] {
        &self.keys
    }
}

/// A symbolic conditional: ordered frontal keys followed by ordered
/// parent keys.
///
/// Produced by symbolic elimination and immutable afterwards. The
/// parent count drives the clique-merge predicate during junction-tree
/// construction; the parent ordering (first appearance while scanning the
/// input factors) is what downstream numerical elimination sees.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolicConditional {
    frontals: KeyVec,
    parents: KeyVec,
}

impl SymbolicConditional {
    /// Returns the frontal keys, in elimination order.
    pub fn frontals(&self) -> &[Key] {
        &self.frontals
    }

    /// Returns the parent keys, in first-appearance order.
    pub fn parents(&self) -> &[Key] {
        &self.parents
    }

    /// Total number of keys involved: frontals plus parents.
    pub fn size(&self) -> usize {
        self.frontals.len() + self.parents.len()
    }

    /// Number of parent keys.
    pub fn nr_parents(&self) -> usize {
        self.parents.len()
    }
}

/// Symbolically eliminates `keys_to_eliminate` from a collection of
/// factors, given as their key sets.
///
/// The conditional's frontal keys equal `keys_to_eliminate` in the given
/// order. Its parents are every other key appearing in the input, in
/// first-appearance scan order, deduplicated. The residual is a symbolic
/// factor over exactly those parents.
///
/// An empty factor collection yields a conditional with no parents and an
/// empty residual.
pub(crate) fn eliminate_symbolic<'a, I>(
    factor_key_sets: I,
    keys_to_eliminate: &[Key],
) -> (SymbolicConditional, SymbolicFactor)
where
    I: IntoIterator<Item = &'a [Key]>,
{
    let mut frontals = KeyVec::new();
    let mut frontal_set = FxHashSet::default();
    for &key in keys_to_eliminate {
        if frontal_set.insert(key) {
            frontals.push(key);
        }
    }

    let mut parents = KeyVec::new();
    let mut seen = FxHashSet::default();
    for keys in factor_key_sets {
        for &key in keys {
            if !frontal_set.contains(&key) && seen.insert(key) {
                parents.push(key);
            }
        }
    }

    let residual = SymbolicFactor {
        keys: parents.clone(),
    };
    (SymbolicConditional { frontals, parents }, residual)
}
