//! Variable identifiers.

use std::fmt;

/// A unique identifier for one variable of a factor graph.
///
/// Keys are dense integers assigned by the upstream variable-ordering
/// stage. The ordering of the inner `u64` carries no semantic meaning for
/// junction-tree construction; only equality is consulted.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Key(pub u64);

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
