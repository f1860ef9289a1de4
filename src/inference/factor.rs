//! The minimal contract a factor type must satisfy.

use crate::inference::key::Key;

/// A factor over a subset of variables.
///
/// The junction-tree core is generic over the concrete factor type and
/// requires only this one method: a factor must report the keys of the
/// variables it involves. Numeric content is never evaluated, linearized,
/// or otherwise inspected, so any factor representation (symbolic,
/// Gaussian, discrete) plugs in unchanged.
pub trait Factor {
    /// Returns the keys of the variables this factor involves.
    fn keys(&self) -> &[Key];
}
