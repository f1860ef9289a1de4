//! The junction-tree construction core.
//!
//! This module provides:
//! - **errors**: Error types for construction failures
//! - **key**: Variable identifiers
//! - **factor**: The minimal contract a factor type must satisfy
//! - **symbolic**: Symbolic factors, conditionals, and the elimination primitive
//! - **elimination_tree**: The read-only input tree model
//! - **traversal**: Generic depth-first forest traversal driver
//! - **junction_tree**: The clique-merging junction-tree constructor

pub mod elimination_tree;
pub mod errors;
pub mod factor;
pub mod junction_tree;
pub mod key;
pub mod symbolic;
pub mod traversal;
