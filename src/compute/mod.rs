//! Compute layer for temporal indexing and validation.
//!
//! This module keeps the interval algorithms apart from the graph registry
//! and the attribute store that use them:
//! - `temporal`: augmented interval tree and its window queries
//! - `validation`: interval, time bound and attribute name checks

pub mod temporal;
pub mod validation;
