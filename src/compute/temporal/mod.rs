//! Temporal indexing and query processing.
//!
//! - `interval_tree`: the augmented AVL tree keyed by interval start
//! - `queries`: overlap, changed-in-window and active-value queries

pub mod interval_tree;
pub mod queries;

pub use interval_tree::{EntryId, IndexedInterval, IntervalIndex, TimeBounds};
pub use queries::Transition;
