//! Augmented interval tree.
//!
//! Intervals are grouped by their start endpoint: every tree node owns one
//! distinct start value and a bucket of the entries sharing it, kept in
//! insertion order. The tree is an AVL tree over those start values and each
//! node caches the largest `end` found in its subtree, which is what lets
//! window queries skip whole subtrees that finish too early.
//!
//! Nodes and entries live in arenas (`Vec`s) and refer to each other by
//! index. Nothing is ever removed: attribute history is append-only for the
//! lifetime of a session.

use crate::compute::validation::validate_interval;
use crate::error::{Result, TempographError};
use smallvec::SmallVec;
use std::cmp::Ordering;
use tempograph_types::interval::Interval;

/// Stable handle of an inserted interval. Handles grow with insertion order.
pub type EntryId = usize;

pub(super) type NodeIdx = usize;

/// Total order on validated time values. `NaN` never reaches the tree.
pub(crate) fn compare_time(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// An interval together with the data it qualifies.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedInterval<T> {
    pub interval: Interval,
    pub payload: T,
}

#[derive(Debug, Clone)]
pub(super) struct TreeNode {
    pub(super) start: f64,
    pub(super) entries: SmallVec<[EntryId; 2]>,
    /// Largest end among `entries`
    pub(super) bucket_max_end: f64,
    /// Largest end in the whole subtree rooted here
    pub(super) max_end: f64,
    height: i32,
    pub(super) left: Option<NodeIdx>,
    pub(super) right: Option<NodeIdx>,
}

impl TreeNode {
    fn leaf(start: f64, id: EntryId, end: f64) -> Self {
        let mut entries = SmallVec::new();
        entries.push(id);
        Self {
            start,
            entries,
            bucket_max_end: end,
            max_end: end,
            height: 1,
            left: None,
            right: None,
        }
    }
}

/// Finite minimum and maximum over every bound ever inserted.
///
/// Infinite sentinels are ignored so the bounds can size a time slider.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeBounds {
    min: Option<f64>,
    max: Option<f64>,
}

impl TimeBounds {
    pub fn observe(&mut self, t: f64) {
        if !t.is_finite() {
            return;
        }
        self.min = Some(self.min.map_or(t, |m| m.min(t)));
        self.max = Some(self.max.map_or(t, |m| m.max(t)));
    }

    pub fn merge(&mut self, other: &TimeBounds) {
        if let Some(min) = other.min {
            self.observe(min);
        }
        if let Some(max) = other.max {
            self.observe(max);
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

/// Augmented AVL interval tree over one timeline partition.
///
/// # Examples
///
/// ```rust
/// use tempograph::compute::temporal::IntervalIndex;
/// use tempograph::{Interval, Window};
///
/// let mut index = IntervalIndex::new();
/// index.insert(Interval::new(0.0, 5.0), "red")?;
/// index.insert(Interval::new(5.0, 10.0), "blue")?;
///
/// let visible = index.overlapping(&Window::new(4.0, 6.0));
/// assert_eq!(visible.len(), 2);
/// # Ok::<(), tempograph::TempographError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    pub(super) nodes: Vec<TreeNode>,
    pub(super) entries: Vec<IndexedInterval<T>>,
    pub(super) root: Option<NodeIdx>,
    bounds: TimeBounds,
}

impl<T> IntervalIndex<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            entries: Vec::new(),
            root: None,
            bounds: TimeBounds::default(),
        }
    }

    /// Insert an interval, `O(log n)`.
    ///
    /// Malformed intervals are rejected with `InvalidInterval` before the
    /// tree is touched.
    pub fn insert(&mut self, interval: Interval, payload: T) -> Result<EntryId> {
        validate_interval(&interval)?;

        let id = self.entries.len();
        self.entries.push(IndexedInterval { interval, payload });

        let root = self.root;
        self.root = Some(self.insert_at(root, id));

        self.bounds.observe(interval.start);
        self.bounds.observe(interval.end);
        Ok(id)
    }

    /// Replace the end of an already stored interval and repair the cached
    /// subtree maxima on the search path.
    pub fn backfill_end(&mut self, id: EntryId, end: f64) -> Result<()> {
        let Some(entry) = self.entries.get(id) else {
            return Err(TempographError::UnknownElement(format!(
                "interval entry {}",
                id
            )));
        };

        let updated = Interval::new(entry.interval.start, end);
        validate_interval(&updated)?;
        self.entries[id].interval = updated;

        if let Some(root) = self.root {
            self.refresh_path(root, updated.start);
        }
        self.bounds.observe(end);
        Ok(())
    }

    pub fn get(&self, id: EntryId) -> Option<&IndexedInterval<T>> {
        self.entries.get(id)
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &IndexedInterval<T>)> {
        self.entries.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct start endpoints.
    pub fn distinct_starts(&self) -> usize {
        self.nodes.len()
    }

    /// Height of the tree; `0` when empty.
    pub fn depth(&self) -> usize {
        self.height(self.root) as usize
    }

    pub fn bounds(&self) -> TimeBounds {
        self.bounds
    }

    fn insert_at(&mut self, node: Option<NodeIdx>, id: EntryId) -> NodeIdx {
        let interval = self.entries[id].interval;

        let Some(idx) = node else {
            self.nodes.push(TreeNode::leaf(interval.start, id, interval.end));
            return self.nodes.len() - 1;
        };

        match compare_time(interval.start, self.nodes[idx].start) {
            Ordering::Less => {
                let child = self.nodes[idx].left;
                let child = self.insert_at(child, id);
                self.nodes[idx].left = Some(child);
            }
            Ordering::Greater => {
                let child = self.nodes[idx].right;
                let child = self.insert_at(child, id);
                self.nodes[idx].right = Some(child);
            }
            Ordering::Equal => {
                // Same start: append to the bucket, shape is unchanged.
                let node = &mut self.nodes[idx];
                node.entries.push(id);
                node.bucket_max_end = node.bucket_max_end.max(interval.end);
                self.refresh(idx);
                return idx;
            }
        }

        self.rebalance(idx)
    }

    fn refresh_path(&mut self, idx: NodeIdx, start: f64) {
        match compare_time(start, self.nodes[idx].start) {
            Ordering::Less => {
                if let Some(left) = self.nodes[idx].left {
                    self.refresh_path(left, start);
                }
            }
            Ordering::Greater => {
                if let Some(right) = self.nodes[idx].right {
                    self.refresh_path(right, start);
                }
            }
            Ordering::Equal => {
                let bucket_max_end = self.nodes[idx]
                    .entries
                    .iter()
                    .map(|&id| self.entries[id].interval.end)
                    .fold(f64::NEG_INFINITY, f64::max);
                self.nodes[idx].bucket_max_end = bucket_max_end;
            }
        }
        self.refresh(idx);
    }

    fn height(&self, node: Option<NodeIdx>) -> i32 {
        node.map_or(0, |idx| self.nodes[idx].height)
    }

    fn subtree_max_end(&self, node: Option<NodeIdx>) -> f64 {
        node.map_or(f64::NEG_INFINITY, |idx| self.nodes[idx].max_end)
    }

    fn balance_factor(&self, idx: NodeIdx) -> i32 {
        self.height(self.nodes[idx].left) - self.height(self.nodes[idx].right)
    }

    /// Recompute height and subtree max end from the children.
    fn refresh(&mut self, idx: NodeIdx) {
        let (left, right) = (self.nodes[idx].left, self.nodes[idx].right);
        let height = 1 + self.height(left).max(self.height(right));
        let max_end = self.nodes[idx]
            .bucket_max_end
            .max(self.subtree_max_end(left))
            .max(self.subtree_max_end(right));

        let node = &mut self.nodes[idx];
        node.height = height;
        node.max_end = max_end;
    }

    fn rotate_right(&mut self, idx: NodeIdx) -> NodeIdx {
        let Some(pivot) = self.nodes[idx].left else {
            return idx;
        };
        self.nodes[idx].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(idx);
        self.refresh(idx);
        self.refresh(pivot);
        pivot
    }

    fn rotate_left(&mut self, idx: NodeIdx) -> NodeIdx {
        let Some(pivot) = self.nodes[idx].right else {
            return idx;
        };
        self.nodes[idx].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(idx);
        self.refresh(idx);
        self.refresh(pivot);
        pivot
    }

    fn rebalance(&mut self, idx: NodeIdx) -> NodeIdx {
        self.refresh(idx);
        let balance = self.balance_factor(idx);

        if balance > 1 {
            if let Some(left) = self.nodes[idx].left
                && self.balance_factor(left) < 0
            {
                let rotated = self.rotate_left(left);
                self.nodes[idx].left = Some(rotated);
            }
            return self.rotate_right(idx);
        }

        if balance < -1 {
            if let Some(right) = self.nodes[idx].right
                && self.balance_factor(right) > 0
            {
                let rotated = self.rotate_right(right);
                self.nodes[idx].right = Some(rotated);
            }
            return self.rotate_left(idx);
        }

        idx
    }
}

impl<T> Default for IntervalIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walk the tree and check ordering, AVL balance and cached maxima.
    fn assert_invariants<T>(index: &IntervalIndex<T>) {
        fn walk<T>(
            index: &IntervalIndex<T>,
            node: Option<NodeIdx>,
            lower: f64,
            upper: f64,
        ) -> (i32, f64) {
            let Some(idx) = node else {
                return (0, f64::NEG_INFINITY);
            };
            let n = &index.nodes[idx];
            assert!(n.start >= lower && n.start <= upper, "BST order violated");

            let (lh, lmax) = walk(index, n.left, lower, n.start);
            let (rh, rmax) = walk(index, n.right, n.start, upper);
            assert!((lh - rh).abs() <= 1, "AVL balance violated");

            let bucket_max = n
                .entries
                .iter()
                .map(|&id| index.entries[id].interval.end)
                .fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(n.bucket_max_end, bucket_max);
            let expected = bucket_max.max(lmax).max(rmax);
            assert_eq!(n.max_end, expected, "stale subtree max end");
            assert_eq!(n.height, 1 + lh.max(rh));
            (n.height, expected)
        }
        walk(index, index.root, f64::NEG_INFINITY, f64::INFINITY);
    }

    #[test]
    fn test_insert_keeps_tree_balanced() {
        let mut index = IntervalIndex::new();
        for i in 0..1_000 {
            let start = i as f64;
            index.insert(Interval::new(start, start + 3.0), i).unwrap();
        }
        assert_invariants(&index);
        assert_eq!(index.len(), 1_000);
        // AVL height bound: 1.44 * log2(n + 2)
        assert!(index.depth() <= 15, "depth {} too large", index.depth());
    }

    #[test]
    fn test_equal_starts_share_a_node_in_insertion_order() {
        let mut index = IntervalIndex::new();
        let a = index.insert(Interval::new(1.0, 2.0), "a").unwrap();
        let b = index.insert(Interval::new(1.0, 9.0), "b").unwrap();
        let c = index.insert(Interval::new(1.0, 4.0), "c").unwrap();

        assert_eq!(index.distinct_starts(), 1);
        let root = index.root.unwrap();
        assert_eq!(index.nodes[root].entries.as_slice(), &[a, b, c]);
        assert_eq!(index.nodes[root].max_end, 9.0);
    }

    #[test]
    fn test_negative_zero_and_zero_are_the_same_start() {
        let mut index = IntervalIndex::new();
        index.insert(Interval::new(-0.0, 1.0), ()).unwrap();
        index.insert(Interval::new(0.0, 1.0), ()).unwrap();
        assert_eq!(index.distinct_starts(), 1);
    }

    #[test]
    fn test_invalid_interval_leaves_index_unchanged() {
        let mut index = IntervalIndex::new();
        index.insert(Interval::new(0.0, 1.0), ()).unwrap();

        let err = index.insert(Interval::new(5.0, 1.0), ()).unwrap_err();
        assert!(matches!(err, TempographError::InvalidInterval(_)));
        assert!(index.insert(Interval::new(f64::NAN, 1.0), ()).is_err());

        assert_eq!(index.len(), 1);
        assert_eq!(index.distinct_starts(), 1);
        assert_eq!(index.bounds().max(), Some(1.0));
    }

    #[test]
    fn test_backfill_repairs_subtree_max() {
        let mut index = IntervalIndex::new();
        for i in 0..64 {
            index
                .insert(Interval::new(i as f64, i as f64 + 1.0), i)
                .unwrap();
        }
        let open = index.insert(Interval::open(10.0), 99).unwrap();
        assert_invariants(&index);

        index.backfill_end(open, 12.5).unwrap();
        assert_invariants(&index);
        assert_eq!(index.get(open).unwrap().interval, Interval::new(10.0, 12.5));

        let root = index.root.unwrap();
        assert_eq!(index.nodes[root].max_end, 64.0);
    }

    #[test]
    fn test_backfill_rejects_end_before_start() {
        let mut index = IntervalIndex::new();
        let id = index.insert(Interval::open(10.0), ()).unwrap();
        assert!(index.backfill_end(id, 5.0).is_err());
        assert!(index.get(id).unwrap().interval.is_open_ended());
        assert!(index.backfill_end(42, 5.0).is_err());
    }

    #[test]
    fn test_bounds_ignore_infinite_sentinels() {
        let mut index = IntervalIndex::new();
        index.insert(Interval::unbounded(), ()).unwrap();
        assert_eq!(index.bounds(), TimeBounds::default());

        index.insert(Interval::open(3.0), ()).unwrap();
        index.insert(Interval::new(-2.0, 7.0), ()).unwrap();
        assert_eq!(index.bounds().min(), Some(-2.0));
        assert_eq!(index.bounds().max(), Some(7.0));
    }
}
