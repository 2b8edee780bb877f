//! Window queries over an `IntervalIndex`.
//!
//! `overlapping` answers "what is visible in this window", `changed` answers
//! "what flips visibility when the window moves", and `active_at` picks the
//! single value to display at an instant.

use super::interval_tree::{EntryId, IndexedInterval, IntervalIndex, NodeIdx, compare_time};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tempograph_types::interval::Window;

/// Direction of a visibility flip between two windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Visible in the new window only
    Entered,
    /// Visible in the previous window only
    Left,
}

impl Transition {
    pub fn reversed(self) -> Self {
        match self {
            Self::Entered => Self::Left,
            Self::Left => Self::Entered,
        }
    }
}

type Stack = SmallVec<[NodeIdx; 32]>;

impl<T> IntervalIndex<T> {
    /// Ids of every interval with `start < window.high && end > window.low`,
    /// in insertion order. `O(log n + k)`.
    pub fn overlapping_ids(&self, window: &Window) -> Vec<EntryId> {
        let mut out = Vec::new();
        let mut stack: Stack = self.root.into_iter().collect();

        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.max_end <= window.low {
                continue;
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
            if node.start < window.high {
                if node.bucket_max_end > window.low {
                    out.extend(
                        node.entries
                            .iter()
                            .copied()
                            .filter(|&id| self.entries[id].interval.end > window.low),
                    );
                }
                if let Some(right) = node.right {
                    stack.push(right);
                }
            }
        }

        out.sort_unstable();
        out
    }

    pub fn overlapping(&self, window: &Window) -> Vec<(EntryId, &IndexedInterval<T>)> {
        self.overlapping_ids(window)
            .into_iter()
            .map(|id| (id, &self.entries[id]))
            .collect()
    }

    /// Symmetric difference of the overlap sets of two windows.
    ///
    /// Intervals visible in both windows, or in neither, are not reported.
    /// The result is ordered by insertion.
    pub fn changed(&self, previous: &Window, new: &Window) -> Vec<(EntryId, Transition)> {
        let before = self.overlapping_ids(previous);
        let after = self.overlapping_ids(new);

        let mut out = Vec::with_capacity(before.len().max(after.len()));
        let (mut i, mut j) = (0, 0);
        while i < before.len() && j < after.len() {
            match before[i].cmp(&after[j]) {
                std::cmp::Ordering::Less => {
                    out.push((before[i], Transition::Left));
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    out.push((after[j], Transition::Entered));
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend(before[i..].iter().map(|&id| (id, Transition::Left)));
        out.extend(after[j..].iter().map(|&id| (id, Transition::Entered)));
        out
    }

    /// Ids of every interval containing the instant `t`, in insertion order.
    pub fn stabbing_ids(&self, t: f64) -> Vec<EntryId> {
        let mut out = Vec::new();
        let mut stack: Stack = self.root.into_iter().collect();

        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.max_end < t {
                continue;
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
            if node.start <= t {
                out.extend(
                    node.entries
                        .iter()
                        .copied()
                        .filter(|&id| self.entries[id].interval.contains_time(t)),
                );
                if let Some(right) = node.right {
                    stack.push(right);
                }
            }
        }

        out.sort_unstable();
        out
    }

    /// The interval to display at `t` among those accepted by `filter`.
    ///
    /// The latest start wins; on equal starts the later insertion wins.
    pub fn active_at<F>(&self, t: f64, filter: F) -> Option<EntryId>
    where
        F: Fn(&T) -> bool,
    {
        self.stabbing_ids(t)
            .into_iter()
            .filter(|&id| filter(&self.entries[id].payload))
            .max_by(|&a, &b| {
                compare_time(
                    self.entries[a].interval.start,
                    self.entries[b].interval.start,
                )
                .then(a.cmp(&b))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempograph_types::interval::Interval;

    fn sample() -> IntervalIndex<&'static str> {
        let mut index = IntervalIndex::new();
        index.insert(Interval::new(0.0, 5.0), "a").unwrap();
        index.insert(Interval::new(5.0, 10.0), "b").unwrap();
        index.insert(Interval::new(2.0, 8.0), "c").unwrap();
        index.insert(Interval::new(7.0, 7.0), "instant").unwrap();
        index.insert(Interval::unbounded(), "always").unwrap();
        index
    }

    #[test]
    fn test_overlapping_uses_open_test() {
        let index = sample();
        assert_eq!(index.overlapping_ids(&Window::new(5.0, 6.0)), vec![1, 2, 4]);
        // The instant at 7 lies strictly inside [6, 8)
        assert_eq!(
            index.overlapping_ids(&Window::new(6.0, 8.0)),
            vec![1, 2, 3, 4]
        );
        assert_eq!(index.overlapping_ids(&Window::EMPTY), Vec::<EntryId>::new());
    }

    #[test]
    fn test_changed_reports_both_directions() {
        let mut index = IntervalIndex::new();
        index.insert(Interval::new(0.0, 5.0), "red").unwrap();
        index.insert(Interval::new(5.0, 10.0), "blue").unwrap();

        let delta = index.changed(&Window::new(0.0, 5.0), &Window::new(5.0, 10.0));
        assert_eq!(delta, vec![(0, Transition::Left), (1, Transition::Entered)]);
    }

    #[test]
    fn test_changed_same_window_is_empty() {
        let index = sample();
        let w = Window::new(1.0, 6.0);
        assert!(index.changed(&w, &w).is_empty());
    }

    #[test]
    fn test_changed_from_empty_window_is_plain_overlap() {
        let index = sample();
        let w = Window::new(1.0, 3.0);
        let entered: Vec<EntryId> = index
            .changed(&Window::EMPTY, &w)
            .into_iter()
            .map(|(id, transition)| {
                assert_eq!(transition, Transition::Entered);
                id
            })
            .collect();
        assert_eq!(entered, index.overlapping_ids(&w));
    }

    #[test]
    fn test_stabbing_half_open_and_instants() {
        let index = sample();
        assert_eq!(index.stabbing_ids(5.0), vec![1, 2, 4]);
        assert_eq!(index.stabbing_ids(7.0), vec![1, 2, 3, 4]);
        assert_eq!(index.stabbing_ids(-100.0), vec![4]);
    }

    #[test]
    fn test_active_prefers_latest_start_then_latest_insert() {
        let mut index = IntervalIndex::new();
        index.insert(Interval::new(0.0, 10.0), "old").unwrap();
        index.insert(Interval::new(3.0, 10.0), "newer-start").unwrap();
        index.insert(Interval::new(3.0, 10.0), "same-start-later").unwrap();

        let active = index.active_at(4.0, |_| true).unwrap();
        assert_eq!(index.get(active).unwrap().payload, "same-start-later");

        let active = index.active_at(1.0, |_| true).unwrap();
        assert_eq!(index.get(active).unwrap().payload, "old");

        let filtered = index.active_at(4.0, |p| *p == "old").unwrap();
        assert_eq!(filtered, 0);
        assert_eq!(index.active_at(11.0, |_| true), None);
    }
}
