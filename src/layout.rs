//! Time-dependent node positions and the per-view layout registry.
//!
//! A `DynLayout` stores node positions as intervals in its own interval
//! index, so a view can ask where every node sits at a given instant. Views
//! own at most one layout each; the registry is keyed by view id and entries
//! are removed explicitly when a view is torn down.

use crate::compute::temporal::{EntryId, IntervalIndex};
use crate::compute::temporal::interval_tree::compare_time;
use crate::error::Result;
use crate::graph::NodeId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tempograph_types::interval::Interval;
use uuid::Uuid;

/// Identifier of a rendered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node positions over time for one view.
#[derive(Debug, Clone, Default)]
pub struct DynLayout {
    positions: IntervalIndex<(NodeId, Position)>,
}

impl DynLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `node` at `position` for `interval`.
    pub fn add_position(
        &mut self,
        node: NodeId,
        position: Position,
        interval: Interval,
    ) -> Result<EntryId> {
        self.positions.insert(interval, (node, position))
    }

    /// Position of one node at `t`.
    pub fn position_at(&self, node: NodeId, t: f64) -> Option<Position> {
        let entry = self.positions.active_at(t, |(n, _)| *n == node)?;
        self.positions.get(entry).map(|e| e.payload.1)
    }

    /// Position of every placed node at `t`, in node order.
    ///
    /// Where a node has several positions at `t` the latest start wins, then
    /// the latest insertion.
    pub fn positions_at(&self, t: f64) -> Vec<(NodeId, Position)> {
        let mut best: FxHashMap<NodeId, EntryId> = FxHashMap::default();
        for entry in self.positions.stabbing_ids(t) {
            let Some(candidate) = self.positions.get(entry) else {
                continue;
            };
            let node = candidate.payload.0;
            let replace = match best.get(&node).and_then(|&id| self.positions.get(id)) {
                // Ids ascend, so an equal start means a later insertion.
                Some(current) => {
                    compare_time(candidate.interval.start, current.interval.start) != Ordering::Less
                }
                None => true,
            };
            if replace {
                best.insert(node, entry);
            }
        }

        let mut out: Vec<(NodeId, Position)> = best
            .into_iter()
            .filter_map(|(node, entry)| self.positions.get(entry).map(|e| (node, e.payload.1)))
            .collect();
        out.sort_unstable_by_key(|(node, _)| *node);
        out
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Layouts of live views.
#[derive(Debug, Default)]
pub struct LayoutRegistry {
    layouts: FxHashMap<ViewId, DynLayout>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `layout` to `view`, returning the layout it replaces.
    pub fn register(&mut self, view: ViewId, layout: DynLayout) -> Option<DynLayout> {
        log::debug!("Registering layout for view {}", view);
        self.layouts.insert(view, layout)
    }

    pub fn get(&self, view: &ViewId) -> Option<&DynLayout> {
        self.layouts.get(view)
    }

    pub fn get_mut(&mut self, view: &ViewId) -> Option<&mut DynLayout> {
        self.layouts.get_mut(view)
    }

    /// Layout for `view`, created empty on first use.
    pub fn get_or_create(&mut self, view: ViewId) -> &mut DynLayout {
        self.layouts.entry(view).or_default()
    }

    /// Drop the layout of a view that is being torn down.
    pub fn remove(&mut self, view: &ViewId) -> Option<DynLayout> {
        self.layouts.remove(view)
    }

    pub fn contains(&self, view: &ViewId) -> bool {
        self.layouts.contains_key(view)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ViewId, &DynLayout)> {
        self.layouts.iter()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}
