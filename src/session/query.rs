//! Windowed change queries for renderers.
//!
//! A renderer keeps the window it displayed last and asks for the delta to
//! the next one. Only intervals whose visibility flips are returned, so a
//! step along the timeline costs time proportional to what changed.

use super::Session;
use crate::compute::validation::validate_window;
use crate::error::Result;
use crate::graph::{EdgeId, ElementKind, Identity, NodeId};
use crate::store::{AttributeKey, ChangedAttribute};
use serde::{Deserialize, Serialize};
use tempograph_types::interval::Window;
use tempograph_types::value::AttrValue;

/// Everything that flipped visibility between two windows, per element kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowDelta {
    pub graph: Vec<ChangedAttribute>,
    pub nodes: Vec<ChangedAttribute>,
    pub edges: Vec<ChangedAttribute>,
}

impl WindowDelta {
    pub fn len(&self) -> usize {
        self.graph.len() + self.nodes.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All changes: network first, then nodes, then edges.
    pub fn iter(&self) -> impl Iterator<Item = &ChangedAttribute> {
        self.graph.iter().chain(&self.nodes).chain(&self.edges)
    }
}

impl Session {
    /// Delta between the window shown last and the next one.
    ///
    /// Pass `Window::EMPTY` as `previous` for the first frame; every visible
    /// interval is then reported as entered.
    pub fn advance_window(&self, previous: Window, new: Window) -> Result<WindowDelta> {
        validate_window(&previous)?;
        validate_window(&new)?;

        let delta = WindowDelta {
            graph: self.store.changed_since(ElementKind::Network, None, &previous, &new),
            nodes: self.store.changed_since(ElementKind::Node, None, &previous, &new),
            edges: self.store.changed_since(ElementKind::Edge, None, &previous, &new),
        };
        log::debug!(
            "Window {} -> {}: {} network, {} node, {} edge changes",
            previous,
            new,
            delta.graph.len(),
            delta.nodes.len(),
            delta.edges.len()
        );
        Ok(delta)
    }

    /// Delta restricted to one element kind, optionally to one key.
    pub fn changed_since(
        &self,
        kind: ElementKind,
        key: Option<&AttributeKey>,
        previous: Window,
        new: Window,
    ) -> Result<Vec<ChangedAttribute>> {
        validate_window(&previous)?;
        validate_window(&new)?;
        Ok(self.store.changed_since(kind, key, &previous, &new))
    }

    /// Value in effect at `t`; the latest start wins, then the latest
    /// declaration.
    pub fn current_active_value(
        &self,
        identity: Identity,
        key: &AttributeKey,
        t: f64,
    ) -> Option<&AttrValue> {
        self.store.active_value(identity, key, t)
    }

    /// Smallest finite time stamp ever recorded.
    pub fn min_time(&self) -> Option<f64> {
        self.store.min_time()
    }

    /// Largest finite time stamp ever recorded.
    pub fn max_time(&self) -> Option<f64> {
        self.store.max_time()
    }

    /// Nodes whose existence overlaps `window`, in handle order.
    pub fn visible_nodes(&self, window: Window) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .store
            .overlapping(ElementKind::Node, &AttributeKey::Existence, &window)
            .into_iter()
            .filter_map(|(_, record)| match record.identity {
                Identity::Node(id) => Some(id),
                _ => None,
            })
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// Edges whose existence overlaps `window`, in handle order.
    pub fn visible_edges(&self, window: Window) -> Vec<EdgeId> {
        let mut edges: Vec<EdgeId> = self
            .store
            .overlapping(ElementKind::Edge, &AttributeKey::Existence, &window)
            .into_iter()
            .filter_map(|(_, record)| match record.identity {
                Identity::Edge(id) => Some(id),
                _ => None,
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::temporal::Transition;
    use crate::graph::PendingEdge;
    use tempograph_types::interval::Interval;

    fn small_session() -> Session {
        let mut session = Session::new();
        session
            .create_network(None, None, Interval::unbounded(), true)
            .unwrap();
        session.create_node(Some("a"), None, Interval::new(0.0, 4.0)).unwrap();
        session.create_node(Some("b"), None, Interval::new(2.0, 8.0)).unwrap();
        session
            .create_edge(PendingEdge::new("a", "b", Interval::new(2.0, 4.0)))
            .unwrap();
        session
    }

    #[test]
    fn test_visible_sets_follow_existence() {
        let session = small_session();
        assert_eq!(session.visible_nodes(Window::new(0.0, 1.0)), vec![NodeId(0)]);
        assert_eq!(
            session.visible_nodes(Window::new(3.0, 3.5)),
            vec![NodeId(0), NodeId(1)]
        );
        assert_eq!(session.visible_edges(Window::new(3.0, 3.5)), vec![EdgeId(0)]);
        assert!(session.visible_edges(Window::new(4.0, 5.0)).is_empty());
    }

    #[test]
    fn test_advance_window_groups_by_kind() {
        let session = small_session();
        let first = session
            .advance_window(Window::EMPTY, Window::new(0.0, 1.0))
            .unwrap();
        assert_eq!(first.graph.len(), 1);
        assert_eq!(first.nodes.len(), 1);
        assert!(first.edges.is_empty());

        let second = session
            .advance_window(Window::new(0.0, 1.0), Window::new(4.0, 5.0))
            .unwrap();
        let transitions: Vec<(Identity, Transition)> =
            second.nodes.iter().map(|c| (c.identity, c.transition)).collect();
        assert_eq!(
            transitions,
            vec![
                (Identity::Node(NodeId(0)), Transition::Left),
                (Identity::Node(NodeId(1)), Transition::Entered),
            ]
        );
        assert!(second.graph.is_empty());
    }

    #[test]
    fn test_malformed_window_is_rejected() {
        let session = small_session();
        assert!(session
            .advance_window(Window::new(5.0, 1.0), Window::new(0.0, 1.0))
            .is_err());
        assert!(session
            .changed_since(ElementKind::Node, None, Window::EMPTY, Window::new(f64::NAN, 1.0))
            .is_err());
    }
}
