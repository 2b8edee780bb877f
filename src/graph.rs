//! Element registry for one dynamic network.
//!
//! The model owns the network record, its nodes and its edges, and the
//! lookup tables from declared ids to handles. Elements are created once and
//! never removed; only the end of an open existence interval may change.

use crate::compute::validation::validate_interval;
use crate::error::{Result, TempographError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tempograph_types::interval::Interval;

/// Handle of a node inside its `GraphModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Handle of an edge inside its `GraphModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

/// The element an interval belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Identity {
    Network,
    Node(NodeId),
    Edge(EdgeId),
}

impl Identity {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Network => ElementKind::Network,
            Self::Node(_) => ElementKind::Node,
            Self::Edge(_) => ElementKind::Edge,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => f.write_str("network"),
            Self::Node(id) => write!(f, "node#{}", id.0),
            Self::Edge(id) => write!(f, "edge#{}", id.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Network,
    Node,
    Edge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Network => "network",
            Self::Node => "node",
            Self::Edge => "edge",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub id: String,
    pub label: String,
    pub directed: bool,
    pub existence: Interval,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub key: String,
    pub label: String,
    pub existence: Interval,
    pub out_edges: Vec<EdgeId>,
    pub in_edges: Vec<EdgeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub key: String,
    pub label: String,
    pub source: NodeId,
    pub target: NodeId,
    pub existence: Interval,
}

/// An edge declaration whose endpoints are referenced by declared id.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdge {
    pub id: Option<String>,
    pub label: Option<String>,
    pub source: String,
    pub target: String,
    pub existence: Interval,
}

impl PendingEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, existence: Interval) -> Self {
        Self {
            id: None,
            label: None,
            source: source.into(),
            target: target.into(),
            existence,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label, falling back to `source-target`.
    pub fn resolved_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.source, self.target))
    }

    /// Declared id, falling back to the label.
    pub fn resolved_key(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.resolved_label())
    }
}

/// Result of declaring an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeOutcome {
    Created(EdgeId),
    /// At least one endpoint is not known yet; the declaration is handed back.
    Pending(PendingEdge),
}

/// Result of retrying a pending edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(EdgeId),
    StillPending,
}

/// Borrowed view of any element.
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    Network(&'a NetworkInfo),
    Node(&'a Node),
    Edge(&'a Edge),
}

impl ElementRef<'_> {
    pub fn label(&self) -> &str {
        match self {
            Self::Network(n) => &n.label,
            Self::Node(n) => &n.label,
            Self::Edge(e) => &e.label,
        }
    }

    pub fn existence(&self) -> Interval {
        match self {
            Self::Network(n) => n.existence,
            Self::Node(n) => n.existence,
            Self::Edge(e) => e.existence,
        }
    }
}

/// Nodes, edges and the network record of one session.
#[derive(Debug, Default)]
pub struct GraphModel {
    network: Option<NetworkInfo>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_keys: FxHashMap<String, NodeId>,
    edge_keys: FxHashMap<String, EdgeId>,
    label_counter: u32,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_synthetic(&mut self) -> u32 {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    /// Declare the network. A missing label becomes `dynamic network (N)`
    /// and a missing id falls back to the label.
    pub fn create_network(
        &mut self,
        id: Option<&str>,
        label: Option<&str>,
        existence: Interval,
        directed: bool,
    ) -> Result<&NetworkInfo> {
        if let Some(existing) = &self.network {
            return Err(TempographError::DuplicateIdentity {
                kind: ElementKind::Network,
                id: existing.id.clone(),
            });
        }
        validate_interval(&existence)?;

        let label = match label {
            Some(label) => label.to_string(),
            None => format!("dynamic network ({})", self.next_synthetic()),
        };
        let id = id.map_or_else(|| label.clone(), str::to_string);

        Ok(&*self.network.insert(NetworkInfo {
            id,
            label,
            directed,
            existence,
        }))
    }

    /// Declare a node. The id falls back to the label; with neither, a
    /// `node (N)` label is synthesised.
    pub fn create_node(
        &mut self,
        id: Option<&str>,
        label: Option<&str>,
        existence: Interval,
    ) -> Result<NodeId> {
        validate_interval(&existence)?;

        let (key, label) = match (id, label) {
            (Some(id), Some(label)) => (id.to_string(), label.to_string()),
            (Some(id), None) => (id.to_string(), id.to_string()),
            (None, Some(label)) => (label.to_string(), label.to_string()),
            (None, None) => {
                let label = format!("node ({})", self.next_synthetic());
                (label.clone(), label)
            }
        };

        if self.node_keys.contains_key(&key) {
            return Err(TempographError::DuplicateIdentity {
                kind: ElementKind::Node,
                id: key,
            });
        }

        let node_id = NodeId(self.nodes.len() as u32);
        self.node_keys.insert(key.clone(), node_id);
        self.nodes.push(Node {
            key,
            label,
            existence,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        });
        Ok(node_id)
    }

    /// Declare an edge. Unknown endpoints are not an error: the declaration
    /// comes back as `EdgeOutcome::Pending` for a later `resolve`.
    pub fn create_edge(&mut self, pending: PendingEdge) -> Result<EdgeOutcome> {
        validate_interval(&pending.existence)?;

        let key = pending.resolved_key();
        if self.edge_keys.contains_key(&key) {
            return Err(TempographError::DuplicateIdentity {
                kind: ElementKind::Edge,
                id: key,
            });
        }

        let (Some(&source), Some(&target)) = (
            self.node_keys.get(&pending.source),
            self.node_keys.get(&pending.target),
        ) else {
            return Ok(EdgeOutcome::Pending(pending));
        };

        let edge_id = EdgeId(self.edges.len() as u32);
        let label = pending.resolved_label();
        self.edge_keys.insert(key.clone(), edge_id);
        self.edges.push(Edge {
            key,
            label,
            source,
            target,
            existence: pending.existence,
        });
        self.nodes[source.0 as usize].out_edges.push(edge_id);
        self.nodes[target.0 as usize].in_edges.push(edge_id);
        Ok(EdgeOutcome::Created(edge_id))
    }

    /// Retry a pending edge now that more nodes may exist.
    pub fn resolve(&mut self, pending: &PendingEdge) -> Result<Resolution> {
        match self.create_edge(pending.clone())? {
            EdgeOutcome::Created(id) => Ok(Resolution::Resolved(id)),
            EdgeOutcome::Pending(_) => Ok(Resolution::StillPending),
        }
    }

    /// Close the open existence interval of an element.
    pub fn refine_end(&mut self, identity: Identity, end: f64) -> Result<Interval> {
        let existence = match identity {
            Identity::Network => self.network.as_mut().map(|n| &mut n.existence),
            Identity::Node(id) => self.nodes.get_mut(id.0 as usize).map(|n| &mut n.existence),
            Identity::Edge(id) => self.edges.get_mut(id.0 as usize).map(|e| &mut e.existence),
        }
        .ok_or_else(|| TempographError::UnknownElement(identity.to_string()))?;

        if !existence.is_open_ended() {
            return Err(TempographError::InvalidInterval(format!(
                "existence of {} is already closed at {}",
                identity, existence.end
            )));
        }

        let refined = Interval::new(existence.start, end);
        validate_interval(&refined)?;
        *existence = refined;
        Ok(refined)
    }

    pub fn network(&self) -> Option<&NetworkInfo> {
        self.network.as_ref()
    }

    pub fn lookup(&self, identity: Identity) -> Option<ElementRef<'_>> {
        match identity {
            Identity::Network => self.network.as_ref().map(ElementRef::Network),
            Identity::Node(id) => self.node(id).map(ElementRef::Node),
            Identity::Edge(id) => self.edge(id).map(ElementRef::Edge),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize)
    }

    pub fn node_by_key(&self, key: &str) -> Option<NodeId> {
        self.node_keys.get(key).copied()
    }

    pub fn edge_by_key(&self, key: &str) -> Option<EdgeId> {
        self.edge_keys.get(key).copied()
    }

    pub fn edge_endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edge(id).map(|e| (e.source, e.target))
    }

    pub fn out_edges(&self, id: NodeId) -> &[EdgeId] {
        self.node(id)
            .map(|n| n.out_edges.as_slice())
            .unwrap_or_default()
    }

    pub fn in_edges(&self, id: NodeId) -> &[EdgeId] {
        self.node(id)
            .map(|n| n.in_edges.as_slice())
            .unwrap_or_default()
    }

    /// Adjacent nodes in either direction, without duplicates, in edge order.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let outgoing = self.out_edges(id).iter().filter_map(|&e| self.edge(e)).map(|e| e.target);
        let incoming = self.in_edges(id).iter().filter_map(|&e| self.edge(e)).map(|e| e.source);
        for n in outgoing.chain(incoming) {
            if !out.contains(&n) {
                out.push(n);
            }
        }
        out
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i as u32), e))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
