//! A loaded dynamic network.
//!
//! `Session` owns the element registry, the attribute store and the ingest
//! statistics of one network. It is a plain owned value: ingestion mutates it
//! from a single thread, and `SyncSession` shares it once loading is done.
//!
//! # Examples
//!
//! ```rust
//! use tempograph::{AttrValue, AttributeKey, Identity, Interval, Session, Window};
//!
//! let mut session = Session::new();
//! session.create_network(Some("net"), None, Interval::unbounded(), true)?;
//! let n1 = session.create_node(Some("n1"), None, Interval::open(0.0))?;
//! session.record(
//!     Identity::Node(n1),
//!     AttributeKey::attribute("color"),
//!     AttrValue::String("red".into()),
//!     "string",
//!     Interval::new(0.0, 5.0),
//! )?;
//!
//! let delta = session.advance_window(Window::EMPTY, Window::new(1.0, 2.0))?;
//! assert_eq!(delta.nodes.len(), 2); // existence and color
//! # Ok::<(), tempograph::TempographError>(())
//! ```

pub mod player;
pub mod query;
pub mod sync;

pub use player::{CancelToken, Direction, TimeSlider, WindowPlayer};
pub use query::WindowDelta;
pub use sync::SyncSession;

use crate::error::{Result, TempographError};
use crate::graph::{EdgeOutcome, GraphModel, Identity, NodeId, PendingEdge, Resolution};
use crate::store::{AttributeKey, TemporalAttributeStore};
use crate::types::{Config, IngestStats};
use tempograph_types::interval::Interval;
use tempograph_types::value::AttrValue;

#[derive(Debug)]
pub struct Session {
    config: Config,
    graph: GraphModel,
    store: TemporalAttributeStore,
    stats: IngestStats,
}

impl Session {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            graph: GraphModel::new(),
            store: TemporalAttributeStore::new(),
            stats: IngestStats::new(),
        }
    }

    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(TempographError::Config)?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn create_network(
        &mut self,
        id: Option<&str>,
        label: Option<&str>,
        existence: Interval,
        directed: bool,
    ) -> Result<()> {
        let network = self.graph.create_network(id, label, existence, directed)?;
        log::debug!("Created network '{}' ({})", network.id, network.label);
        self.store.record_existence(Identity::Network, existence)?;
        Ok(())
    }

    pub fn create_node(
        &mut self,
        id: Option<&str>,
        label: Option<&str>,
        existence: Interval,
    ) -> Result<NodeId> {
        let node = self.graph.create_node(id, label, existence)?;
        self.store.record_existence(Identity::Node(node), existence)?;
        self.stats.nodes += 1;
        Ok(node)
    }

    /// Declare an edge. Pending edges are handed back untouched.
    pub fn create_edge(&mut self, pending: PendingEdge) -> Result<EdgeOutcome> {
        let existence = pending.existence;
        let outcome = self.graph.create_edge(pending)?;
        if let EdgeOutcome::Created(edge) = outcome {
            self.store.record_existence(Identity::Edge(edge), existence)?;
            self.stats.edges += 1;
        }
        Ok(outcome)
    }

    pub fn resolve(&mut self, pending: &PendingEdge) -> Result<Resolution> {
        let resolution = self.graph.resolve(pending)?;
        if let Resolution::Resolved(edge) = resolution {
            self.store
                .record_existence(Identity::Edge(edge), pending.existence)?;
            self.stats.edges += 1;
        }
        Ok(resolution)
    }

    /// Store an attribute, graphics or dynamics interval for an existing
    /// element.
    pub fn record(
        &mut self,
        identity: Identity,
        key: AttributeKey,
        value: AttrValue,
        raw_type: impl Into<String>,
        interval: Interval,
    ) -> Result<()> {
        if self.graph.lookup(identity).is_none() {
            return Err(TempographError::UnknownElement(identity.to_string()));
        }
        self.store.record(identity, key, value, raw_type, interval)?;
        self.stats.record_attribute();
        Ok(())
    }

    /// Whether `identity` has an open interval under `key`.
    pub fn has_open(&self, identity: Identity, key: &AttributeKey) -> bool {
        self.store.has_open(identity, key)
    }

    /// Close an open interval. Closing the existence key also refines the
    /// element's existence in the graph model.
    pub fn backfill(
        &mut self,
        identity: Identity,
        key: &AttributeKey,
        end: f64,
    ) -> Result<Interval> {
        let closed = self.store.backfill_end(identity, key, end)?;
        if *key == AttributeKey::Existence {
            self.graph.refine_end(identity, end)?;
        }
        self.stats.record_backfill();
        Ok(closed)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn store(&self) -> &TemporalAttributeStore {
        &self.store
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut IngestStats {
        &mut self.stats
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
