//! Streaming network builder.
//!
//! `StreamingBuilder` turns parser events into sessions, one per network
//! element. Nodes and edges are materialised as soon as they are declared.
//! An edge whose endpoints are not known yet becomes an orphan: it and
//! everything declared inside it wait in a FIFO queue and are replayed,
//! in arrival order, when the network element closes.
//!
//! Errors are handled at three levels:
//! - a bad attribute, graphics property or time bound is logged, counted
//!   and skipped;
//! - a duplicate element id aborts the network, and the remaining events
//!   up to the network end are ignored;
//! - orphans still unresolved at network end are reported as
//!   `UnresolvedEdge`; the network is kept and flagged incomplete.

use super::coerce::{coerce_value, graphics_properties, graphics_value, parse_directed};
use super::event::{Attributes, ElementTag, EventSink, ParseEvent};
use super::orphan::{OrphanEdge, OrphanOp, OrphanQueue};
use crate::compute::validation::{
    check_attribute_name, parse_interval, parse_time_bound, validate_interval,
};
use crate::error::{Result, TempographError};
use crate::graph::{EdgeId, EdgeOutcome, ElementKind, Identity, NodeId, PendingEdge, Resolution};
use crate::session::Session;
use crate::store::AttributeKey;
use crate::types::Config;
use tempograph_types::interval::Interval;
use tempograph_types::value::AttrValue;

/// Where the builder is in the element hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InNetwork,
    InNode,
    InEdge,
    /// Inside an attribute, graphics or dynamics element
    InAttribute,
    /// A network just closed; the next event may open another one
    NetworkClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkStatus {
    Complete,
    /// Orphan edges never found their endpoints; everything else was loaded
    Incomplete { unresolved: Vec<String> },
    /// Loading stopped at a duplicate identity
    Aborted { reason: String },
}

/// A network produced by the builder.
#[derive(Debug)]
pub struct LoadedNetwork {
    pub session: Session,
    pub status: NetworkStatus,
}

impl LoadedNetwork {
    pub fn is_complete(&self) -> bool {
        self.status == NetworkStatus::Complete
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeContext {
    Created(EdgeId),
    /// The edge is the last entry of the orphan queue
    Pending,
    /// The declaration was rejected; its children are skipped
    Skipped,
}

/// Receiver of an attribute-level operation.
#[derive(Debug, Clone, Copy)]
enum Target {
    Element(Identity),
    Orphan,
}

/// Apply one store operation to an existing element.
fn replay(session: &mut Session, identity: Identity, op: OrphanOp) -> Result<()> {
    match op {
        OrphanOp::Record {
            key,
            value,
            raw_type,
            interval,
        } => session.record(identity, key, value, raw_type, interval),
        OrphanOp::Backfill { key, end } => session.backfill(identity, &key, end).map(|_| ()),
    }
}

fn no_network() -> TempographError {
    TempographError::UnexpectedEvent("element outside of a network".to_string())
}

fn attr<'a>(attributes: &'a Attributes, name: &str) -> Option<&'a str> {
    attributes.get(name).map(String::as_str)
}

fn required<'a>(
    attributes: &'a Attributes,
    tag: ElementTag,
    name: &'static str,
) -> Result<&'a str> {
    attr(attributes, name).ok_or(TempographError::MissingAttribute { element: tag, name })
}

/// Event-driven builder of dynamic networks.
///
/// # Examples
///
/// ```rust
/// use tempograph::stream::{ElementTag, ParseEvent, StreamingBuilder};
///
/// let events = [
///     ParseEvent::start(ElementTag::Network, [("label", "demo")]),
///     ParseEvent::start(ElementTag::Edge, [("source", "a"), ("target", "b")]),
///     ParseEvent::end(ElementTag::Edge),
///     ParseEvent::start(ElementTag::Node, [("id", "a")]),
///     ParseEvent::end(ElementTag::Node),
///     ParseEvent::start(ElementTag::Node, [("id", "b")]),
///     ParseEvent::end(ElementTag::Node),
///     ParseEvent::end(ElementTag::Network),
/// ];
///
/// let mut builder = StreamingBuilder::new();
/// for event in &events {
///     builder.apply(event)?;
/// }
/// let networks = builder.finish()?;
/// assert!(networks[0].is_complete());
/// assert_eq!(networks[0].session.graph().edge_count(), 1);
/// # Ok::<(), tempograph::TempographError>(())
/// ```
#[derive(Debug)]
pub struct StreamingBuilder {
    config: Config,
    session: Option<Session>,
    stack: Vec<ElementTag>,
    current_node: Option<NodeId>,
    current_edge: Option<EdgeContext>,
    orphans: OrphanQueue,
    aborted: Option<String>,
    closed: bool,
    loaded: Vec<LoadedNetwork>,
}

impl StreamingBuilder {
    pub fn new() -> Self {
        let config = Config::default();
        Self {
            orphans: OrphanQueue::new(config.orphan_warn_threshold),
            config,
            session: None,
            stack: Vec::new(),
            current_node: None,
            current_edge: None,
            aborted: None,
            closed: false,
            loaded: Vec::new(),
        }
    }

    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(TempographError::Config)?;
        Ok(Self {
            orphans: OrphanQueue::new(config.orphan_warn_threshold),
            config,
            ..Self::new()
        })
    }

    pub fn phase(&self) -> Phase {
        match self.stack.last() {
            None if self.closed => Phase::NetworkClosed,
            None => Phase::Idle,
            Some(ElementTag::Network) => Phase::InNetwork,
            Some(ElementTag::Node) => Phase::InNode,
            Some(ElementTag::Edge) => Phase::InEdge,
            Some(_) => Phase::InAttribute,
        }
    }

    /// Networks completed so far.
    pub fn loaded(&self) -> &[LoadedNetwork] {
        &self.loaded
    }

    /// The network currently being built.
    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Orphan edges waiting for the current network to close.
    pub fn pending_orphans(&self) -> usize {
        self.orphans.len()
    }

    pub fn apply(&mut self, event: &ParseEvent) -> Result<()> {
        event.apply(self)
    }

    /// End of input. A network left open is an `UnexpectedEvent` under
    /// strict nesting, otherwise it is closed as if its end had arrived.
    pub fn finish(mut self) -> Result<Vec<LoadedNetwork>> {
        if let Some(&top) = self.stack.last() {
            if self.config.strict_nesting {
                return Err(TempographError::UnexpectedEvent(format!(
                    "input ended inside {}",
                    top
                )));
            }
            log::warn!("Input ended inside {}; closing the open network", top);
            self.stack.clear();
            if self.session.is_some()
                && let Err(e) = self.close_network()
            {
                log::warn!("{}", e);
            }
        }
        Ok(self.loaded)
    }

    fn nesting_violation(&self, message: String) -> Result<()> {
        if self.config.strict_nesting {
            return Err(TempographError::UnexpectedEvent(message));
        }
        log::warn!("Ignoring event: {}", message);
        Ok(())
    }

    /// Classify the outcome of one start event.
    fn settle(&mut self, tag: ElementTag, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e @ TempographError::DuplicateIdentity { .. }) => {
                log::warn!("Aborting network: {}", e);
                self.aborted = Some(e.to_string());
                Err(e)
            }
            Err(e @ TempographError::UnexpectedEvent(_)) => Err(e),
            Err(e) => {
                log::warn!("Skipping {}: {}", tag, e);
                if let Some(session) = self.session.as_mut() {
                    session.stats_mut().record_skipped();
                }
                Ok(())
            }
        }
    }

    fn start_network(&mut self, attributes: &Attributes) -> Result<()> {
        let mut session = Session::with_config(self.config.clone())?;
        self.closed = false;

        let existence = parse_interval(attr(attributes, "start"), attr(attributes, "end"))
            .unwrap_or_else(|e| {
                log::warn!("Network interval ignored: {}", e);
                Interval::unbounded()
            });
        let directed = parse_directed(attr(attributes, "directed"), self.config.default_directed)
            .unwrap_or_else(|e| {
                log::warn!("Network direction defaulted: {}", e);
                self.config.default_directed
            });

        session.create_network(
            attr(attributes, "id"),
            attr(attributes, "label"),
            existence,
            directed,
        )?;
        self.session = Some(session);
        Ok(())
    }

    fn start_node(&mut self, attributes: &Attributes) -> Result<()> {
        let session = self.session.as_mut().ok_or_else(no_network)?;
        let id = attr(attributes, "id");
        let label = attr(attributes, "label");
        let start = parse_time_bound(attr(attributes, "start"))?;
        let end = parse_time_bound(attr(attributes, "end"))?;

        // A repeated declaration carrying only an end closes the existing node.
        if let Some(key) = id.or(label)
            && let Some(existing) = session.graph().node_by_key(key)
            && start.is_none()
            && let Some(end) = end
        {
            self.current_node = Some(existing);
            session.backfill(Identity::Node(existing), &AttributeKey::Existence, end)?;
            return Ok(());
        }

        let existence = Interval::from_bounds(start, end);
        validate_interval(&existence)?;
        self.current_node = Some(session.create_node(id, label, existence)?);
        Ok(())
    }

    fn start_edge(&mut self, attributes: &Attributes) -> Result<()> {
        self.current_edge = Some(EdgeContext::Skipped);
        let session = self.session.as_mut().ok_or_else(no_network)?;

        let source = required(attributes, ElementTag::Edge, "source")?;
        let target = required(attributes, ElementTag::Edge, "target")?;
        let existence = parse_interval(attr(attributes, "start"), attr(attributes, "end"))?;

        let pending = PendingEdge {
            id: attr(attributes, "id").map(str::to_string),
            label: attr(attributes, "label").map(str::to_string),
            source: source.to_string(),
            target: target.to_string(),
            existence,
        };

        // A queued orphan already owns its key.
        if self.orphans.contains_key(&pending.resolved_key()) {
            return Err(TempographError::DuplicateIdentity {
                kind: ElementKind::Edge,
                id: pending.resolved_key(),
            });
        }

        match session.create_edge(pending)? {
            EdgeOutcome::Created(edge) => {
                self.current_edge = Some(EdgeContext::Created(edge));
            }
            EdgeOutcome::Pending(pending) => {
                log::debug!(
                    "Edge '{}' waits for {} -> {}",
                    pending.resolved_key(),
                    pending.source,
                    pending.target
                );
                session.stats_mut().orphans_queued += 1;
                self.orphans.push(OrphanEdge::new(pending));
                self.current_edge = Some(EdgeContext::Pending);
            }
        }
        Ok(())
    }

    fn target(&self, kind: ElementKind) -> Result<Target> {
        match kind {
            ElementKind::Network => Ok(Target::Element(Identity::Network)),
            ElementKind::Node => self
                .current_node
                .map(|node| Target::Element(Identity::Node(node)))
                .ok_or_else(|| {
                    TempographError::UnknownElement("enclosing node was skipped".to_string())
                }),
            ElementKind::Edge => match self.current_edge {
                Some(EdgeContext::Created(edge)) => Ok(Target::Element(Identity::Edge(edge))),
                Some(EdgeContext::Pending) => Ok(Target::Orphan),
                _ => Err(TempographError::UnknownElement(
                    "enclosing edge was skipped".to_string(),
                )),
            },
        }
    }

    fn has_open(&self, target: Target, key: &AttributeKey) -> bool {
        match target {
            Target::Element(identity) => self
                .session
                .as_ref()
                .is_some_and(|session| session.has_open(identity, key)),
            Target::Orphan => self.orphans.last().is_some_and(|orphan| orphan.has_open(key)),
        }
    }

    /// Run `op` now, or queue it on the orphan being declared.
    fn dispatch(&mut self, target: Target, op: OrphanOp) -> Result<()> {
        match target {
            Target::Element(identity) => {
                let session = self.session.as_mut().ok_or_else(no_network)?;
                replay(session, identity, op)
            }
            Target::Orphan => {
                let orphan = self
                    .orphans
                    .last_mut()
                    .ok_or_else(|| TempographError::UnknownElement("orphan edge".to_string()))?;
                orphan.push(op);
                Ok(())
            }
        }
    }

    fn start_attribute(&mut self, tag: ElementTag, attributes: &Attributes) -> Result<()> {
        let target = self.target(tag.owner())?;
        let name = required(attributes, tag, "name")?;
        check_attribute_name(tag.owner(), name)?;
        let key = AttributeKey::attribute(name);

        let start = parse_time_bound(attr(attributes, "start"))?;
        let end = parse_time_bound(attr(attributes, "end"))?;

        if start.is_none()
            && let Some(end) = end
            && self.has_open(target, &key)
        {
            return self.dispatch(target, OrphanOp::Backfill { key, end });
        }

        let type_tag = required(attributes, tag, "type")?;
        let raw = required(attributes, tag, "value")?;
        let value = coerce_value(type_tag, raw, self.config.list_delimiter)?;
        let interval = Interval::from_bounds(start, end);
        validate_interval(&interval)?;

        self.dispatch(
            target,
            OrphanOp::Record {
                key,
                value,
                raw_type: type_tag.to_string(),
                interval,
            },
        )
    }

    fn start_graphics(&mut self, tag: ElementTag, attributes: &Attributes) -> Result<()> {
        let target = self.target(tag.owner())?;
        let interval = parse_interval(attr(attributes, "start"), attr(attributes, "end"))?;

        for &property in graphics_properties(tag.owner()) {
            let Some(raw) = attr(attributes, property) else {
                continue;
            };
            let result = graphics_value(property, raw).and_then(|(value, type_tag)| {
                self.dispatch(
                    target,
                    OrphanOp::Record {
                        key: AttributeKey::graphics(property),
                        value,
                        raw_type: type_tag.to_string(),
                        interval,
                    },
                )
            });
            if let Err(e) = result {
                log::warn!("Skipping {} property '{}': {}", tag, property, e);
                if let Some(session) = self.session.as_mut() {
                    session.stats_mut().record_skipped();
                }
            }
        }
        Ok(())
    }

    fn start_dynamics(&mut self, tag: ElementTag, attributes: &Attributes) -> Result<()> {
        let target = self.target(tag.owner())?;
        let interval = parse_interval(attr(attributes, "start"), attr(attributes, "end"))?;
        self.dispatch(
            target,
            OrphanOp::Record {
                key: AttributeKey::Dynamics,
                value: AttrValue::Boolean(true),
                raw_type: "boolean".to_string(),
                interval,
            },
        )
    }

    /// Drain the orphan queue and hand the finished session over.
    fn close_network(&mut self) -> Result<()> {
        let mut session = self.session.take().ok_or_else(no_network)?;
        self.current_node = None;
        self.current_edge = None;
        self.closed = true;

        if let Some(reason) = self.aborted.take() {
            let dropped = self.orphans.drain().count();
            log::warn!("Network aborted ({}); {} orphan edges dropped", reason, dropped);
            self.loaded.push(LoadedNetwork {
                session,
                status: NetworkStatus::Aborted { reason },
            });
            return Ok(());
        }

        let orphans: Vec<OrphanEdge> = self.orphans.drain().collect();
        let mut unresolved = Vec::new();
        for orphan in orphans {
            let key = orphan.edge.resolved_key();
            match session.resolve(&orphan.edge) {
                Err(e @ TempographError::DuplicateIdentity { .. }) => {
                    log::warn!("Aborting network at orphan drain: {}", e);
                    self.loaded.push(LoadedNetwork {
                        session,
                        status: NetworkStatus::Aborted {
                            reason: e.to_string(),
                        },
                    });
                    return Err(e);
                }
                Ok(Resolution::Resolved(edge)) => {
                    log::debug!(
                        "Orphan edge '{}' resolved, replaying {} ops",
                        key,
                        orphan.ops.len()
                    );
                    session.stats_mut().orphans_resolved += 1;
                    for op in orphan.ops {
                        if let Err(e) = replay(&mut session, Identity::Edge(edge), op) {
                            log::warn!("Skipping queued operation of edge '{}': {}", key, e);
                            session.stats_mut().record_skipped();
                        }
                    }
                }
                Ok(Resolution::StillPending) => unresolved.push(key),
                Err(e) => {
                    log::warn!("Orphan edge '{}' cannot be created: {}", key, e);
                    unresolved.push(key);
                }
            }
        }

        let stats = session.stats();
        log::info!(
            "Loaded network '{}': {} nodes, {} edges, {} intervals, {} skipped",
            session.graph().network().map_or("?", |n| n.label.as_str()),
            stats.nodes,
            stats.edges,
            stats.attributes_recorded,
            stats.attributes_skipped
        );

        let status = if unresolved.is_empty() {
            NetworkStatus::Complete
        } else {
            NetworkStatus::Incomplete {
                unresolved: unresolved.clone(),
            }
        };
        self.loaded.push(LoadedNetwork { session, status });

        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(TempographError::UnresolvedEdge(unresolved))
        }
    }
}

impl Default for StreamingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for StreamingBuilder {
    fn element_start(&mut self, tag: ElementTag, attributes: &Attributes) -> Result<()> {
        let parent = self.stack.last().copied();
        if parent != tag.expected_parent() {
            let message = match parent {
                Some(parent) => format!("{} cannot open inside {}", tag, parent),
                None => format!("{} cannot open outside of a network", tag),
            };
            return self.nesting_violation(message);
        }
        self.stack.push(tag);

        if self.aborted.is_some() {
            return Ok(());
        }

        let result = match tag {
            ElementTag::Network => self.start_network(attributes),
            ElementTag::Node => self.start_node(attributes),
            ElementTag::Edge => self.start_edge(attributes),
            ElementTag::NetworkAttribute
            | ElementTag::NodeAttribute
            | ElementTag::EdgeAttribute => self.start_attribute(tag, attributes),
            ElementTag::NetworkGraphics | ElementTag::NodeGraphics | ElementTag::EdgeGraphics => {
                self.start_graphics(tag, attributes)
            }
            ElementTag::NetworkDynamics | ElementTag::NodeDynamics => {
                self.start_dynamics(tag, attributes)
            }
        };
        self.settle(tag, result)
    }

    fn element_end(&mut self, tag: ElementTag) -> Result<()> {
        if self.stack.last() != Some(&tag) {
            let message = match self.stack.last() {
                Some(open) => format!("{} closed while {} is open", tag, open),
                None => format!("{} closed with no open element", tag),
            };
            return self.nesting_violation(message);
        }
        self.stack.pop();

        match tag {
            ElementTag::Network => return self.close_network(),
            ElementTag::Node => self.current_node = None,
            ElementTag::Edge => self.current_edge = None,
            _ => {}
        }
        Ok(())
    }
}
