//! Edges waiting for their endpoints.
//!
//! An orphan keeps the edge declaration together with every operation that
//! arrived for it while it was unresolved. Operations are replayed in arrival
//! order once the edge exists.

use crate::compute::validation::validate_interval;
use crate::graph::PendingEdge;
use crate::store::AttributeKey;
use std::collections::VecDeque;
use tempograph_types::interval::Interval;
use tempograph_types::value::AttrValue;

/// A deferred store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OrphanOp {
    Record {
        key: AttributeKey,
        value: AttrValue,
        raw_type: String,
        interval: Interval,
    },
    /// Close the open interval recorded earlier under `key`
    Backfill { key: AttributeKey, end: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrphanEdge {
    pub edge: PendingEdge,
    pub ops: Vec<OrphanOp>,
}

impl OrphanEdge {
    pub fn new(edge: PendingEdge) -> Self {
        Self {
            edge,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: OrphanOp) {
        self.ops.push(op);
    }

    /// Whether replaying the queued ops would leave an open interval under
    /// `key` for a backfill to close.
    ///
    /// A queued backfill ending before the open start is rejected on replay,
    /// so it leaves the interval open.
    pub fn has_open(&self, key: &AttributeKey) -> bool {
        let mut open_start = None;
        for op in &self.ops {
            match op {
                OrphanOp::Record {
                    key: k, interval, ..
                } if k == key && interval.is_open_ended() => open_start = Some(interval.start),
                OrphanOp::Backfill { key: k, end } if k == key => {
                    if let Some(start) = open_start
                        && validate_interval(&Interval::new(start, *end)).is_ok()
                    {
                        open_start = None;
                    }
                }
                _ => {}
            }
        }
        open_start.is_some()
    }
}

/// FIFO of orphan edges for the network being loaded.
#[derive(Debug)]
pub struct OrphanQueue {
    queue: VecDeque<OrphanEdge>,
    warn_threshold: usize,
    warned: bool,
}

impl OrphanQueue {
    pub fn new(warn_threshold: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            warn_threshold,
            warned: false,
        }
    }

    pub fn push(&mut self, orphan: OrphanEdge) {
        self.queue.push_back(orphan);

        if !self.warned && self.queue.len() >= self.warn_threshold {
            log::warn!(
                "Orphan edge queue holds {} edges; edges are declared long before their endpoints",
                self.queue.len()
            );
            self.warned = true;
        }
    }

    /// Whether an orphan already claims the edge key `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.queue.iter().any(|orphan| orphan.edge.resolved_key() == key)
    }

    pub fn last(&self) -> Option<&OrphanEdge> {
        self.queue.back()
    }

    /// The most recently queued orphan, which receives the operations of the
    /// edge element currently open.
    pub fn last_mut(&mut self) -> Option<&mut OrphanEdge> {
        self.queue.back_mut()
    }

    /// Remove every orphan, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = OrphanEdge> + '_ {
        self.warned = false;
        self.queue.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orphan(source: &str) -> OrphanEdge {
        OrphanEdge::new(PendingEdge::new(source, "missing", Interval::unbounded()))
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = OrphanQueue::new(100);
        queue.push(orphan("a"));
        queue.push(orphan("b"));
        queue.push(orphan("c"));
        assert_eq!(queue.last_mut().unwrap().edge.source, "c");

        let order: Vec<String> = queue.drain().map(|o| o.edge.source).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_has_open_follows_queued_ops() {
        let key = AttributeKey::attribute("weight");
        let mut o = orphan("a");
        assert!(!o.has_open(&key));

        o.push(OrphanOp::Record {
            key: key.clone(),
            value: AttrValue::Real(1.0),
            raw_type: "real".into(),
            interval: Interval::open(2.0),
        });
        assert!(o.has_open(&key));
        assert!(!o.has_open(&AttributeKey::attribute("other")));

        o.push(OrphanOp::Backfill {
            key: key.clone(),
            end: 4.0,
        });
        assert!(!o.has_open(&key));
    }

    #[test]
    fn test_rejected_backfill_keeps_interval_open() {
        let key = AttributeKey::attribute("state");
        let mut o = orphan("a");
        o.push(OrphanOp::Record {
            key: key.clone(),
            value: AttrValue::String("up".into()),
            raw_type: "string".into(),
            interval: Interval::open(5.0),
        });

        // Ends before the open start, so replay rejects it.
        o.push(OrphanOp::Backfill {
            key: key.clone(),
            end: 2.0,
        });
        assert!(o.has_open(&key));

        o.push(OrphanOp::Backfill {
            key: key.clone(),
            end: 8.0,
        });
        assert!(!o.has_open(&key));
    }

    #[test]
    fn test_contains_key() {
        let mut queue = OrphanQueue::new(100);
        queue.push(OrphanEdge::new(
            PendingEdge::new("a", "missing", Interval::unbounded()).with_id("e1"),
        ));
        queue.push(orphan("b"));

        assert!(queue.contains_key("e1"));
        assert!(queue.contains_key("b-missing"));
        assert!(!queue.contains_key("a-missing"));
    }
}
