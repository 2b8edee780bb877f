//! Temporal attribute store.
//!
//! Every `(element kind, attribute key)` pair is its own partition with its
//! own interval tree, created on first use. Existence, graphics and dynamics
//! are stored the same way as declared attributes under dedicated keys.

use crate::compute::temporal::{EntryId, IntervalIndex, TimeBounds, Transition};
use crate::compute::validation::{check_attribute_name, validate_interval};
use crate::error::{Result, TempographError};
use crate::graph::{ElementKind, Identity};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tempograph_types::interval::{Interval, Window};
use tempograph_types::value::AttrValue;

/// Which timeline of an element an interval belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    /// When the element itself exists
    Existence,
    /// A user declared attribute
    Attribute(String),
    /// A visual property such as `fill` or `width`
    Graphics(String),
    /// Windows in which the element takes part in layout dynamics
    Dynamics,
}

impl AttributeKey {
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    pub fn graphics(property: impl Into<String>) -> Self {
        Self::Graphics(property.into())
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existence => f.write_str("<existence>"),
            Self::Attribute(name) => f.write_str(name),
            Self::Graphics(property) => write!(f, "graphics.{}", property),
            Self::Dynamics => f.write_str("<dynamics>"),
        }
    }
}

pub type PartitionKey = (ElementKind, AttributeKey);

/// Payload stored in a partition tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRecord {
    pub identity: Identity,
    pub value: AttrValue,
    /// Type tag as declared by the source, before coercion
    pub raw_type: String,
}

/// One interval whose visibility flipped between two windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedAttribute {
    pub identity: Identity,
    pub key: AttributeKey,
    pub value: AttrValue,
    pub raw_type: String,
    pub interval: Interval,
    pub transition: Transition,
}

#[derive(Debug, Default)]
pub struct TemporalAttributeStore {
    partitions: FxHashMap<PartitionKey, IntervalIndex<AttributeRecord>>,
    /// Most recent open-ended interval per element and key
    open_entries: FxHashMap<(Identity, AttributeKey), EntryId>,
    bounds: TimeBounds,
}

impl TemporalAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one interval for `identity` under `key`.
    ///
    /// Reserved attribute names and malformed intervals are rejected before
    /// anything is written.
    pub fn record(
        &mut self,
        identity: Identity,
        key: AttributeKey,
        value: AttrValue,
        raw_type: impl Into<String>,
        interval: Interval,
    ) -> Result<EntryId> {
        if let AttributeKey::Attribute(name) = &key {
            check_attribute_name(identity.kind(), name)?;
        }
        validate_interval(&interval)?;

        let record = AttributeRecord {
            identity,
            value,
            raw_type: raw_type.into(),
        };
        let id = self
            .partitions
            .entry((identity.kind(), key.clone()))
            .or_default()
            .insert(interval, record)?;

        if interval.is_open_ended() {
            self.open_entries.insert((identity, key), id);
        }
        self.bounds.observe(interval.start);
        self.bounds.observe(interval.end);
        Ok(id)
    }

    pub fn record_existence(&mut self, identity: Identity, interval: Interval) -> Result<EntryId> {
        self.record(
            identity,
            AttributeKey::Existence,
            AttrValue::Boolean(true),
            "existence",
            interval,
        )
    }

    /// Whether `identity` has an open interval under `key` that
    /// `backfill_end` could close.
    pub fn has_open(&self, identity: Identity, key: &AttributeKey) -> bool {
        self.open_entries.contains_key(&(identity, key.clone()))
    }

    /// Close the most recent open interval of `identity` under `key`.
    pub fn backfill_end(
        &mut self,
        identity: Identity,
        key: &AttributeKey,
        end: f64,
    ) -> Result<Interval> {
        let slot = (identity, key.clone());
        let Some(&entry) = self.open_entries.get(&slot) else {
            return Err(TempographError::InvalidInterval(format!(
                "no open interval for {} on {}",
                key, identity
            )));
        };
        let index = self
            .partitions
            .get_mut(&(identity.kind(), key.clone()))
            .ok_or_else(|| {
                TempographError::UnknownElement(format!("partition {} {}", identity.kind(), key))
            })?;

        index.backfill_end(entry, end)?;
        self.open_entries.remove(&slot);
        self.bounds.observe(end);

        index
            .get(entry)
            .map(|e| e.interval)
            .ok_or_else(|| TempographError::UnknownElement(format!("interval entry {}", entry)))
    }

    /// Intervals of one kind whose visibility flips between `previous` and
    /// `new`. With `key == None` every partition of the kind is scanned, in
    /// key order.
    pub fn changed_since(
        &self,
        kind: ElementKind,
        key: Option<&AttributeKey>,
        previous: &Window,
        new: &Window,
    ) -> Vec<ChangedAttribute> {
        let mut keys: Vec<&PartitionKey> = self
            .partitions
            .keys()
            .filter(|(k, attr)| *k == kind && key.is_none_or(|wanted| wanted == attr))
            .collect();
        keys.sort();

        let mut out = Vec::new();
        for partition_key in keys {
            let index = &self.partitions[partition_key];
            for (entry, transition) in index.changed(previous, new) {
                let Some(stored) = index.get(entry) else {
                    continue;
                };
                out.push(ChangedAttribute {
                    identity: stored.payload.identity,
                    key: partition_key.1.clone(),
                    value: stored.payload.value.clone(),
                    raw_type: stored.payload.raw_type.clone(),
                    interval: stored.interval,
                    transition,
                });
            }
        }
        out
    }

    /// The value of `identity` under `key` that is in effect at `t`.
    pub fn active_value(
        &self,
        identity: Identity,
        key: &AttributeKey,
        t: f64,
    ) -> Option<&AttrValue> {
        let index = self.partitions.get(&(identity.kind(), key.clone()))?;
        let entry = index.active_at(t, |record| record.identity == identity)?;
        index.get(entry).map(|e| &e.payload.value)
    }

    /// Every stored interval of a partition overlapping `window`.
    pub fn overlapping(
        &self,
        kind: ElementKind,
        key: &AttributeKey,
        window: &Window,
    ) -> Vec<(Interval, &AttributeRecord)> {
        self.partitions
            .get(&(kind, key.clone()))
            .map(|index| {
                index
                    .overlapping(window)
                    .into_iter()
                    .map(|(_, e)| (e.interval, &e.payload))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Full history of one element under one key, in insertion order.
    pub fn history(&self, identity: Identity, key: &AttributeKey) -> Vec<(Interval, &AttrValue)> {
        self.partitions
            .get(&(identity.kind(), key.clone()))
            .map(|index| {
                index
                    .iter()
                    .filter(|(_, e)| e.payload.identity == identity)
                    .map(|(_, e)| (e.interval, &e.payload.value))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keys with at least one interval for elements of `kind`.
    pub fn keys(&self, kind: ElementKind) -> Vec<&AttributeKey> {
        let mut keys: Vec<&AttributeKey> = self
            .partitions
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, key)| key)
            .collect();
        keys.sort();
        keys
    }

    pub fn min_time(&self) -> Option<f64> {
        self.bounds.min()
    }

    pub fn max_time(&self) -> Option<f64> {
        self.bounds.max()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Total number of stored intervals across all partitions.
    pub fn len(&self) -> usize {
        self.partitions.values().map(IntervalIndex::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.values().all(IntervalIndex::is_empty)
    }
}
