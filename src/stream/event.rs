//! Parser event contract.
//!
//! A document parser reports each element as a start event carrying its
//! attributes and a matching end event. Events can also be recorded as
//! `ParseEvent`s and replayed from JSON.

use crate::error::Result;
use crate::graph::ElementKind;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element attributes as raw strings, exactly as the parser saw them.
pub type Attributes = FxHashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementTag {
    Network,
    Node,
    Edge,
    NetworkAttribute,
    NodeAttribute,
    EdgeAttribute,
    NetworkGraphics,
    NodeGraphics,
    EdgeGraphics,
    NetworkDynamics,
    NodeDynamics,
}

impl ElementTag {
    /// The element kind a tag declares or decorates.
    pub fn owner(&self) -> ElementKind {
        match self {
            Self::Network
            | Self::NetworkAttribute
            | Self::NetworkGraphics
            | Self::NetworkDynamics => ElementKind::Network,
            Self::Node | Self::NodeAttribute | Self::NodeGraphics | Self::NodeDynamics => {
                ElementKind::Node
            }
            Self::Edge | Self::EdgeAttribute | Self::EdgeGraphics => ElementKind::Edge,
        }
    }

    /// True for the three element declarations, false for their decorations.
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Network | Self::Node | Self::Edge)
    }

    /// The tag an element of this kind must be nested in.
    pub fn expected_parent(&self) -> Option<ElementTag> {
        match self {
            Self::Network => None,
            Self::Node | Self::Edge => Some(Self::Network),
            _ => Some(match self.owner() {
                ElementKind::Network => Self::Network,
                ElementKind::Node => Self::Node,
                ElementKind::Edge => Self::Edge,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Node => "node",
            Self::Edge => "edge",
            Self::NetworkAttribute => "network-attribute",
            Self::NodeAttribute => "node-attribute",
            Self::EdgeAttribute => "edge-attribute",
            Self::NetworkGraphics => "network-graphics",
            Self::NodeGraphics => "node-graphics",
            Self::EdgeGraphics => "edge-graphics",
            Self::NetworkDynamics => "network-dynamics",
            Self::NodeDynamics => "node-dynamics",
        }
    }
}

impl fmt::Display for ElementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of parser events.
pub trait EventSink {
    fn element_start(&mut self, tag: ElementTag, attributes: &Attributes) -> Result<()>;

    fn element_end(&mut self, tag: ElementTag) -> Result<()>;
}

/// A recorded parser event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ParseEvent {
    Start {
        tag: ElementTag,
        #[serde(default)]
        attributes: Attributes,
    },
    End {
        tag: ElementTag,
    },
}

impl ParseEvent {
    /// Start event from `(name, value)` pairs.
    ///
    /// ```rust
    /// use tempograph::stream::{ElementTag, ParseEvent};
    ///
    /// let event = ParseEvent::start(ElementTag::Node, [("id", "n1"), ("start", "0")]);
    /// assert_eq!(event.tag(), ElementTag::Node);
    /// ```
    pub fn start<I, K, V>(tag: ElementTag, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Start {
            tag,
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn end(tag: ElementTag) -> Self {
        Self::End { tag }
    }

    pub fn tag(&self) -> ElementTag {
        match self {
            Self::Start { tag, .. } | Self::End { tag } => *tag,
        }
    }

    /// Deliver the event to a sink.
    pub fn apply<S: EventSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        match self {
            Self::Start { tag, attributes } => sink.element_start(*tag, attributes),
            Self::End { tag } => sink.element_end(*tag),
        }
    }

    /// Parse a JSON array of recorded events.
    pub fn from_json_list(json: &str) -> Result<Vec<ParseEvent>> {
        Ok(serde_json::from_str(json)?)
    }
}
