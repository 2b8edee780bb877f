//! Temporal interval indexing and streaming ingestion for dynamic networks.
//!
//! Networks, nodes, edges and their attributes each carry a validity
//! interval. Events from a document parser are streamed into a `Session`,
//! edges declared before their endpoints wait in an orphan queue, and a
//! renderer then asks which intervals flip visibility as its window moves.
//!
//! ```rust
//! use tempograph::prelude::*;
//!
//! let events = vec![
//!     ParseEvent::start(ElementTag::Network, [("id", "net")]),
//!     ParseEvent::start(ElementTag::Node, [("id", "n1"), ("start", "0")]),
//!     ParseEvent::start(
//!         ElementTag::NodeAttribute,
//!         [("name", "color"), ("type", "string"), ("value", "red"), ("start", "0"), ("end", "5")],
//!     ),
//!     ParseEvent::end(ElementTag::NodeAttribute),
//!     ParseEvent::end(ElementTag::Node),
//!     ParseEvent::end(ElementTag::Network),
//! ];
//!
//! let mut networks = SessionBuilder::new().load(events)?;
//! let session = networks.remove(0).session;
//!
//! let delta = session.advance_window(Window::new(0.0, 1.0), Window::new(5.0, 6.0))?;
//! assert_eq!(delta.nodes.len(), 1); // color left the window
//! # Ok::<(), tempograph::TempographError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod error;
pub mod graph;
pub mod layout;
pub mod session;
pub mod store;
pub mod stream;
pub mod types;

pub use builder::SessionBuilder;
pub use error::{Result, TempographError};

pub use tempograph_types::interval::{Interval, Window};
pub use tempograph_types::value::{AttrValue, ValueType};

pub use compute::temporal::{EntryId, IntervalIndex, TimeBounds, Transition};

pub use graph::{
    EdgeId, EdgeOutcome, ElementKind, GraphModel, Identity, NodeId, PendingEdge, Resolution,
};

pub use store::{AttributeKey, ChangedAttribute, TemporalAttributeStore};

pub use session::{
    CancelToken, Direction, Session, SyncSession, TimeSlider, WindowDelta, WindowPlayer,
};

pub use stream::{
    ElementTag, EventSink, LoadedNetwork, NetworkStatus, ParseEvent, StreamingBuilder,
};

pub use layout::{DynLayout, LayoutRegistry, Position, ViewId};

pub use types::{Config, IngestStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Result, Session, SessionBuilder, SyncSession, TempographError};

    pub use crate::{AttrValue, AttributeKey, Identity, Interval, Window};

    pub use crate::{ElementTag, EventSink, ParseEvent, StreamingBuilder};

    pub use crate::{Config, Transition, WindowDelta};
}
