//! Streaming ingestion of dynamic networks.
//!
//! - `event`: the parser-facing event contract and recorded events
//! - `coerce`: typed values from raw attribute strings
//! - `orphan`: edges waiting for their endpoints
//! - `handler`: the state machine that builds sessions from events

pub mod coerce;
pub mod event;
pub mod handler;
pub mod orphan;

pub use event::{Attributes, ElementTag, EventSink, ParseEvent};
pub use handler::{LoadedNetwork, NetworkStatus, Phase, StreamingBuilder};
pub use orphan::{OrphanEdge, OrphanOp, OrphanQueue};
