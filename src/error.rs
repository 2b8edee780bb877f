//! Error types for tempograph.

use crate::graph::ElementKind;
use crate::stream::ElementTag;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TempographError {
    /// Malformed interval bounds. Rejected before any index is touched.
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Reserved attribute name '{name}' cannot be used on a {kind}")]
    ReservedAttributeName { kind: ElementKind, name: String },

    #[error("Duplicate {kind} identity '{id}'")]
    DuplicateIdentity { kind: ElementKind, id: String },

    /// Orphan edges whose endpoints never materialized before network end.
    #[error("Unresolved edge(s) at network end: {}", .0.join(", "))]
    UnresolvedEdge(Vec<String>),

    #[error("Cannot coerce '{value}' to declared type '{type_tag}'")]
    InvalidValue { type_tag: String, value: String },

    #[error("Missing '{name}' on {element} element")]
    MissingAttribute {
        element: ElementTag,
        name: &'static str,
    },

    #[error("Unexpected event: {0}")]
    UnexpectedEvent(String),

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl TempographError {
    /// Errors that only invalidate a single attribute. The builder logs and
    /// skips these instead of aborting the network.
    pub fn is_attribute_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidInterval(_)
                | Self::ReservedAttributeName { .. }
                | Self::InvalidValue { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TempographError>;
