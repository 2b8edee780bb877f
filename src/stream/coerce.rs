//! Coercion of raw attribute strings into typed values.

use crate::error::{Result, TempographError};
use crate::graph::ElementKind;
use tempograph_types::value::{AttrValue, ValueType};

/// Visual properties recognised on network graphics elements.
pub const NETWORK_GRAPHICS: &[&str] = &["fill"];

/// Visual properties recognised on node graphics elements.
pub const NODE_GRAPHICS: &[&str] = &[
    "type",
    "height",
    "width",
    "size",
    "fill",
    "labelfill",
    "labelsize",
    "borderwidth",
    "bordercolor",
    "transparency",
];

/// Visual properties recognised on edge graphics elements.
pub const EDGE_GRAPHICS: &[&str] = &[
    "width",
    "fill",
    "sourcearrowshape",
    "targetarrowshape",
    "transparency",
];

pub fn graphics_properties(kind: ElementKind) -> &'static [&'static str] {
    match kind {
        ElementKind::Network => NETWORK_GRAPHICS,
        ElementKind::Node => NODE_GRAPHICS,
        ElementKind::Edge => EDGE_GRAPHICS,
    }
}

fn invalid(type_tag: &str, raw: &str) -> TempographError {
    TempographError::InvalidValue {
        type_tag: type_tag.to_string(),
        value: raw.to_string(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Convert a raw value according to its declared type tag.
///
/// `list` values are split on `delimiter`; blank items are dropped.
///
/// ```rust
/// use tempograph::stream::coerce::coerce_value;
/// use tempograph::AttrValue;
///
/// assert_eq!(coerce_value("double", "3.0", ',')?, AttrValue::Real(3.0));
/// assert_eq!(coerce_value("boolean", "1", ',')?, AttrValue::Boolean(true));
/// assert!(coerce_value("integer", "three", ',').is_err());
/// # Ok::<(), tempograph::TempographError>(())
/// ```
pub fn coerce_value(type_tag: &str, raw: &str, delimiter: char) -> Result<AttrValue> {
    let value_type = ValueType::from_tag(type_tag).ok_or_else(|| invalid(type_tag, raw))?;

    match value_type {
        ValueType::String => Ok(AttrValue::String(raw.to_string())),
        ValueType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(AttrValue::Integer)
            .map_err(|_| invalid(type_tag, raw)),
        ValueType::Real => match raw.trim().parse::<f64>() {
            Ok(r) if !r.is_nan() => Ok(AttrValue::Real(r)),
            _ => Err(invalid(type_tag, raw)),
        },
        ValueType::Boolean => parse_bool(raw)
            .map(AttrValue::Boolean)
            .ok_or_else(|| invalid(type_tag, raw)),
        ValueType::List => Ok(AttrValue::List(
            raw.split(delimiter)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        )),
    }
}

/// Interpret a network's `directed` flag. Absent means `default`.
pub fn parse_directed(raw: Option<&str>, default: bool) -> Result<bool> {
    match raw {
        None => Ok(default),
        Some(raw) => parse_bool(raw).ok_or_else(|| invalid("directed", raw)),
    }
}

/// Type a visual property value: sizes are reals, transparency is an
/// integer and everything else (colours, shapes) stays a string.
pub fn graphics_value(property: &str, raw: &str) -> Result<(AttrValue, &'static str)> {
    let type_tag = match property {
        "height" | "width" | "size" | "labelsize" | "borderwidth" => "real",
        "transparency" => "integer",
        _ => "string",
    };
    Ok((coerce_value(type_tag, raw, ',')?, type_tag))
}
