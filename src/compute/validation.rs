//! Validation for intervals, time bounds and attribute names.

use crate::error::{Result, TempographError};
use crate::graph::ElementKind;
use tempograph_types::interval::{Interval, Window};

/// Attribute names a network may not declare.
pub const NETWORK_RESERVED_NAMES: &[&str] = &["name", "shared name", "__Annotations"];

/// Attribute names a node may not declare.
pub const NODE_RESERVED_NAMES: &[&str] = &["name", "shared name"];

/// Attribute names an edge may not declare. Edges additionally reserve the
/// interaction columns.
pub const EDGE_RESERVED_NAMES: &[&str] = &[
    "name",
    "shared name",
    "interaction",
    "shared interaction",
];

/// Validates that an interval has numeric bounds and `start <= end`.
///
/// # Examples
///
/// ```
/// use tempograph::compute::validation::validate_interval;
/// use tempograph::Interval;
///
/// assert!(validate_interval(&Interval::new(0.0, 5.0)).is_ok());
/// assert!(validate_interval(&Interval::new(3.0, 3.0)).is_ok());
/// assert!(validate_interval(&Interval::new(5.0, 0.0)).is_err());
/// assert!(validate_interval(&Interval::new(f64::NAN, 0.0)).is_err());
/// ```
pub fn validate_interval(interval: &Interval) -> Result<()> {
    if interval.start.is_nan() || interval.end.is_nan() {
        return Err(TempographError::InvalidInterval(format!(
            "bounds must be numeric, got {}",
            interval
        )));
    }

    if interval.start > interval.end {
        return Err(TempographError::InvalidInterval(format!(
            "start after end in {}",
            interval
        )));
    }

    Ok(())
}

/// Validates a query window.
pub fn validate_window(window: &Window) -> Result<()> {
    if !window.is_well_formed() {
        return Err(TempographError::InvalidInterval(format!(
            "window {} is malformed",
            window
        )));
    }
    Ok(())
}

/// Parses an optional time bound. Missing or blank values mean "unbounded".
///
/// Accepts anything `f64` parses, including `Infinity` and `-inf`.
pub fn parse_time_bound(raw: Option<&str>) -> Result<Option<f64>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<f64>() {
        Ok(t) if !t.is_nan() => Ok(Some(t)),
        _ => Err(TempographError::InvalidInterval(format!(
            "time bound '{}' is not numeric",
            raw
        ))),
    }
}

/// Parses `start`/`end` attribute strings into a validated interval.
pub fn parse_interval(start: Option<&str>, end: Option<&str>) -> Result<Interval> {
    let interval = Interval::from_bounds(parse_time_bound(start)?, parse_time_bound(end)?);
    validate_interval(&interval)?;
    Ok(interval)
}

pub fn reserved_names(kind: ElementKind) -> &'static [&'static str] {
    match kind {
        ElementKind::Network => NETWORK_RESERVED_NAMES,
        ElementKind::Node => NODE_RESERVED_NAMES,
        ElementKind::Edge => EDGE_RESERVED_NAMES,
    }
}

/// Rejects attribute names that collide with derived display columns.
pub fn check_attribute_name(kind: ElementKind, name: &str) -> Result<()> {
    if reserved_names(kind).contains(&name) {
        return Err(TempographError::ReservedAttributeName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_bound() {
        assert_eq!(parse_time_bound(None).unwrap(), None);
        assert_eq!(parse_time_bound(Some("  ")).unwrap(), None);
        assert_eq!(parse_time_bound(Some("2.5")).unwrap(), Some(2.5));
        assert_eq!(
            parse_time_bound(Some("-Infinity")).unwrap(),
            Some(f64::NEG_INFINITY)
        );
        assert!(parse_time_bound(Some("soon")).is_err());
        assert!(parse_time_bound(Some("NaN")).is_err());
    }

    #[test]
    fn test_parse_interval_defaults_to_sentinels() {
        assert_eq!(parse_interval(None, None).unwrap(), Interval::unbounded());
        assert_eq!(parse_interval(Some("4"), None).unwrap(), Interval::open(4.0));
        assert!(parse_interval(Some("4"), Some("1")).is_err());
    }

    #[test]
    fn test_reserved_names_are_asymmetric() {
        assert!(check_attribute_name(ElementKind::Edge, "interaction").is_err());
        assert!(check_attribute_name(ElementKind::Node, "interaction").is_ok());
        assert!(check_attribute_name(ElementKind::Network, "interaction").is_ok());
        assert!(check_attribute_name(ElementKind::Network, "__Annotations").is_err());
        assert!(check_attribute_name(ElementKind::Node, "__Annotations").is_ok());

        for kind in [ElementKind::Network, ElementKind::Node, ElementKind::Edge] {
            assert!(check_attribute_name(kind, "name").is_err());
            assert!(check_attribute_name(kind, "shared name").is_err());
            assert!(check_attribute_name(kind, "weight").is_ok());
        }
    }
}
