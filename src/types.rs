//! Configuration and ingestion statistics.
//!
//! Both types are serializable so a loader configuration can live next to
//! the data files it applies to.
use crate::error::Result;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ingestion and playback configuration
///
/// # Example
///
/// ```rust
/// use tempograph::Config;
///
/// let config = Config::default();
/// assert!(config.default_directed);
///
/// let json = r#"{
///     "list_delimiter": ";",
///     "slider_resolution": 200
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.slider_resolution, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directed flag applied to networks that do not declare one
    #[serde(default = "Config::default_directed")]
    pub default_directed: bool,

    /// Separator used to split `list` typed attribute values
    #[serde(default = "Config::default_list_delimiter")]
    pub list_delimiter: char,

    /// Number of discrete slider steps between the minimum and maximum time
    #[serde(default = "Config::default_slider_resolution")]
    pub slider_resolution: u32,

    /// Orphan queue length at which a warning is logged
    #[serde(default = "Config::default_orphan_warn_threshold")]
    pub orphan_warn_threshold: usize,

    /// Reject out-of-place parser events instead of ignoring them
    #[serde(default = "Config::default_strict_nesting")]
    pub strict_nesting: bool,
}

impl Config {
    const fn default_directed() -> bool {
        true
    }

    const fn default_list_delimiter() -> char {
        ','
    }

    const fn default_slider_resolution() -> u32 {
        100
    }

    const fn default_orphan_warn_threshold() -> usize {
        10_000
    }

    const fn default_strict_nesting() -> bool {
        true
    }

    pub fn with_default_directed(mut self, directed: bool) -> Self {
        self.default_directed = directed;
        self
    }

    pub fn with_list_delimiter(mut self, delimiter: char) -> Self {
        self.list_delimiter = delimiter;
        self
    }

    pub fn with_slider_resolution(mut self, resolution: u32) -> Self {
        assert!(resolution > 0, "Slider resolution must be greater than zero");
        self.slider_resolution = resolution;
        self
    }

    pub fn with_orphan_warn_threshold(mut self, threshold: usize) -> Self {
        self.orphan_warn_threshold = threshold;
        self
    }

    pub fn with_strict_nesting(mut self, strict: bool) -> Self {
        self.strict_nesting = strict;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.slider_resolution == 0 {
            return Err("Slider resolution must be greater than zero".to_string());
        }

        if self.list_delimiter.is_whitespace() || self.list_delimiter.is_control() {
            return Err(format!(
                "List delimiter must be a visible character, got {:?}",
                self.list_delimiter
            ));
        }

        if self.orphan_warn_threshold == 0 {
            return Err("Orphan warning threshold must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a file. `.toml` files need the `toml` feature;
    /// everything else is parsed as JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            #[cfg(feature = "toml")]
            return Ok(Self::from_toml(&contents)?);
            #[cfg(not(feature = "toml"))]
            return Err(crate::error::TempographError::Config(format!(
                "{} is a TOML file but the `toml` feature is disabled",
                path.display()
            )));
        }

        Ok(Self::from_json(&contents)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_directed: Self::default_directed(),
            list_delimiter: Self::default_list_delimiter(),
            slider_resolution: Self::default_slider_resolution(),
            orphan_warn_threshold: Self::default_orphan_warn_threshold(),
            strict_nesting: Self::default_strict_nesting(),
        }
    }
}

/// Ingestion statistics for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of nodes created
    pub nodes: usize,
    /// Number of edges created, including resolved orphans
    pub edges: usize,
    /// Attribute, graphics and dynamics intervals stored
    pub attributes_recorded: u64,
    /// Attributes dropped by per-attribute validation
    pub attributes_skipped: u64,
    /// Edges that had to wait for their endpoints
    pub orphans_queued: u64,
    /// Orphan edges materialized at network end
    pub orphans_resolved: u64,
    /// Open intervals whose end was filled in later
    pub backfilled: u64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attribute(&mut self) {
        self.attributes_recorded += 1;
    }

    pub fn record_skipped(&mut self) {
        self.attributes_skipped += 1;
    }

    pub fn record_backfill(&mut self) {
        self.backfilled += 1;
    }

    /// Orphans still waiting for their endpoints.
    pub fn orphans_unresolved(&self) -> u64 {
        self.orphans_queued.saturating_sub(self.orphans_resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults_apply_to_missing_fields() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.list_delimiter, ',');
        assert_eq!(config.slider_resolution, 100);
    }

    #[test]
    fn test_config_rejects_zero_resolution() {
        let err = Config::from_json(r#"{"slider_resolution": 0}"#).unwrap_err();
        assert!(err.to_string().contains("Slider resolution"));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default()
            .with_list_delimiter('|')
            .with_default_directed(false);
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_config_from_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"strict_nesting": false}}"#).unwrap();

        let config = Config::from_path(file.path()).unwrap();
        assert!(!config.strict_nesting);
        assert!(config.default_directed);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml() {
        let config = Config::from_toml("slider_resolution = 50\n").unwrap();
        assert_eq!(config.slider_resolution, 50);
        let out = config.to_toml().unwrap();
        assert!(out.contains("slider_resolution = 50"));
    }

    #[test]
    fn test_stats_unresolved_count() {
        let stats = IngestStats {
            orphans_queued: 3,
            orphans_resolved: 2,
            ..IngestStats::default()
        };
        assert_eq!(stats.orphans_unresolved(), 1);
    }
}
