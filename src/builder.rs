//! Session builder for flexible configuration
//!
//! This module provides a builder pattern for creating empty sessions,
//! streaming builders, and for loading recorded event streams in one call.

use crate::error::{Result, TempographError};
use crate::session::Session;
use crate::stream::{LoadedNetwork, ParseEvent, StreamingBuilder};
use crate::types::Config;
use std::path::Path;

/// Builder for sessions and loaders sharing one configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    config: Config,
}

impl SessionBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a JSON or TOML file.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.config = Config::from_path(path)?;
        Ok(self)
    }

    pub fn default_directed(mut self, directed: bool) -> Self {
        self.config = self.config.with_default_directed(directed);
        self
    }

    pub fn list_delimiter(mut self, delimiter: char) -> Self {
        self.config = self.config.with_list_delimiter(delimiter);
        self
    }

    pub fn strict_nesting(mut self, strict: bool) -> Self {
        self.config = self.config.with_strict_nesting(strict);
        self
    }

    /// Build an empty session for programmatic population.
    pub fn build(self) -> Result<Session> {
        Session::with_config(self.config)
    }

    /// Build an event-driven loader.
    pub fn streaming(self) -> Result<StreamingBuilder> {
        StreamingBuilder::with_config(self.config)
    }

    /// Feed every event to a fresh loader and return the networks found.
    ///
    /// Duplicate identities and unresolved orphans are reported through
    /// each network's status; malformed nesting stops the load.
    pub fn load<I>(self, events: I) -> Result<Vec<LoadedNetwork>>
    where
        I: IntoIterator<Item = ParseEvent>,
    {
        let mut builder = self.streaming()?;
        for event in events {
            match builder.apply(&event) {
                Ok(()) => {}
                Err(
                    e @ (TempographError::DuplicateIdentity { .. }
                    | TempographError::UnresolvedEdge(_)),
                ) => {
                    log::debug!("Network status recorded: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        builder.finish()
    }

    /// Load a JSON array of recorded events.
    pub fn load_json(self, json: &str) -> Result<Vec<LoadedNetwork>> {
        self.load(ParseEvent::from_json_list(json)?)
    }

    /// Load a file containing a JSON array of recorded events.
    pub fn load_file<P: AsRef<Path>>(self, path: P) -> Result<Vec<LoadedNetwork>> {
        let contents = std::fs::read_to_string(path)?;
        self.load_json(&contents)
    }
}
