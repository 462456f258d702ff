//! Tool host configuration.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a [`ToolHost`](crate::host::ToolHost).
///
/// Loaded from TOML by [`crate::config::load`] or built in code.
///
/// ```toml
/// name = "coding-agent"
/// max_in_flight = 32
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolHostConfig {
    /// Host name, used for the actor name and in log fields.
    pub name: String,
    /// Maximum accepted but unconsumed requests. Zero means unbounded.
    pub max_in_flight: usize,
    /// File logging configuration. None leaves logging to the application.
    pub logging: Option<LoggingConfig>,
}

impl ToolHostConfig {
    /// Creates a new host configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the in-flight limit. Zero means unbounded.
    #[must_use]
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Disables file logging.
    #[must_use]
    pub fn without_logging(mut self) -> Self {
        self.logging = None;
        self
    }
}

impl Default for ToolHostConfig {
    fn default() -> Self {
        Self {
            name: "tool-host".to_string(),
            max_in_flight: 0,
            logging: None,
        }
    }
}
