//! Configuration file loading.
//!
//! Loads tool host configuration from TOML files at XDG-compliant locations.

use crate::error::ToolHostError;
use crate::host::ToolHostConfig;
use std::path::{Path, PathBuf};

/// Default configuration file name for project-local config.
const LOCAL_CONFIG_NAME: &str = "acton-tools.toml";

/// Default configuration file name within XDG config directory.
const XDG_CONFIG_NAME: &str = "config.toml";

/// Application name for XDG directory lookup.
const APP_NAME: &str = "acton-tools";

/// Loads configuration from the default search paths.
///
/// Search order:
/// 1. `./acton-tools.toml` (project-local)
/// 2. `~/.config/acton-tools/config.toml` (XDG config)
///
/// Returns the default configuration if no config file is found.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be parsed.
pub fn load() -> Result<ToolHostConfig, ToolHostError> {
    for path in search_paths() {
        if path.exists() {
            tracing::debug!(path = %path.display(), "Loading tool host configuration");
            return from_path(&path);
        }
    }

    Ok(ToolHostConfig::default())
}

/// Loads configuration from a specific file path.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file contains invalid TOML
/// - The TOML doesn't match the expected schema
pub fn from_path(path: &Path) -> Result<ToolHostConfig, ToolHostError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ToolHostError::configuration(
            "config_file",
            format!("failed to read '{}': {}", path.display(), e),
        )
    })?;

    from_str(&contents).map_err(|e| {
        ToolHostError::configuration(
            "config_file",
            format!("failed to parse '{}': {}", path.display(), e),
        )
    })
}

/// Parses configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or doesn't match the schema.
///
/// # Example
///
/// ```rust
/// use acton_tool_rendezvous::config::from_str;
///
/// let config = from_str("name = \"coding-agent\"\nmax_in_flight = 4").unwrap();
/// assert_eq!(config.max_in_flight, 4);
/// ```
pub fn from_str(toml_str: &str) -> Result<ToolHostConfig, ToolHostError> {
    toml::from_str(toml_str)
        .map_err(|e| ToolHostError::configuration("config", format!("invalid TOML: {e}")))
}

/// Returns the paths that would be searched for configuration files, in order.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_NAME)];

    if let Some(dir) = xdg_config_dir() {
        paths.push(dir.join(XDG_CONFIG_NAME));
    }

    paths
}

/// Returns the XDG config directory for tool hosts.
///
/// This is `~/.config/acton-tools` on most systems.
#[must_use]
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}
