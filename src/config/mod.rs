//! Configuration loading for tool hosts.
//!
//! # Configuration File Format
//!
//! Configuration is stored in TOML format. The search order is:
//! 1. `./acton-tools.toml` (project-local)
//! 2. `~/.config/acton-tools/config.toml` (XDG config)
//!
//! # Example Configuration
//!
//! ```toml
//! name = "coding-agent"
//!
//! # Refuse new requests once this many are accepted but not fetched (0 = no limit)
//! max_in_flight = 32
//!
//! [logging]
//! app_name = "coding-agent"
//! level = "debug"
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use acton_tool_rendezvous::config;
//!
//! let config = config::load()?;
//! let host = ToolHost::builder().config(config).build();
//! ```

mod file;

pub use file::{from_path, from_str, load, search_paths, xdg_config_dir};
