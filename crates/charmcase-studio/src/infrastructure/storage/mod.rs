//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate
//!   directory, or from an explicit `--config` path.
//! - Writing a configuration back to disk.
//! - Providing sensible defaults when the file does not exist yet (first run).
//! - Turning raw config values into validated domain settings.
//!
//! Sessions themselves are never persisted.

pub mod config;
