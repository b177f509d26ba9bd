//! Configuration management for fileindex.
//!
//! Supports configuration from:
//! - Command-line arguments (highest priority)
//! - Environment variables (`FILEINDEX_*`)

mod settings;

pub use settings::{Config, RuleSpec, DEFAULT_MAX_CONCURRENT_READS};
