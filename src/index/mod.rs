//! Recursive file loading.
//!
//! This module provides:
//! - Ordered glob rules mapping file names to content handlers
//! - Built-in raw, text, JSON, and metadata handlers
//! - A concurrent, fail-fast directory walk collecting one result map

mod content;
mod dispatch;
pub mod handlers;
mod rules;
mod session;
mod walker;

pub use content::{Content, FileMetadata, ResultMap};
pub use dispatch::dispatch;
pub use handlers::{
    ContentHandler, JsonHandler, MetadataHandler, RawBytesHandler, RawTextHandler,
};
pub use rules::{handle, PatternRule, PatternRules, Patterns, RulesBuilder};
pub use session::{load, scan, LoadTarget, Loader};
pub use walker::{WalkStats, WalkStatsSnapshot};
