//! Values produced by content handlers.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mapping from discovered file path to the value its handler produced.
pub type ResultMap<T = Content> = HashMap<PathBuf, T>;

/// Stat information for a regular file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Size in bytes.
    pub size: u64,
    /// Unix permission bits (0 where the platform has none).
    pub mode: u32,
    /// Last modification time, if the platform reports one.
    pub modified: Option<DateTime<Utc>>,
    /// Whether the file is read-only.
    pub readonly: bool,
}

impl From<&std::fs::Metadata> for FileMetadata {
    fn from(meta: &std::fs::Metadata) -> Self {
        Self {
            size: meta.len(),
            mode: permission_bits(meta),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            readonly: meta.permissions().readonly(),
        }
    }
}

#[cfg(unix)]
fn permission_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
const fn permission_bits(_meta: &std::fs::Metadata) -> u32 {
    0
}

/// Decoded content of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Content {
    /// Opaque bytes.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Text(String),
    /// Parsed JSON document.
    Json(serde_json::Value),
    /// Metadata only, nothing read.
    Metadata(FileMetadata),
}

impl Content {
    /// The parsed JSON value, if this is JSON content.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The text, if this is text content.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The raw bytes, if this is byte content.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The metadata, if this is a scan result.
    #[must_use]
    pub const fn as_metadata(&self) -> Option<&FileMetadata> {
        match self {
            Self::Metadata(meta) => Some(meta),
            _ => None,
        }
    }

    /// Consume into metadata, if this is a scan result.
    #[must_use]
    pub fn into_metadata(self) -> Option<FileMetadata> {
        match self {
            Self::Metadata(meta) => Some(meta),
            _ => None,
        }
    }
}
