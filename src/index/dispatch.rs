//! Per-file rule selection.

use std::path::Path;

use super::content::{Content, FileMetadata};
use super::rules::PatternRules;
use crate::Result;

/// Run the first rule matching `path` and return what its handler produced.
///
/// Patterns are matched against the file's name within its containing
/// directory, never against the full path. `Ok(None)` means no rule
/// matched; that is a skip, not an error. Handler errors pass through
/// unchanged.
///
/// # Errors
///
/// Returns whatever the selected handler returns.
pub async fn dispatch(
    path: &Path,
    metadata: &FileMetadata,
    rules: &PatternRules,
) -> Result<Option<Content>> {
    let Some(file_name) = path.file_name() else {
        tracing::trace!(path = %path.display(), "No file name, skipping");
        return Ok(None);
    };

    let Some(rule) = rules.first_match(file_name) else {
        tracing::trace!(path = %path.display(), "No matching pattern, skipping");
        return Ok(None);
    };

    tracing::trace!(
        path = %path.display(),
        pattern = rule.pattern(),
        handler = rule.handler().name(),
        "Dispatching file"
    );

    rule.handler().load(path, metadata).await.map(Some)
}
