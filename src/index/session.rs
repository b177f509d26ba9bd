//! Load sessions: the public entry points.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::Instrument;

use super::content::{FileMetadata, ResultMap};
use super::rules::{PatternRules, Patterns};
use super::walker::{walk, WalkState, WalkStatsSnapshot};
use crate::{Error, Result};

/// What a session walks: one root, or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    /// A single file or directory.
    Single(PathBuf),
    /// Several roots, walked concurrently into one result map.
    Many(Vec<PathBuf>),
}

impl LoadTarget {
    /// Roots to walk, duplicates removed, first occurrence order kept.
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        match self {
            Self::Single(path) => vec![path.clone()],
            Self::Many(paths) => {
                let mut seen = HashSet::new();
                paths
                    .iter()
                    .filter(|p| seen.insert(p.as_path()))
                    .cloned()
                    .collect()
            }
        }
    }
}

impl From<&str> for LoadTarget {
    fn from(path: &str) -> Self {
        Self::Single(PathBuf::from(path))
    }
}

impl From<String> for LoadTarget {
    fn from(path: String) -> Self {
        Self::Single(PathBuf::from(path))
    }
}

impl From<&Path> for LoadTarget {
    fn from(path: &Path) -> Self {
        Self::Single(path.to_path_buf())
    }
}

impl From<PathBuf> for LoadTarget {
    fn from(path: PathBuf) -> Self {
        Self::Single(path)
    }
}

impl From<&PathBuf> for LoadTarget {
    fn from(path: &PathBuf) -> Self {
        Self::Single(path.clone())
    }
}

impl<P: Into<PathBuf>> From<Vec<P>> for LoadTarget {
    fn from(paths: Vec<P>) -> Self {
        Self::Many(paths.into_iter().map(Into::into).collect())
    }
}

impl<P: AsRef<Path>> From<&[P]> for LoadTarget {
    fn from(paths: &[P]) -> Self {
        Self::Many(paths.iter().map(|p| p.as_ref().to_path_buf()).collect())
    }
}

/// Session factory holding the rules every load will snapshot.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    rules: PatternRules,
    max_concurrent_reads: Option<usize>,
}

impl Loader {
    /// Create a loader for `rules`.
    #[must_use]
    pub const fn new(rules: PatternRules) -> Self {
        Self {
            rules,
            max_concurrent_reads: None,
        }
    }

    /// Bound the number of handler invocations running at once.
    ///
    /// Only throughput changes; the result map is the same. Without a bound
    /// every file in the tree is opened at once, which can exhaust the
    /// process's open-file limit on large trees.
    #[must_use]
    pub fn with_max_concurrent_reads(mut self, limit: usize) -> Self {
        self.max_concurrent_reads = Some(limit);
        self
    }

    /// The rules each session starts from.
    #[must_use]
    pub const fn rules(&self) -> &PatternRules {
        &self.rules
    }

    /// Walk `target` and load every matching file.
    ///
    /// # Errors
    ///
    /// Returns the first stat, readdir, read, or handler error observed.
    /// No partial results are returned on failure.
    pub async fn load(&self, target: impl Into<LoadTarget>) -> Result<ResultMap> {
        self.load_with_stats(target).await.map(|(results, _)| results)
    }

    /// Like [`Loader::load`], also returning walk statistics.
    ///
    /// # Errors
    ///
    /// Same as [`Loader::load`].
    pub async fn load_with_stats(
        &self,
        target: impl Into<LoadTarget>,
    ) -> Result<(ResultMap, WalkStatsSnapshot)> {
        let roots = target.into().roots();
        if self.max_concurrent_reads == Some(0) {
            return Err(Error::invalid_argument(
                "max_concurrent_reads must be greater than 0",
            ));
        }

        // Each session owns its own copy of the rules.
        let state = Arc::new(WalkState::new(
            self.rules.clone(),
            self.max_concurrent_reads,
        ));

        let span = tracing::info_span!("load_session", roots = roots.len());
        async {
            tracing::info!(roots = ?roots, rules = self.rules.len(), "Starting load");

            let branches = roots
                .into_iter()
                .map(|root| walk(root, Arc::clone(&state)));

            if let Err(e) = try_join_all(branches).await {
                tracing::warn!(error = %e, "Load failed");
                return Err(e);
            }

            let stats = state.stats();
            let results = state.take_results();
            tracing::info!(
                entries = results.len(),
                dirs = stats.dirs_visited,
                found = stats.files_found,
                skipped = stats.files_skipped,
                "Load complete"
            );

            Ok((results, stats))
        }
        .instrument(span)
        .await
    }

    /// Collect metadata for files matching `patterns` without reading them.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile or the walk fails.
    pub async fn scan(
        &self,
        target: impl Into<LoadTarget>,
        patterns: impl Into<Patterns>,
    ) -> Result<ResultMap<FileMetadata>> {
        let loader = Self {
            rules: PatternRules::scan(&patterns.into())?,
            max_concurrent_reads: self.max_concurrent_reads,
        };

        let results = loader.load(target).await?;
        Ok(results
            .into_iter()
            .filter_map(|(path, content)| content.into_metadata().map(|meta| (path, meta)))
            .collect())
    }
}

/// Load `target` with `rules`, or the default rules when `None`.
///
/// # Errors
///
/// Returns the first error any file or directory produced.
pub async fn load(
    target: impl Into<LoadTarget>,
    rules: Option<&PatternRules>,
) -> Result<ResultMap> {
    let rules = rules.cloned().unwrap_or_default();
    Loader::new(rules).load(target).await
}

/// Metadata for every file under `target` whose name matches `patterns`.
///
/// # Errors
///
/// Returns an error if a pattern does not compile or the walk fails.
pub async fn scan(
    target: impl Into<LoadTarget>,
    patterns: impl Into<Patterns>,
) -> Result<ResultMap<FileMetadata>> {
    Loader::default().scan(target, patterns).await
}
