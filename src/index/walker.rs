//! Recursive, concurrent directory walk.
//!
//! Each path is stat'ed; files go to the dispatcher, directories fan out
//! into one spawned task per child. A directory resolves only after every
//! child has, and the first error short-circuits the join.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::content::{FileMetadata, ResultMap};
use super::dispatch::dispatch;
use super::rules::PatternRules;
use crate::{Error, Result};

/// Walk statistics.
#[derive(Debug, Default)]
pub struct WalkStats {
    pub dirs_visited: AtomicU64,
    pub files_found: AtomicU64,
    pub files_loaded: AtomicU64,
    pub files_skipped: AtomicU64,
}

impl WalkStats {
    /// Create new stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current stats.
    #[must_use]
    pub fn snapshot(&self) -> WalkStatsSnapshot {
        WalkStatsSnapshot {
            dirs_visited: self.dirs_visited.load(Ordering::Relaxed),
            files_found: self.files_found.load(Ordering::Relaxed),
            files_loaded: self.files_loaded.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of walk stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStatsSnapshot {
    pub dirs_visited: u64,
    pub files_found: u64,
    pub files_loaded: u64,
    pub files_skipped: u64,
}

/// State shared by every branch of one load session.
#[derive(Debug)]
pub(crate) struct WalkState {
    rules: PatternRules,
    results: Mutex<ResultMap>,
    read_permits: Option<Semaphore>,
    aborted: AtomicBool,
    stats: WalkStats,
}

impl WalkState {
    pub(crate) fn new(rules: PatternRules, max_concurrent_reads: Option<usize>) -> Self {
        Self {
            rules,
            results: Mutex::new(ResultMap::new()),
            read_permits: max_concurrent_reads.map(Semaphore::new),
            aborted: AtomicBool::new(false),
            stats: WalkStats::new(),
        }
    }

    /// Move the collected results out.
    pub(crate) fn take_results(&self) -> ResultMap {
        std::mem::take(&mut *self.results.lock())
    }

    pub(crate) fn stats(&self) -> WalkStatsSnapshot {
        self.stats.snapshot()
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}

/// Walk `path`, recording every matched file into the shared results.
///
/// Once any branch has failed, branches still in flight stop descending;
/// their output is never observed by the caller.
pub(crate) fn walk(path: PathBuf, state: Arc<WalkState>) -> BoxFuture<'static, Result<()>> {
    async move {
        if state.is_aborted() {
            return Ok(());
        }

        let outcome = visit(&path, &state).await;
        if outcome.is_err() {
            state.abort();
        }
        outcome
    }
    .boxed()
}

async fn visit(path: &Path, state: &Arc<WalkState>) -> Result<()> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::io(path, e))?;

    if meta.is_file() {
        visit_file(path, &FileMetadata::from(&meta), state).await
    } else if meta.is_dir() {
        visit_dir(path, state).await
    } else {
        tracing::trace!(path = %path.display(), "Not a file or directory, skipping");
        Ok(())
    }
}

async fn visit_file(path: &Path, meta: &FileMetadata, state: &WalkState) -> Result<()> {
    state.stats.files_found.fetch_add(1, Ordering::Relaxed);

    let _permit = match state.read_permits {
        Some(ref permits) => Some(
            permits
                .acquire()
                .await
                .map_err(|e| Error::internal(format!("read permits closed: {e}")))?,
        ),
        None => None,
    };

    match dispatch(path, meta, &state.rules).await? {
        Some(content) => {
            state.results.lock().insert(path.to_path_buf(), content);
            state.stats.files_loaded.fetch_add(1, Ordering::Relaxed);
        }
        None => {
            state.stats.files_skipped.fetch_add(1, Ordering::Relaxed);
        }
    }

    Ok(())
}

async fn visit_dir(path: &Path, state: &Arc<WalkState>) -> Result<()> {
    state.stats.dirs_visited.fetch_add(1, Ordering::Relaxed);

    let mut entries = tokio::fs::read_dir(path)
        .await
        .map_err(|e| Error::io(path, e))?;

    let mut children = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(path, e))? {
        children.push(path.join(entry.file_name()));
    }

    tracing::debug!(path = %path.display(), children = children.len(), "Walking directory");

    let tasks = children.into_iter().map(|child| {
        let handle = tokio::spawn(walk(child, Arc::clone(state)));
        async move {
            handle
                .await
                .map_err(|e| Error::internal(format!("walk task failed: {e}")))?
        }
    });

    try_join_all(tasks).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    async fn run(root: PathBuf, rules: PatternRules) -> (Result<()>, Arc<WalkState>) {
        let state = Arc::new(WalkState::new(rules, None));
        let outcome = walk(root, Arc::clone(&state)).await;
        (outcome, state)
    }

    #[tokio::test]
    async fn test_walk_nested_tree() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(tmp.path().join("top.txt"), "top").unwrap();
        fs::write(tmp.path().join("a").join("mid.txt"), "mid").unwrap();
        fs::write(deep.join("leaf.txt"), "leaf").unwrap();

        let (outcome, state) = run(tmp.path().to_path_buf(), PatternRules::default()).await;
        outcome.unwrap();

        let results = state.take_results();
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[&deep.join("leaf.txt")].as_text(),
            Some("leaf")
        );

        let stats = state.stats();
        assert_eq!(stats.dirs_visited, 4);
        assert_eq!(stats.files_found, 3);
        assert_eq!(stats.files_loaded, 3);
        assert_eq!(stats.files_skipped, 0);
    }

    #[tokio::test]
    async fn test_walk_empty_directory() {
        let tmp = TempDir::new().unwrap();

        let (outcome, state) = run(tmp.path().to_path_buf(), PatternRules::default()).await;
        outcome.unwrap();
        assert!(state.take_results().is_empty());
        assert_eq!(state.stats().dirs_visited, 1);
    }

    #[tokio::test]
    async fn test_walk_counts_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.json"), "1").unwrap();
        fs::write(tmp.path().join("skip.zzz"), "2").unwrap();

        let rules = crate::index::rules::handle("*.json", crate::index::handlers::JsonHandler)
            .build()
            .unwrap();
        let (outcome, state) = run(tmp.path().to_path_buf(), rules).await;
        outcome.unwrap();

        let stats = state.stats();
        assert_eq!(stats.files_loaded, 1);
        assert_eq!(stats.files_skipped, 1);
    }

    #[tokio::test]
    async fn test_walk_missing_root() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");

        let (outcome, state) = run(missing.clone(), PatternRules::default()).await;
        let err = outcome.unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if *path == missing));
        assert!(state.is_aborted());
    }

    #[tokio::test]
    async fn test_aborted_state_stops_descent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();

        let state = Arc::new(WalkState::new(PatternRules::default(), None));
        state.abort();
        walk(tmp.path().to_path_buf(), Arc::clone(&state))
            .await
            .unwrap();
        assert!(state.take_results().is_empty());
    }

    #[tokio::test]
    async fn test_bounded_reads_same_result() {
        let tmp = TempDir::new().unwrap();
        for i in 0..20 {
            fs::write(tmp.path().join(format!("f{i}.txt")), i.to_string()).unwrap();
        }

        let state = Arc::new(WalkState::new(PatternRules::default(), Some(2)));
        walk(tmp.path().to_path_buf(), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(state.take_results().len(), 20);
    }
}
