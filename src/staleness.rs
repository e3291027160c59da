//! Staleness tracking for incremental builds.
//!
//! After a successful compilation the pipeline records a [`Snapshot`]: the
//! patterns, the matched paths, and each path's modification time. The host
//! keeps it (the command-line tool stores it inside the compiled artifact)
//! and asks [`needs_rebuild`] before compiling again.
//!
//! A rebuild is needed when:
//! 1. there is no previous snapshot (first build),
//! 2. the pattern list changed,
//! 3. a file was added or removed, or
//! 4. any file's mtime is newer than recorded.
//!
//! ## Limitations
//!
//! The check is timestamp-based, not content-based. `touch` without editing
//! forces a rebuild, and a file restored with an older mtime is not seen as
//! changed. Clock skew between machines sharing a snapshot has the same
//! effect. Removing a file and adding it back with a new mtime still counts
//! as a modification.

use crate::discover::{self, DiscoverError, Patterns};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    Discover(#[from] DiscoverError),
    #[error("could not stat {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Matched paths and their mtimes at the end of a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub patterns: Vec<String>,
    /// Paths in discovery order.
    pub paths: Vec<PathBuf>,
    pub mtimes: BTreeMap<PathBuf, SystemTime>,
}

impl Snapshot {
    /// Discover and stat the files matched by `patterns` right now.
    pub fn capture(patterns: &Patterns) -> Result<Self, SnapshotError> {
        let paths = discover::discover(patterns)?;
        Self::from_paths(patterns, paths)
    }

    /// Stat an already-discovered path list.
    pub fn from_paths(patterns: &Patterns, paths: Vec<PathBuf>) -> Result<Self, SnapshotError> {
        let mut mtimes = BTreeMap::new();
        for path in &paths {
            if !mtimes.contains_key(path) {
                mtimes.insert(path.clone(), modified(path)?);
            }
        }
        Ok(Self {
            patterns: patterns.as_slice().to_vec(),
            paths,
            mtimes,
        })
    }

    fn path_set(&self) -> BTreeSet<&PathBuf> {
        self.paths.iter().collect()
    }

    /// Differences between this (recorded) snapshot and `current`.
    pub fn stale_paths(&self, current: &Snapshot) -> StaleReport {
        let recorded = self.path_set();
        let now = current.path_set();

        let added = now.difference(&recorded).map(|p| (*p).clone()).collect();
        let removed = recorded.difference(&now).map(|p| (*p).clone()).collect();
        let modified = now
            .intersection(&recorded)
            .filter(|p| match (self.mtimes.get(**p), current.mtimes.get(**p)) {
                (Some(then), Some(now)) => now > then,
                _ => true,
            })
            .map(|p| (*p).clone())
            .collect();

        StaleReport {
            patterns_changed: self.patterns != current.patterns,
            added,
            removed,
            modified,
        }
    }
}

fn modified(path: &Path) -> Result<SystemTime, SnapshotError> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Why a snapshot is out of date. Empty when it isn't.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaleReport {
    pub patterns_changed: bool,
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
}

impl StaleReport {
    pub fn is_stale(&self) -> bool {
        self.patterns_changed
            || !self.added.is_empty()
            || !self.removed.is_empty()
            || !self.modified.is_empty()
    }
}

/// Compare the current state of `patterns` with a recorded snapshot.
pub fn stale_report(patterns: &Patterns, previous: &Snapshot) -> Result<StaleReport, SnapshotError> {
    let current = Snapshot::capture(patterns)?;
    Ok(previous.stale_paths(&current))
}

/// Whether the sources matched by `patterns` changed since `previous`.
///
/// Always `true` without a previous snapshot.
pub fn needs_rebuild(patterns: &Patterns, previous: Option<&Snapshot>) -> Result<bool, SnapshotError> {
    match previous {
        None => Ok(true),
        Some(snapshot) => Ok(stale_report(patterns, snapshot)?.is_stale()),
    }
}
