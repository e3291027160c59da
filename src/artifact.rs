//! Compiled collection on disk.
//!
//! The library never persists anything; this module is the command-line
//! tool's storage. `quire build` writes one JSON file holding the
//! collection together with the [`Snapshot`] it was compiled from and a
//! hash of the settings, and reads it back on the next run to decide
//! whether anything needs compiling.
//!
//! ```json
//! {
//!   "version": 1,
//!   "name": "posts",
//!   "settings_hash": "9f2c…",
//!   "snapshot": { "patterns": [...], "paths": [...], "mtimes": {...} },
//!   "entries": [ { "path": "posts/hello.md", "attributes": {...}, "body": "<p>…" } ]
//! }
//! ```
//!
//! A missing, unreadable or corrupt file, or one written by another format
//! version, loads as `None`: the next build simply starts from scratch.
//!
//! ## Rebuild decision
//!
//! [`rebuild_reason`] checks, in order: `--force`, artifact presence, the
//! settings hash, then the snapshot. The settings hash catches edits to
//! `quire.toml` (a new highlighter, a converter option) that leave every
//! source file untouched.

use crate::builder::Collection;
use crate::discover::Patterns;
use crate::publisher::Compiled;
use crate::staleness::{self, Snapshot, SnapshotError, StaleReport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version of the artifact format. Bump this to invalidate all existing
/// artifacts when the layout changes.
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not serialize artifact: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact<E> {
    pub version: u32,
    pub name: String,
    pub settings_hash: String,
    pub snapshot: Snapshot,
    pub entries: Vec<E>,
}

impl<E> Artifact<E> {
    pub fn new(compiled: Compiled<E>, settings_hash: impl Into<String>) -> Self {
        let Compiled {
            collection,
            snapshot,
        } = compiled;
        Self {
            version: ARTIFACT_VERSION,
            name: collection.name,
            settings_hash: settings_hash.into(),
            snapshot,
            entries: collection.entries,
        }
    }

    pub fn into_collection(self) -> Collection<E> {
        Collection::new(self.name, self.entries)
    }
}

impl<E: DeserializeOwned> Artifact<E> {
    /// Load from `path`. Returns `None` if the file doesn't exist or can't
    /// be parsed (version mismatch, corruption).
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        let artifact: Self = serde_json::from_str(&content).ok()?;
        (artifact.version == ARTIFACT_VERSION).then_some(artifact)
    }
}

impl<E: Serialize> Artifact<E> {
    /// Write as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let json = serde_json::to_string_pretty(self)?;
        let io_err = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, json).map_err(io_err)
    }
}

/// Why `quire build` is about to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildReason {
    Forced,
    /// No usable artifact on disk.
    NoArtifact,
    SettingsChanged,
    SourcesChanged(StaleReport),
}

/// Decide whether the artifact is out of date. `None` means it's current.
pub fn rebuild_reason<E>(
    artifact: Option<&Artifact<E>>,
    settings_hash: &str,
    patterns: &Patterns,
    force: bool,
) -> Result<Option<RebuildReason>, SnapshotError> {
    if force {
        return Ok(Some(RebuildReason::Forced));
    }
    let Some(artifact) = artifact else {
        return Ok(Some(RebuildReason::NoArtifact));
    };
    if artifact.settings_hash != settings_hash {
        return Ok(Some(RebuildReason::SettingsChanged));
    }
    let report = staleness::stale_report(patterns, &artifact.snapshot)?;
    Ok(report.is_stale().then_some(RebuildReason::SourcesChanged(report)))
}
