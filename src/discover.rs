//! Source discovery.
//!
//! Expands the configured `from` pattern(s) into the list of files to
//! compile. Patterns use glob syntax (`*`, `?`, `[abc]`, `**`):
//!
//! ```text
//! posts/*.md                 # markdown files directly under posts/
//! posts/**/*.{md,markdown}   # not supported: glob has no brace sets, list both
//! ["posts/**/*.md", "posts/**/*.markdown"]
//! ```
//!
//! ## Ordering
//!
//! Each pattern's matches are sorted lexicographically by path, then the
//! per-pattern lists are concatenated in the order the patterns were given.
//! The same file matched by two patterns appears twice. Collection order
//! therefore never depends on the platform's directory listing order.
//!
//! ## Hidden files
//!
//! Wildcards never match a leading `.`, so `posts/*.md` skips
//! `posts/.draft.md` and `**` doesn't descend into hidden directories.
//! Spell the dot out (`posts/.*.md`) to include them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One pattern or an ordered list of patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Patterns::One(p) => std::slice::from_ref(p),
            Patterns::Many(ps) => ps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<&str> for Patterns {
    fn from(pattern: &str) -> Self {
        Patterns::One(pattern.to_string())
    }
}

impl From<String> for Patterns {
    fn from(pattern: String) -> Self {
        Patterns::One(pattern)
    }
}

impl From<Vec<String>> for Patterns {
    fn from(patterns: Vec<String>) -> Self {
        Patterns::Many(patterns)
    }
}

impl From<Vec<&str>> for Patterns {
    fn from(patterns: Vec<&str>) -> Self {
        Patterns::Many(patterns.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Patterns {
    fn from(patterns: [&str; N]) -> Self {
        Patterns::Many(patterns.iter().map(|p| p.to_string()).collect())
    }
}

/// Expand every pattern and concatenate the matches.
///
/// Only regular files are returned. A pattern that matches nothing
/// contributes nothing; an invalid pattern is an error.
pub fn discover(patterns: &Patterns) -> Result<Vec<PathBuf>, DiscoverError> {
    let mut sources = Vec::new();
    for pattern in patterns.as_slice() {
        let matches = expand(pattern)?;
        debug!(pattern = %pattern, matched = matches.len(), "expanded pattern");
        sources.extend(matches);
    }
    Ok(sources)
}

fn expand(pattern: &str) -> Result<Vec<PathBuf>, DiscoverError> {
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };
    let paths = glob::glob_with(pattern, options).map_err(|source| DiscoverError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| DiscoverError::Io {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
