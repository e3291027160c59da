//! Shared test utilities.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let compiled = Publisher::new("posts", fixture_pattern(&tmp, "posts/*.md"))
//!     .compile(&PageEntryBuilder)
//!     .unwrap();
//! assert_eq!(titles(&compiled.collection), ["Hello", "Code", "Broken"]);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::builder::{Collection, PageEntry};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Absolute glob pattern for `pattern` inside a fixture copy.
pub fn fixture_pattern(tmp: &TempDir, pattern: &str) -> String {
    tmp.path().join(pattern).to_string_lossy().into_owned()
}

/// Write a source file (creating parent directories) and return its path.
pub fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

// =========================================================================
// Extractors
// =========================================================================

/// The `title` attribute of every entry, in order. Missing titles are "".
pub fn titles(collection: &Collection<PageEntry>) -> Vec<String> {
    collection
        .iter()
        .map(|e| {
            e.attributes
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        })
        .collect()
}

/// File names of every entry, in order.
pub fn file_names(collection: &Collection<PageEntry>) -> Vec<String> {
    collection
        .iter()
        .map(|e| {
            e.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_source_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = write_source(tmp.path(), "a/b/c.md", "x");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "x");
    }
}
